//! Search engine configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::ai::is_http_url;
use super::error::ValidationError;

/// Search engine configuration
///
/// Project and engine ids are optional at startup; searches report them
/// as missing until they are set.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Cloud project id
    pub project_id: Option<String>,

    /// Engine location (`global`, `us`, `eu`, ...)
    #[serde(default = "default_location")]
    pub location: String,

    /// Search engine id
    pub engine_id: Option<String>,

    /// API endpoint override (defaults to the location's endpoint)
    pub endpoint: Option<String>,

    /// Static bearer token; the metadata server is used when absent
    pub access_token: Option<Secret<String>>,

    /// Search deadline in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Request snippets and extractive answers
    #[serde(default = "default_rich_content")]
    pub rich_content: bool,

    /// Results returned when the caller gives no limit
    #[serde(default = "default_max_results")]
    pub default_max_results: u32,
}

impl SearchConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate search configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("search.timeout_secs"));
        }
        if !(1..=100).contains(&self.default_max_results) {
            return Err(ValidationError::InvalidMaxResults(self.default_max_results));
        }
        if self.location.trim().is_empty() {
            return Err(ValidationError::MissingRequired("search.location"));
        }
        if let Some(ref endpoint) = self.endpoint {
            if !is_http_url(endpoint) {
                return Err(ValidationError::InvalidUrl("search.endpoint"));
            }
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: default_location(),
            engine_id: None,
            endpoint: None,
            access_token: None,
            timeout_secs: default_timeout(),
            rich_content: default_rich_content(),
            default_max_results: default_max_results(),
        }
    }
}

fn default_location() -> String {
    "global".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_rich_content() -> bool {
    true
}

fn default_max_results() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.location, "global");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.default_max_results, 5);
        assert!(config.rich_content);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_max_results_range() {
        let config = SearchConfig {
            default_max_results: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidMaxResults(0)));

        let config = SearchConfig {
            default_max_results: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_endpoint_must_be_url() {
        let config = SearchConfig {
            endpoint: Some("localhost:9000".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUrl("search.endpoint")));
    }
}
