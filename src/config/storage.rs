//! Storage link signing configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Storage link signing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// HMAC access id of the ambient signing key
    pub hmac_access_id: Option<String>,

    /// HMAC secret of the ambient signing key
    pub hmac_secret: Option<Secret<String>>,

    /// Key file used instead of the ambient key
    pub credential_file: Option<PathBuf>,

    /// Lifetime of issued links in seconds
    #[serde(default = "default_link_ttl")]
    pub link_ttl_secs: u64,

    /// Deadline for a single signing call in seconds
    #[serde(default = "default_sign_timeout")]
    pub sign_timeout_secs: u64,

    /// Host used in signed URLs (defaults to storage.googleapis.com)
    pub host: Option<String>,
}

impl StorageConfig {
    /// Get the signing deadline as Duration
    pub fn sign_timeout(&self) -> Duration {
        Duration::from_secs(self.sign_timeout_secs)
    }

    /// Ambient key as `(access_id, secret)`, when both halves are set
    pub fn hmac_key(&self) -> Option<(&str, &str)> {
        match (&self.hmac_access_id, &self.hmac_secret) {
            (Some(id), Some(secret)) if !id.is_empty() => Some((id.as_str(), secret.expose_secret().as_str())),
            _ => None,
        }
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=604_800).contains(&self.link_ttl_secs) {
            return Err(ValidationError::InvalidLinkTtl(self.link_ttl_secs));
        }
        if self.sign_timeout_secs == 0 || self.sign_timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout("storage.sign_timeout_secs"));
        }
        match (&self.hmac_access_id, &self.hmac_secret) {
            (Some(_), None) => Err(ValidationError::MissingRequired("storage.hmac_secret")),
            (None, Some(_)) => Err(ValidationError::MissingRequired("storage.hmac_access_id")),
            _ => Ok(()),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            hmac_access_id: None,
            hmac_secret: None,
            credential_file: None,
            link_ttl_secs: default_link_ttl(),
            sign_timeout_secs: default_sign_timeout(),
            host: None,
        }
    }
}

fn default_link_ttl() -> u64 {
    3600
}

fn default_sign_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.link_ttl_secs, 3600);
        assert_eq!(config.sign_timeout(), Duration::from_secs(5));
        assert!(config.hmac_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_ttl_range() {
        let config = StorageConfig {
            link_ttl_secs: 604_801,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLinkTtl(604_801)));
    }

    #[test]
    fn test_half_configured_key_is_invalid() {
        let config = StorageConfig {
            hmac_access_id: Some("GOOG1EXAMPLE".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("storage.hmac_secret"))
        );
    }

    #[test]
    fn test_hmac_key_pair() {
        let config = StorageConfig {
            hmac_access_id: Some("GOOG1EXAMPLE".to_string()),
            hmac_secret: Some(Secret::new("s3cr3t".to_string())),
            ..Default::default()
        };
        assert_eq!(config.hmac_key(), Some(("GOOG1EXAMPLE", "s3cr3t")));
    }
}
