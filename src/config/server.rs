//! HTTP listener settings: bind address, log filter, request deadline and
//! browser origins allowed to call `/api/chat` and `/api/search`.

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

/// Longest accepted deadline for producing response headers.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Listener settings, read from `DOC_FINDER__SERVER__*`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// `production` switches logs to JSON lines.
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Deadline for response headers. A chat body keeps streaming past it.
    pub request_timeout_secs: u64,

    /// Comma-separated origins; unset means any origin.
    pub cors_origins: Option<String>,
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::default(),
            log_level: "info,doc_finder=debug,tower_http=info".to_string(),
            request_timeout_secs: 30,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidHost(self.host.clone()))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Allowed origins, trimmed, with blank entries skipped.
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .iter()
            .flat_map(|origins| origins.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout("server.request_timeout_secs"));
        }
        self.socket_addr().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listens_on_all_interfaces_port_8080() {
        let server = ServerConfig::default();

        assert_eq!(server.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(server.request_timeout(), Duration::from_secs(30));
        assert!(server.log_level.contains("doc_finder=debug"));
        assert!(!server.is_production());
        assert!(server.validate().is_ok());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let server: ServerConfig =
            serde_json::from_str(r#"{"port": 3000, "environment": "production"}"#).unwrap();

        assert_eq!(server.port, 3000);
        assert_eq!(server.host, "0.0.0.0");
        assert!(server.is_production());
    }

    #[test]
    fn only_development_and_production_are_environments() {
        assert!(serde_json::from_str::<Environment>(r#""staging""#).is_err());
        assert_eq!(
            serde_json::from_str::<Environment>(r#""development""#).unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn blank_cors_entries_are_skipped() {
        let server = ServerConfig {
            cors_origins: Some(" http://localhost:5173 ,, https://docs.example.com,".to_string()),
            ..ServerConfig::default()
        };

        assert_eq!(
            server.cors_origins_list(),
            vec!["http://localhost:5173", "https://docs.example.com"]
        );
        assert!(ServerConfig::default().cors_origins_list().is_empty());
    }

    #[test]
    fn unparseable_host_is_rejected() {
        let server = ServerConfig {
            host: "doc finder".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(server.validate(), Err(ValidationError::InvalidHost("doc finder".to_string())));
    }

    #[test]
    fn port_zero_is_rejected() {
        let server = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert_eq!(server.validate(), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn request_timeout_bounds() {
        let with_timeout = |secs| ServerConfig {
            request_timeout_secs: secs,
            ..ServerConfig::default()
        };

        assert!(with_timeout(1).validate().is_ok());
        assert!(with_timeout(MAX_REQUEST_TIMEOUT_SECS).validate().is_ok());
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            assert_eq!(
                with_timeout(secs).validate(),
                Err(ValidationError::InvalidTimeout("server.request_timeout_secs"))
            );
        }
    }
}
