//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DOC_FINDER` prefix and nested values use double underscores as separators.
//!
//! The plain variables `GEMINI_API_KEY`, `GOOGLE_CLOUD_PROJECT_ID`,
//! `VERTEX_SEARCH_LOCATION` and `VERTEX_SEARCH_ENGINE_ID` are honoured as
//! fallbacks when the prefixed form is not set.
//!
//! # Example
//!
//! ```no_run
//! use doc_finder::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod search;
mod server;
mod storage;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use search::SearchConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Prefix of structured environment variables.
pub const ENV_PREFIX: &str = "DOC_FINDER";

/// Unprefixed variables and the keys they fill when the prefixed form is absent.
pub const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("GEMINI_API_KEY", "ai.api_key"),
    ("GOOGLE_CLOUD_PROJECT_ID", "search.project_id"),
    ("VERTEX_SEARCH_LOCATION", "search.location"),
    ("VERTEX_SEARCH_ENGINE_ID", "search.engine_id"),
];

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads. Missing model
/// or search credentials are reported per request, not at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Model provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Search engine configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Link signing configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Seeds defaults from the unprefixed fallback variables
    /// 3. Reads environment variables with `DOC_FINDER` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DOC_FINDER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DOC_FINDER__SEARCH__ENGINE_ID=...` -> `search.engine_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        for (var, key) in ENV_FALLBACKS {
            if let Some(value) = std::env::var(var).ok().filter(|v| !v.trim().is_empty()) {
                builder = builder.set_default(*key, value)?;
            }
        }

        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.search.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
