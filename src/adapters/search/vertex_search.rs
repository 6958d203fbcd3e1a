//! Vertex AI Search (Discovery Engine) adapter.
//!
//! Calls the REST `:search` method of a serving configuration with a bearer
//! token. Tokens come either from configuration or from the GCE metadata
//! server; metadata tokens are cached until shortly before they expire.
//!
//! # Configuration
//!
//! ```ignore
//! let config = VertexSearchConfig::new("global")
//!     .with_token_source(AccessTokenSource::MetadataServer);
//! let backend = VertexSearchBackend::new(config)?;
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::ports::{SearchBackend, SearchBackendError, SearchRequest, SearchResponse};

/// Metadata server endpoint for the default service account token.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Where bearer tokens come from.
#[derive(Debug, Clone)]
pub enum AccessTokenSource {
    /// A fixed token (e.g. `gcloud auth print-access-token`).
    Static(Secret<String>),
    /// The instance metadata server.
    MetadataServer,
}

/// Configuration for the search adapter.
#[derive(Debug, Clone)]
pub struct VertexSearchConfig {
    /// Base URL, e.g. `https://discoveryengine.googleapis.com`.
    pub endpoint: String,
    /// Token source.
    pub token_source: AccessTokenSource,
    /// Metadata token URL (overridable for tests).
    pub metadata_url: String,
    /// HTTP client timeout.
    pub timeout: Duration,
}

impl VertexSearchConfig {
    /// Creates a configuration for the given location's endpoint.
    pub fn new(location: &str) -> Self {
        Self {
            endpoint: endpoint_for_location(location),
            token_source: AccessTokenSource::MetadataServer,
            metadata_url: METADATA_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Overrides the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the token source.
    pub fn with_token_source(mut self, source: AccessTokenSource) -> Self {
        self.token_source = source;
        self
    }

    /// Overrides the metadata token URL.
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = url.into();
        self
    }

    /// Sets the HTTP client timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Regional endpoint for a location; `global` uses the unprefixed host.
pub fn endpoint_for_location(location: &str) -> String {
    if location.is_empty() || location == "global" {
        "https://discoveryengine.googleapis.com".to_string()
    } else {
        format!("https://{location}-discoveryengine.googleapis.com")
    }
}

/// Cached access token with expiry tracking.
struct CachedToken {
    token: Secret<String>,
    valid_until: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.valid_until
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

/// Discovery Engine search backend.
pub struct VertexSearchBackend {
    config: VertexSearchConfig,
    http_client: reqwest::Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl VertexSearchBackend {
    /// Creates a new backend. No network traffic happens until the first
    /// search.
    pub fn new(config: VertexSearchConfig) -> Result<Self, SearchBackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchBackendError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    fn search_url(&self, serving_config: &str) -> String {
        format!(
            "{}/v1/{}:search",
            self.config.endpoint.trim_end_matches('/'),
            serving_config
        )
    }

    /// Get a bearer token, using the cache for metadata tokens.
    async fn access_token(&self) -> Result<Secret<String>, SearchBackendError> {
        if let AccessTokenSource::Static(ref token) = self.config.token_source {
            return Ok(token.clone());
        }

        {
            let cache = self.token_cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.is_fresh() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cache = self.token_cache.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(ref cached) = *cache {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }

        let fetched = self.fetch_metadata_token().await?;
        let token = Secret::new(fetched.access_token);
        *cache = Some(CachedToken {
            token: token.clone(),
            valid_until: Instant::now() + Duration::from_secs(fetched.expires_in),
        });
        tracing::debug!(expires_in = fetched.expires_in, "refreshed search access token");

        Ok(token)
    }

    async fn fetch_metadata_token(&self) -> Result<MetadataToken, SearchBackendError> {
        let response = self
            .http_client
            .get(&self.config.metadata_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach metadata server: {}", e);
                SearchBackendError::Credentials(format!("metadata server unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(SearchBackendError::Credentials(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SearchBackendError::Credentials(format!("invalid metadata token: {}", e)))
    }

    async fn invalidate_token(&self) {
        *self.token_cache.write().await = None;
    }
}

#[async_trait]
impl SearchBackend for VertexSearchBackend {
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchBackendError> {
        let token = self.access_token().await?;
        let url = self.search_url(&request.serving_config);

        tracing::debug!(page_size = request.page_size, "calling search backend");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchBackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 401 {
                self.invalidate_token().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(SearchBackendError::Http {
                status: status.as_u16(),
                message: backend_error_message(&body),
            });
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| SearchBackendError::Parse(e.to_string()))
    }
}

/// Pulls `error.message` out of a Google API error body.
fn backend_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
