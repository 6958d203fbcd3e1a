//! Document search service - query validation, backend call, normalization.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::foundation::ConfigurationError;
use crate::domain::search::{normalize_results, SearchHit};
use crate::domain::tools::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};
use crate::ports::{serving_config_path, SearchBackend, SearchRequest};

/// Environment names reported when search addressing is missing.
pub const PROJECT_ID_SETTING: &str = "GOOGLE_CLOUD_PROJECT_ID";
pub const ENGINE_ID_SETTING: &str = "VERTEX_SEARCH_ENGINE_ID";

/// Errors from a document search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("maxResults must be at least 1, got {0}")]
    InvalidMaxResults(u32),

    #[error("Failed to search documents: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to search documents: {0}")]
    Backend(String),

    #[error("Failed to search documents: timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Addressing and tuning for searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub project_id: Option<String>,
    pub location: String,
    pub engine_id: Option<String>,
    /// Ask the engine for snippets and extractive answers.
    pub rich_content: bool,
    pub default_max_results: u32,
    pub timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            project_id: None,
            location: "global".to_string(),
            engine_id: None,
            rich_content: true,
            default_max_results: DEFAULT_MAX_RESULTS,
            timeout: Duration::from_secs(15),
        }
    }
}

impl SearchSettings {
    /// Returns the serving configuration, or the settings that are missing.
    pub fn serving_config(&self) -> Result<String, ConfigurationError> {
        let project = self.project_id.as_deref().filter(|s| !s.trim().is_empty());
        let engine = self.engine_id.as_deref().filter(|s| !s.trim().is_empty());

        match (project, engine) {
            (Some(project), Some(engine)) => Ok(serving_config_path(project, &self.location, engine)),
            _ => Err(ConfigurationError::missing(
                [
                    project.is_none().then_some(PROJECT_ID_SETTING),
                    engine.is_none().then_some(ENGINE_ID_SETTING),
                ]
                .into_iter()
                .flatten(),
            )),
        }
    }
}

/// Runs searches and normalizes their results into [`SearchHit`]s.
pub struct DocumentSearchService {
    backend: Arc<dyn SearchBackend>,
    settings: SearchSettings,
}

impl DocumentSearchService {
    pub fn new(backend: Arc<dyn SearchBackend>, settings: SearchSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Searches for documents matching `query`.
    ///
    /// `max_results` defaults to the configured default and is capped at the
    /// backend page-size limit. Missing addressing is reported before any
    /// backend call is made.
    pub async fn search(&self, query: &str, max_results: Option<u32>) -> Result<Vec<SearchHit>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let page_size = match max_results {
            Some(0) => return Err(SearchError::InvalidMaxResults(0)),
            Some(n) => n.min(MAX_RESULTS_LIMIT),
            None => self.settings.default_max_results,
        };

        let serving_config = self.settings.serving_config()?;

        let mut request = SearchRequest::new(serving_config, query, page_size);
        if self.settings.rich_content {
            request = request.with_rich_content();
        }

        tracing::info!(query = %query, page_size, "searching documents");

        let response = tokio::time::timeout(self.settings.timeout, self.backend.search(request))
            .await
            .map_err(|_| SearchError::Timeout {
                timeout_secs: self.settings.timeout.as_secs(),
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "search backend failed");
                SearchError::Backend(e.to_string())
            })?;

        let hits = normalize_results(&response.results);
        tracing::info!(
            query = %query,
            returned = response.results.len(),
            hits = hits.len(),
            "search complete"
        );

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::search::InMemorySearchBackend;
    use crate::domain::search::{DerivedStructData, RawDocument, RawSearchResult};
    use crate::ports::SearchBackendError;

    fn configured() -> SearchSettings {
        SearchSettings {
            project_id: Some("proj".to_string()),
            engine_id: Some("engine".to_string()),
            ..SearchSettings::default()
        }
    }

    fn result(link: &str) -> RawSearchResult {
        RawSearchResult {
            id: link.to_string(),
            document: Some(RawDocument {
                id: link.to_string(),
                derived_struct_data: Some(DerivedStructData {
                    title: Some("Manual".to_string()),
                    link: Some(link.to_string()),
                    ..DerivedStructData::default()
                }),
                ..RawDocument::default()
            }),
        }
    }

    fn service(backend: InMemorySearchBackend, settings: SearchSettings) -> DocumentSearchService {
        DocumentSearchService::new(Arc::new(backend), settings)
    }

    #[tokio::test]
    async fn missing_addressing_fails_before_backend_call() {
        let backend = InMemorySearchBackend::new();
        let svc = service(backend.clone(), SearchSettings::default());

        let err = svc.search("manual", None).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to search documents: GOOGLE_CLOUD_PROJECT_ID and VERTEX_SEARCH_ENGINE_ID must be set"
        );
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn missing_engine_only_names_engine() {
        let settings = SearchSettings {
            project_id: Some("proj".to_string()),
            ..SearchSettings::default()
        };
        let err = service(InMemorySearchBackend::new(), settings)
            .search("manual", None)
            .await
            .unwrap_err();

        match err {
            SearchError::Configuration(config) => {
                assert_eq!(config.missing_settings(), &[ENGINE_ID_SETTING]);
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let err = service(InMemorySearchBackend::new(), configured())
            .search("   ", None)
            .await
            .unwrap_err();
        assert_eq!(err, SearchError::EmptyQuery);
    }

    #[tokio::test]
    async fn zero_max_results_is_rejected() {
        let err = service(InMemorySearchBackend::new(), configured())
            .search("q", Some(0))
            .await
            .unwrap_err();
        assert_eq!(err, SearchError::InvalidMaxResults(0));
    }

    #[tokio::test]
    async fn request_uses_defaults_and_serving_config() {
        let backend = InMemorySearchBackend::new();
        service(backend.clone(), configured()).search(" エアコン ", None).await.unwrap();

        let request = &backend.requests()[0];
        assert_eq!(request.query, "エアコン");
        assert_eq!(request.page_size, 5);
        assert!(request.content_search_spec.is_some());
        assert_eq!(
            request.serving_config,
            "projects/proj/locations/global/collections/default_collection/engines/engine/servingConfigs/default_config"
        );
    }

    #[tokio::test]
    async fn page_size_is_capped() {
        let backend = InMemorySearchBackend::new();
        service(backend.clone(), configured()).search("q", Some(500)).await.unwrap();
        assert_eq!(backend.requests()[0].page_size, MAX_RESULTS_LIMIT);
    }

    #[tokio::test]
    async fn results_are_normalized() {
        let backend = InMemorySearchBackend::new().with_results(vec![
            result("gs://docs/a.pdf"),
            RawSearchResult::default(),
            result("gs://docs/b.pdf"),
        ]);

        let hits = service(backend, configured()).search("q", Some(10)).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].locator.as_deref(), Some("gs://docs/a.pdf"));
        assert_eq!(hits[0].content, "No content available");
        assert_eq!(hits[1].title, "Manual");
    }

    #[tokio::test]
    async fn backend_error_is_wrapped() {
        let backend = InMemorySearchBackend::new().with_error(SearchBackendError::Http {
            status: 403,
            message: "Permission denied".to_string(),
        });

        let err = service(backend, configured()).search("q", None).await.unwrap_err();

        assert!(matches!(err, SearchError::Backend(_)));
        assert_eq!(
            err.to_string(),
            "Failed to search documents: search request failed with status 403: Permission denied"
        );
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let backend = InMemorySearchBackend::new().with_delay(Duration::from_millis(200));
        let settings = SearchSettings {
            timeout: Duration::from_millis(20),
            ..configured()
        };

        let err = service(backend, settings).search("q", None).await.unwrap_err();
        assert!(matches!(err, SearchError::Timeout { .. }));
    }
}
