//! In-memory search backend for tests and local development.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::search::RawSearchResult;
use crate::ports::{SearchBackend, SearchBackendError, SearchRequest, SearchResponse};

/// Search backend that returns a fixed result set.
///
/// Results are truncated to the requested page size. Every request is
/// recorded for later inspection.
#[derive(Debug, Clone, Default)]
pub struct InMemorySearchBackend {
    results: Vec<RawSearchResult>,
    error: Option<SearchBackendError>,
    delay: Duration,
    requests: Arc<Mutex<Vec<SearchRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemorySearchBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the results returned for every query.
    pub fn with_results(mut self, results: Vec<RawSearchResult>) -> Self {
        self.results = results;
        self
    }

    /// Makes every search fail with the given error.
    pub fn with_error(mut self, error: SearchBackendError) -> Self {
        self.error = Some(error);
        self
    }

    /// Sets simulated latency per search.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns all recorded requests.
    pub fn requests(&self) -> Vec<SearchRequest> {
        lock(&self.requests).clone()
    }

    /// Returns the number of searches performed.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl SearchBackend for InMemorySearchBackend {
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchBackendError> {
        let page_size = request.page_size as usize;
        lock(&self.requests).push(request);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(ref error) = self.error {
            return Err(error.clone());
        }

        Ok(SearchResponse {
            results: self.results.iter().take(page_size).cloned().collect(),
            total_size: Some(self.results.len() as u64),
            corrected_query: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str) -> RawSearchResult {
        RawSearchResult {
            id: id.to_string(),
            document: None,
        }
    }

    #[tokio::test]
    async fn truncates_to_page_size() {
        let backend = InMemorySearchBackend::new().with_results(vec![result("a"), result("b"), result("c")]);

        let response = backend.search(SearchRequest::new("s", "q", 2)).await.unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.total_size, Some(3));
        assert_eq!(backend.request_count(), 1);
        assert_eq!(backend.requests()[0].query, "q");
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let backend = InMemorySearchBackend::new().with_error(SearchBackendError::Network("down".to_string()));

        let err = backend.search(SearchRequest::new("s", "q", 2)).await.unwrap_err();
        assert_eq!(err, SearchBackendError::Network("down".to_string()));
    }
}
