//! Request and response types for the direct search endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::search::{format_search_results, SearchHit};

/// `POST /api/search` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestBody {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<u32>,
}

/// `POST /api/search` response.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponseBody {
    pub query: String,
    pub count: usize,
    pub hits: Vec<SearchHit>,
    /// Plain-text rendering of `hits`.
    pub formatted: String,
}

impl SearchResponseBody {
    pub fn new(query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        Self {
            query: query.into(),
            count: hits.len(),
            formatted: format_search_results(&hits),
            hits,
        }
    }
}
