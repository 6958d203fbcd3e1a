//! Search Backend Port - Interface for the managed document search engine.
//!
//! The backend answers one query against one serving configuration and
//! returns the raw, loosely populated results. Normalization happens in the
//! domain, not here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::search::RawSearchResult;

/// Port for document search.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one search request.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchBackendError>;
}

/// Builds the serving configuration resource name for a search engine.
pub fn serving_config_path(project_id: &str, location: &str, engine_id: &str) -> String {
    format!(
        "projects/{project_id}/locations/{location}/collections/default_collection/engines/{engine_id}/servingConfigs/default_config"
    )
}

/// Query rewriting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewriteMode {
    Auto,
    Disabled,
}

/// Search request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Serving configuration resource name; part of the URL, not the body.
    #[serde(skip)]
    pub serving_config: String,
    pub query: String,
    pub page_size: u32,
    pub query_expansion_spec: ConditionSpec,
    pub spell_correction_spec: ModeSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_search_spec: Option<ContentSearchSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSpec {
    pub condition: RewriteMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSpec {
    pub mode: RewriteMode,
}

/// Asks the engine to return snippets and extractive answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSearchSpec {
    pub snippet_spec: SnippetSpec,
    pub extractive_content_spec: ExtractiveContentSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetSpec {
    pub return_snippet: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractiveContentSpec {
    pub max_extractive_answer_count: u32,
}

impl SearchRequest {
    /// Creates a request with automatic query expansion and spell correction.
    pub fn new(serving_config: impl Into<String>, query: impl Into<String>, page_size: u32) -> Self {
        Self {
            serving_config: serving_config.into(),
            query: query.into(),
            page_size,
            query_expansion_spec: ConditionSpec {
                condition: RewriteMode::Auto,
            },
            spell_correction_spec: ModeSpec {
                mode: RewriteMode::Auto,
            },
            content_search_spec: None,
        }
    }

    /// Requests snippets and one extractive answer per result.
    pub fn with_rich_content(mut self) -> Self {
        self.content_search_spec = Some(ContentSearchSpec {
            snippet_spec: SnippetSpec { return_snippet: true },
            extractive_content_spec: ExtractiveContentSpec {
                max_extractive_answer_count: 1,
            },
        });
        self
    }
}

/// Search response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<RawSearchResult>,
    #[serde(default)]
    pub total_size: Option<u64>,
    #[serde(default)]
    pub corrected_query: Option<String>,
}

/// Search backend errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchBackendError {
    /// No usable access token.
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    /// The engine rejected the call.
    #[error("search request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected schema.
    #[error("parse error: {0}")]
    Parse(String),
}
