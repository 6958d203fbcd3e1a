//! Tool result - the only value the model observes from a tool call.
//!
//! Documents carry titles, file names and links. Document bodies are never
//! part of this shape.

use serde::{Deserialize, Serialize};

/// One matched document as presented to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLink {
    pub title: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Outcome of a tool invocation.
///
/// Serializes either as
/// `{"success": true, "query", "count", "documents"}` or as
/// `{"success": false, "error", "query"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    success: bool,
    query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    documents: Option<Vec<DocumentLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ToolResult {
    /// Creates a successful result.
    pub fn found(query: impl Into<String>, documents: Vec<DocumentLink>) -> Self {
        Self {
            success: true,
            query: query.into(),
            count: Some(documents.len()),
            documents: Some(documents),
            error: None,
        }
    }

    /// Creates a failed result.
    pub fn failed(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            query: query.into(),
            count: None,
            documents: None,
            error: Some(error.into()),
        }
    }

    /// Returns whether the tool succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the query the tool ran with.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the matched documents (empty on failure).
    pub fn documents(&self) -> &[DocumentLink] {
        self.documents.as_deref().unwrap_or_default()
    }

    /// Returns the error message (if any).
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Serializes for the model.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({"success": false, "error": "unserializable tool result", "query": self.query})
        })
    }
}
