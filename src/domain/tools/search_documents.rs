//! The `searchDocuments` tool: schema and argument parsing.

use serde::Deserialize;

use super::ToolDefinition;
use crate::domain::foundation::ValidationError;

/// Name under which the tool is registered with the model.
pub const SEARCH_DOCUMENTS_TOOL: &str = "searchDocuments";

/// Result count used when the model does not ask for one.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Largest page size the search backend accepts.
pub const MAX_RESULTS_LIMIT: u32 = 100;

/// Arguments the model passes to `searchDocuments`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocumentsArgs {
    /// Search query text.
    pub query: String,
    /// Requested result count. Models emit JSON numbers, so this may arrive
    /// as `5` or `5.0`.
    #[serde(default)]
    pub max_results: Option<f64>,
}

impl SearchDocumentsArgs {
    /// Parses raw tool arguments.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::invalid_format("arguments", e.to_string()))
    }

    /// Returns the requested result count, or `None` to use the default.
    ///
    /// Fractional values are truncated; values below one are rejected.
    pub fn max_results(&self) -> Result<Option<u32>, ValidationError> {
        match self.max_results {
            None => Ok(None),
            Some(n) if n.is_finite() && n >= 1.0 => Ok(Some(n.min(f64::from(u32::MAX)) as u32)),
            Some(n) => Err(ValidationError::out_of_range(
                "maxResults",
                1,
                i64::from(MAX_RESULTS_LIMIT),
                n as i64,
            )),
        }
    }

    /// Tool definition presented to the model.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            SEARCH_DOCUMENTS_TOOL,
            "Search the document knowledge base and return matching files with download links. \
             Use this when the user asks to find documents or needs information from stored files.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to find relevant documents"
                    },
                    "maxResults": {
                        "type": "number",
                        "description": "Maximum number of results to return (default: 5)",
                        "default": DEFAULT_MAX_RESULTS
                    }
                },
                "required": ["query"]
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_query_only() {
        let args = SearchDocumentsArgs::from_value(&json!({"query": "エアコン"})).unwrap();
        assert_eq!(args.query, "エアコン");
        assert_eq!(args.max_results().unwrap(), None);
    }

    #[test]
    fn accepts_float_max_results() {
        let args = SearchDocumentsArgs::from_value(&json!({"query": "q", "maxResults": 3.0})).unwrap();
        assert_eq!(args.max_results().unwrap(), Some(3));
    }

    #[test]
    fn rejects_zero_max_results() {
        let args = SearchDocumentsArgs::from_value(&json!({"query": "q", "maxResults": 0})).unwrap();
        assert!(args.max_results().is_err());
    }

    #[test]
    fn missing_query_is_invalid() {
        let err = SearchDocumentsArgs::from_value(&json!({"maxResults": 2})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn definition_requires_query() {
        let definition = SearchDocumentsArgs::definition();
        assert_eq!(definition.name(), "searchDocuments");
        assert_eq!(definition.parameters_schema()["required"], json!(["query"]));
        assert_eq!(definition.parameters_schema()["properties"]["maxResults"]["default"], 5);
    }
}
