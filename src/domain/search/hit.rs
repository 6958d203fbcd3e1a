//! Normalized search hit.

use serde::{Deserialize, Serialize};

use crate::domain::storage::UNKNOWN_FILE_NAME;

/// Title used when no extraction rule produced one.
pub const UNTITLED_PLACEHOLDER: &str = "Untitled";

/// Content used when no extraction rule produced any.
pub const NO_CONTENT_PLACEHOLDER: &str = "No content available";

/// One search result after normalization.
///
/// `title` and `content` are never empty: the constructor substitutes the
/// placeholders when the source had nothing to offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Backend document id (may be empty if the backend omitted it).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Best available text excerpt.
    pub content: String,
    /// `gs://bucket/path` of the source file, if known.
    #[serde(rename = "uri", skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
}

impl SearchHit {
    /// Creates a hit, filling empty title/content with placeholders and
    /// dropping an empty locator.
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        content: Option<String>,
        locator: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: non_empty(title).unwrap_or_else(|| UNTITLED_PLACEHOLDER.to_string()),
            content: non_empty(content).unwrap_or_else(|| NO_CONTENT_PLACEHOLDER.to_string()),
            locator: non_empty(locator),
        }
    }

    /// Returns the display file name: last segment of the locator, or
    /// `"unknown"` when the hit has no locator or it ends in `/`.
    pub fn file_name(&self) -> &str {
        self.locator
            .as_deref()
            .map(crate::domain::storage::file_name_of)
            .unwrap_or(UNKNOWN_FILE_NAME)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_get_placeholders() {
        let hit = SearchHit::new("1", Some(String::new()), None, Some(String::new()));
        assert_eq!(hit.title, "Untitled");
        assert_eq!(hit.content, "No content available");
        assert!(hit.locator.is_none());
    }

    #[test]
    fn populated_fields_are_kept() {
        let hit = SearchHit::new(
            "1",
            Some("Manual".to_string()),
            Some("Body".to_string()),
            Some("gs://docs/manual.pdf".to_string()),
        );
        assert_eq!(hit.title, "Manual");
        assert_eq!(hit.content, "Body");
        assert_eq!(hit.file_name(), "manual.pdf");
    }

    #[test]
    fn file_name_defaults_to_unknown() {
        let hit = SearchHit::new("1", None, None, None);
        assert_eq!(hit.file_name(), "unknown");
    }

    #[test]
    fn folder_locator_file_name_is_unknown() {
        let hit = SearchHit::new("1", None, None, Some("gs://docs/dir/".to_string()));
        assert_eq!(hit.locator.as_deref(), Some("gs://docs/dir/"));
        assert_eq!(hit.file_name(), "unknown");
    }

    #[test]
    fn serializes_locator_as_uri() {
        let hit = SearchHit::new("1", None, None, Some("gs://docs/a.pdf".to_string()));
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["uri"], "gs://docs/a.pdf");
    }
}
