//! Typed view of the search backend's per-result payload.
//!
//! Only the fields the extraction rules read are modelled. Structured data
//! is user-defined on the backend side, so every string field tolerates a
//! value of another JSON type by treating it as absent.

use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the backend's `results` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub document: Option<RawDocument>,
}

/// Document payload attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Structured data supplied at ingestion time.
    #[serde(default)]
    pub struct_data: Option<StructData>,
    /// Structured data derived by the backend (titles, links, snippets).
    #[serde(default)]
    pub derived_struct_data: Option<DerivedStructData>,
}

/// Ingestion-time structured data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructData {
    #[serde(default, deserialize_with = "string_only")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub uri: Option<String>,
}

/// Backend-derived structured data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStructData {
    #[serde(default, deserialize_with = "string_only")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub link: Option<String>,
    #[serde(default)]
    pub extractive_answers: Vec<ExtractiveAnswer>,
    #[serde(default)]
    pub snippets: Vec<Snippet>,
}

/// Extractive answer produced by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractiveAnswer {
    #[serde(default, deserialize_with = "string_only")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub page_number: Option<String>,
}

/// Snippet produced by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(default, deserialize_with = "string_only")]
    pub snippet: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub snippet_status: Option<String>,
}

fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_backend_result() {
        let raw = json!({
            "id": "doc-1",
            "document": {
                "id": "doc-1",
                "name": "projects/p/locations/global/collections/default_collection/dataStores/ds/branches/0/documents/doc-1",
                "derivedStructData": {
                    "title": "Aircon manual",
                    "link": "gs://docs/aircon.pdf",
                    "extractive_answers": [{"content": "Press the button", "pageNumber": "3"}],
                    "snippets": [{"snippet": "the <b>aircon</b>", "snippet_status": "SUCCESS"}]
                }
            }
        });

        let result: RawSearchResult = serde_json::from_value(raw).unwrap();
        let derived = result.document.unwrap().derived_struct_data.unwrap();
        assert_eq!(derived.title.as_deref(), Some("Aircon manual"));
        assert_eq!(derived.extractive_answers[0].page_number.as_deref(), Some("3"));
        assert_eq!(derived.snippets[0].snippet.as_deref(), Some("the <b>aircon</b>"));
    }

    #[test]
    fn non_string_struct_fields_are_treated_as_absent() {
        let raw = json!({
            "document": {
                "structData": { "title": 42, "content": null, "uri": "gs://docs/a.pdf", "extra": [1, 2] }
            }
        });

        let result: RawSearchResult = serde_json::from_value(raw).unwrap();
        let data = result.document.unwrap().struct_data.unwrap();
        assert!(data.title.is_none());
        assert!(data.content.is_none());
        assert_eq!(data.uri.as_deref(), Some("gs://docs/a.pdf"));
    }

    #[test]
    fn missing_document_deserializes_to_none() {
        let result: RawSearchResult = serde_json::from_value(json!({"id": "x"})).unwrap();
        assert!(result.document.is_none());
    }
}
