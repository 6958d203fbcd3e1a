//! Ordered field-extraction rules.
//!
//! Each output field has a list of rules evaluated in sequence; the first rule
//! returning a non-empty string wins. Derived structured data always comes
//! before ingestion-time structured data.
//!
//! | Field   | Rules (in order)                                              | Fallback                |
//! |---------|---------------------------------------------------------------|-------------------------|
//! | title   | derived `title`, raw `title`                                  | `"Untitled"`            |
//! | content | first extractive answer, first snippet, raw `content`         | `"No content available"`|
//! | locator | derived `link`, raw `uri`                                     | unset                   |

use super::hit::SearchHit;
use super::raw::{RawDocument, RawSearchResult};

/// A single extraction rule over a backend document.
pub type FieldRule = fn(&RawDocument) -> Option<&str>;

/// Title precedence.
pub const TITLE_RULES: &[FieldRule] = &[derived_title, raw_title];

/// Content precedence.
pub const CONTENT_RULES: &[FieldRule] = &[first_extractive_answer, first_snippet, raw_content];

/// Locator precedence.
pub const LOCATOR_RULES: &[FieldRule] = &[derived_link, raw_uri];

/// Evaluates `rules` in order and returns the first non-empty value.
pub fn first_present(rules: &[FieldRule], document: &RawDocument) -> Option<String> {
    rules
        .iter()
        .filter_map(|rule| rule(document))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Normalizes one backend result; results without a document are skipped.
pub fn normalize_result(result: &RawSearchResult) -> Option<SearchHit> {
    let document = result.document.as_ref()?;

    let id = if document.id.is_empty() {
        result.id.clone()
    } else {
        document.id.clone()
    };

    Some(SearchHit::new(
        id,
        first_present(TITLE_RULES, document),
        first_present(CONTENT_RULES, document),
        first_present(LOCATOR_RULES, document),
    ))
}

/// Normalizes every result, preserving backend order.
pub fn normalize_results(results: &[RawSearchResult]) -> Vec<SearchHit> {
    results.iter().filter_map(normalize_result).collect()
}

fn derived_title(document: &RawDocument) -> Option<&str> {
    document.derived_struct_data.as_ref()?.title.as_deref()
}

fn raw_title(document: &RawDocument) -> Option<&str> {
    document.struct_data.as_ref()?.title.as_deref()
}

fn first_extractive_answer(document: &RawDocument) -> Option<&str> {
    document
        .derived_struct_data
        .as_ref()?
        .extractive_answers
        .first()?
        .content
        .as_deref()
}

fn first_snippet(document: &RawDocument) -> Option<&str> {
    document
        .derived_struct_data
        .as_ref()?
        .snippets
        .first()?
        .snippet
        .as_deref()
}

fn raw_content(document: &RawDocument) -> Option<&str> {
    document.struct_data.as_ref()?.content.as_deref()
}

fn derived_link(document: &RawDocument) -> Option<&str> {
    document.derived_struct_data.as_ref()?.link.as_deref()
}

fn raw_uri(document: &RawDocument) -> Option<&str> {
    document.struct_data.as_ref()?.uri.as_deref()
}
