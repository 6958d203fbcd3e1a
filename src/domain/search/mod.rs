//! Search module - hits, backend result schema, and normalization.
//!
//! The search backend returns loosely populated documents. This module owns
//! the typed view of that response, the ordered extraction rules that turn it
//! into [`SearchHit`]s, and the plain-text rendering used for operators.

mod extraction;
mod format;
mod hit;
mod raw;

pub use extraction::{
    first_present, normalize_results, normalize_result, FieldRule, CONTENT_RULES,
    LOCATOR_RULES, TITLE_RULES,
};
pub use format::{format_search_results, NO_RESULTS_MESSAGE};
pub use hit::{SearchHit, NO_CONTENT_PLACEHOLDER, UNTITLED_PLACEHOLDER};
pub use raw::{DerivedStructData, ExtractiveAnswer, RawDocument, RawSearchResult, Snippet, StructData};
