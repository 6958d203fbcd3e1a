//! Plain-text rendering of search hits.

use super::hit::SearchHit;

/// Rendering of an empty hit list.
pub const NO_RESULTS_MESSAGE: &str = "No relevant documents found.";

/// Renders hits as numbered text blocks separated by `---`.
///
/// ```text
/// [1] Title
/// URL: gs://bucket/file.pdf
/// Content: ...
/// ```
pub fn format_search_results(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(index, hit)| {
            let mut block = format!("[{}] {}\n", index + 1, hit.title);
            if let Some(ref locator) = hit.locator {
                block.push_str(&format!("URL: {}\n", locator));
            }
            block.push_str(&format!("Content: {}\n", hit.content));
            block
        })
        .collect::<Vec<_>>()
        .join("\n---\n\n")
}
