//! Context formatting.
//!
//! Renders search results into the numbered text block that is injected
//! into the system prompt.

use crate::types::SearchResult;

/// Returned when there is nothing to format.
pub const NO_RESULTS_PLACEHOLDER: &str = "No search results found.";

/// Maximum characters of content kept per result.
pub const MAX_CONTENT_CHARS: usize = 500;

/// Appended to truncated content.
const TRUNCATION_MARKER: &str = "...";

/// Fallback for records without any title field.
const UNKNOWN_TITLE: &str = "Unknown Title";

/// Format search results for LLM context.
///
/// Each result becomes a 1-based numbered block: title line, content
/// (truncated to `MAX_CONTENT_CHARS` characters), then `Source: <url>`.
/// Blocks are separated by a blank line. Never fails.
///
/// # Example
/// ```
/// use ragline_search::{format_results, SearchRecord, SearchResult};
///
/// let results = vec![SearchResult::from(SearchRecord::new("Rust", "A language", "https://rust-lang.org"))];
/// assert_eq!(
///     format_results(&results),
///     "1. Rust\nA language\nSource: https://rust-lang.org"
/// );
/// ```
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_PLACEHOLDER.to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, result)| format_one(i + 1, result))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_one(rank: usize, result: &SearchResult) -> String {
    let (title, content, url) = match result {
        SearchResult::Record(record) => (
            record.display_title().unwrap_or(UNKNOWN_TITLE).to_string(),
            record.display_content(),
            record.display_url(),
        ),
        SearchResult::Text(text) => (format!("Result {}", rank), Some(text.as_str()), None),
    };

    let mut block = format!("{}. {}", rank, title);

    if let Some(content) = content.filter(|c| !c.is_empty()) {
        block.push('\n');
        block.push_str(&truncate_content(content));
    }

    if let Some(url) = url {
        block.push_str("\nSource: ");
        block.push_str(url);
    }

    block
}

/// Truncate to `MAX_CONTENT_CHARS` characters, marking the cut.
fn truncate_content(content: &str) -> String {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}
