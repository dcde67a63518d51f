//! Search gate.
//!
//! Decides from the query text alone whether fresh web results are worth
//! fetching. Queries about recent events, prices or conditions trigger a
//! search; everything else goes straight to the model.

/// Terms that signal a need for current or real-time information.
pub const SEARCH_KEYWORDS: [&str; 15] = [
    "latest",
    "recent",
    "current",
    "today",
    "now",
    "2024",
    "2025",
    "news",
    "update",
    "what happened",
    "breaking",
    "price",
    "weather",
    "stock",
    "market",
];

/// Whether the query should trigger a web search.
///
/// Case-insensitive substring match against `SEARCH_KEYWORDS`. No stemming
/// and no word boundaries: "known" matches "now".
pub fn needs_search(query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }

    let lowered = query.to_lowercase();
    SEARCH_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}
