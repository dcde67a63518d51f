//! Non-streaming response with search metadata.

use ragline_core::AppError;
use ragline_search::SearchResult;
use serde::{Deserialize, Serialize};

/// Answer to one query plus what search contributed to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResult {
    pub query: String,
    pub response: String,

    /// True only when the search provider was actually called
    pub search_used: bool,

    /// Raw provider results, in provider order
    pub search_results: Vec<SearchResult>,

    /// Length of the formatted context in characters (0 without search)
    pub context_length: usize,

    /// Caller-safe failure message, null on success
    pub error: Option<String>,
}

impl RagResult {
    /// Result for a request whose pipeline failed.
    pub fn failed(query: &str, error: &AppError) -> Self {
        let message = error.user_message();
        Self {
            query: query.to_string(),
            response: format!("Error processing request: {}", message),
            search_used: false,
            search_results: Vec::new(),
            context_length: 0,
            error: Some(message),
        }
    }
}
