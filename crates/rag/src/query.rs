//! Validated user query.

use ragline_core::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

/// Message returned for missing or blank queries.
pub const EMPTY_QUERY_MESSAGE: &str = "Query is required and cannot be empty";

/// A trimmed, non-empty query.
///
/// The only way to build one is `Query::parse`, so the pipeline never sees
/// blank input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Trim the input and reject it if nothing is left.
    pub fn parse(raw: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(EMPTY_QUERY_MESSAGE.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `max_chars` characters, for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.0.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.0[..idx]),
            None => self.0.clone(),
        }
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
