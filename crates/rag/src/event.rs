//! Streaming event protocol.

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

pub const STATUS_PROCESSING: &str = "Processing your request...";
pub const STATUS_SEARCH_UNAVAILABLE: &str = "Search unavailable, using existing knowledge...";
pub const STATUS_NO_SEARCH_NEEDED: &str = "Using existing knowledge...";
pub const STATUS_SEARCHING: &str = "Searching for relevant information...";
pub const STATUS_GENERATING: &str = "Generating response...";
pub const COMPLETE_MESSAGE: &str = "Response complete";

/// Kind of a streamed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Status,
    SearchComplete,
    Token,
    Error,
    Complete,
}

impl EventKind {
    /// Wire name, used as the SSE `event:` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Status => "status",
            EventKind::SearchComplete => "search_complete",
            EventKind::Token => "token",
            EventKind::Error => "error",
            EventKind::Complete => "complete",
        }
    }

    /// Whether this kind ends a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::Error | EventKind::Complete)
    }
}

/// One event of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEvent {
    #[serde(rename = "event")]
    pub kind: EventKind,
    pub data: String,
}

impl ResponseEvent {
    pub fn new(kind: EventKind, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::new(EventKind::Status, message)
    }

    pub fn search_complete(source_count: usize) -> Self {
        Self::new(
            EventKind::SearchComplete,
            format!("Found {} relevant sources", source_count),
        )
    }

    pub fn token(fragment: impl Into<String>) -> Self {
        Self::new(EventKind::Token, fragment)
    }

    /// Terminal failure event carrying a caller-safe message.
    pub fn error(message: &str) -> Self {
        Self::new(
            EventKind::Error,
            format!("Error processing request: {}", message),
        )
    }

    pub fn complete() -> Self {
        Self::new(EventKind::Complete, COMPLETE_MESSAGE)
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}

/// Lazily produced events for one request.
///
/// Dropping the stream cancels any in-flight provider call.
pub type EventStream = Pin<Box<dyn Stream<Item = ResponseEvent> + Send>>;
