//! Error types for Ragline.
//!
//! This module defines a unified error enum that covers every failure
//! category in the service: configuration, provider calls, prompt rendering,
//! request validation and serialization.

use thiserror::Error;

/// Unified error type for Ragline.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic. Errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing or malformed credentials, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Search provider errors
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Rejected caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A provider call exceeded its deadline
    #[error("Timed out after {seconds}s waiting for {operation}")]
    Timeout { operation: String, seconds: u64 },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Message that is safe to hand back to a caller.
    ///
    /// Provider errors can carry response bodies and internal URLs, so they
    /// collapse to a short description. The full error is expected to be
    /// logged by whoever calls this.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Timeout { operation, .. } => {
                format!("{} did not respond in time", operation)
            }
            AppError::Llm(_) => "the language model failed to generate a response".to_string(),
            AppError::Search(_) => "the search provider failed".to_string(),
            AppError::Config(_) => "the service is not configured correctly".to_string(),
            AppError::Prompt(_) => "the prompt could not be prepared".to_string(),
            AppError::Io(_) | AppError::Serialization(_) | AppError::Other(_) => {
                "an internal error occurred".to_string()
            }
        }
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
