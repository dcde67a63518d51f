//! Provider selection types.

use std::time::Duration;

/// Groq's OpenAI-compatible API root.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    /// Groq, or any server speaking the OpenAI chat completions API
    Groq,
    /// Scripted in-process responses
    Mock,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Mock => "mock",
        }
    }

    /// Whether the provider needs an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Groq)
    }
}

/// Connection settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API root, without a trailing slash
    pub base_url: String,

    /// Sanitized API key
    pub api_key: Option<String>,

    /// Connect timeout for the HTTP client
    pub connect_timeout: Duration,
}

impl ClientSettings {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            connect_timeout: Duration::from_secs(10),
        }
    }
}
