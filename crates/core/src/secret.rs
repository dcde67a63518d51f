//! Credential validation and masking.
//!
//! API keys usually arrive through environment variables or `.env` files,
//! where copy/paste easily smuggles in zero-width spaces, BOMs or
//! non-breaking spaces. These break HTTP header encoding in ways that are
//! hard to diagnose, so keys are rejected up front with the offending
//! position instead of being silently rewritten.

use crate::error::{AppError, AppResult};

/// Validate an API key and return its trimmed form.
///
/// Surrounding ASCII whitespace is trimmed. After that every character must
/// be printable ASCII (`!` through `~`); anything else is a configuration
/// error naming the character position and its escaped form.
///
/// # Example
/// ```
/// use ragline_core::secret::sanitize_secret;
///
/// assert_eq!(sanitize_secret("GROQ_API_KEY", "  gsk_abc123\n").unwrap(), "gsk_abc123");
/// assert!(sanitize_secret("GROQ_API_KEY", "gsk_\u{200b}abc").is_err());
/// ```
pub fn sanitize_secret(name: &str, raw: &str) -> AppResult<String> {
    let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace());
    // Positions are reported against the raw value
    let leading = raw.len() - raw.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();

    if trimmed.is_empty() {
        return Err(AppError::Config(format!("{} cannot be empty", name)));
    }

    if let Some((position, ch)) = trimmed
        .chars()
        .enumerate()
        .find(|(_, c)| !is_printable_ascii(*c))
    {
        return Err(AppError::Config(format!(
            "{} contains an invalid character at position {}: '{}'. \
             Check the key for hidden Unicode or whitespace characters and re-enter it.",
            name,
            leading + position,
            ch.escape_unicode()
        )));
    }

    Ok(trimmed.to_string())
}

/// Validate an optional API key, failing when it is absent.
pub fn require_secret(name: &str, value: Option<&str>) -> AppResult<String> {
    match value {
        Some(raw) => sanitize_secret(name, raw),
        None => Err(AppError::Config(format!("Missing required API key: {}", name))),
    }
}

/// Masked representation of a secret for logs.
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len < 8 {
        return "***masked***".to_string();
    }

    let head: String = secret.chars().take(4).collect();
    let tail: String = secret.chars().skip(len - 4).collect();
    format!("{}...{} (len:{})", head, tail, len)
}

fn is_printable_ascii(c: char) -> bool {
    matches!(c, '!'..='~')
}
