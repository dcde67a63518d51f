//! LLM provider factory.
//!
//! Builds the generation client once at startup from application
//! configuration. Credentials are validated here, so a malformed key fails
//! service startup instead of the first request.

use crate::client::LlmClient;
use crate::providers::{GroqClient, MockClient};
use crate::types::{ClientSettings, ProviderType, GROQ_BASE_URL};
use ragline_core::secret::require_secret;
use ragline_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the configured provider.
///
/// # Errors
/// Returns a configuration error if:
/// - Provider is unknown
/// - The API key is missing or fails sanitization
/// - The HTTP client cannot be built
pub fn create_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let provider = ProviderType::parse(&config.provider).ok_or_else(|| {
        AppError::Config(format!("Unknown provider: {}", config.provider))
    })?;

    let api_key = if provider.requires_api_key() {
        Some(require_secret("GROQ_API_KEY", config.groq_api_key.as_deref())?)
    } else {
        None
    };

    tracing::info!(
        "Creating {} generation client (model: {})",
        provider.as_str(),
        config.model
    );

    match provider {
        ProviderType::Groq => {
            let base_url = config.llm_endpoint.as_deref().unwrap_or(GROQ_BASE_URL);
            Ok(Arc::new(GroqClient::new(ClientSettings::new(base_url, api_key))?))
        }
        ProviderType::Mock => {
            tracing::warn!("Using mock generation provider");
            Ok(Arc::new(MockClient::default()))
        }
    }
}
