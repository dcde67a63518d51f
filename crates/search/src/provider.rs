//! Search provider trait and factory.

use crate::providers::{StaticSearch, TavilyClient};
use crate::types::SearchResult;
use ragline_core::secret::require_secret;
use ragline_core::AppConfig;
use std::sync::Arc;

/// Trait for search providers.
///
/// `search` has no error channel: implementations log failures and return
/// an empty list so the pipeline can carry on without context.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Get provider name (e.g., "tavily", "static")
    fn provider_name(&self) -> &str;

    /// Run a search, preserving the provider's ranking.
    async fn search(&self, query: &str) -> Vec<SearchResult>;
}

/// Whether web search can be used for this process.
///
/// Built once at startup. A missing or malformed search credential
/// disables search instead of failing the service.
#[derive(Clone)]
pub enum SearchHandle {
    Available(Arc<dyn SearchProvider>),
    Unavailable(String),
}

impl SearchHandle {
    /// Wrap a ready provider.
    pub fn available(provider: Arc<dyn SearchProvider>) -> Self {
        SearchHandle::Available(provider)
    }

    /// Record why search is disabled.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SearchHandle::Unavailable(reason.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SearchHandle::Available(_))
    }
}

impl std::fmt::Debug for SearchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchHandle::Available(provider) => f
                .debug_tuple("Available")
                .field(&provider.provider_name())
                .finish(),
            SearchHandle::Unavailable(reason) => {
                f.debug_tuple("Unavailable").field(reason).finish()
            }
        }
    }
}

/// Create the search handle from configuration.
///
/// Never fails: construction problems are logged and turned into
/// `SearchHandle::Unavailable`.
pub fn create_search_handle(config: &AppConfig) -> SearchHandle {
    match config.search_provider.as_str() {
        "tavily" => {
            let api_key =
                match require_secret("TAVILY_API_KEY", config.tavily_api_key.as_deref()) {
                    Ok(key) => key,
                    Err(e) => {
                        tracing::warn!("Search service unavailable: {}", e);
                        return SearchHandle::unavailable(e.to_string());
                    }
                };

            match TavilyClient::new(api_key, config.max_search_results, config.request_timeout()) {
                Ok(client) => SearchHandle::available(Arc::new(client)),
                Err(e) => {
                    tracing::warn!("Search service unavailable: {}", e);
                    SearchHandle::unavailable(e.to_string())
                }
            }
        }
        "static" => {
            tracing::warn!("Using static search provider");
            SearchHandle::available(Arc::new(StaticSearch::new(Vec::new())))
        }
        other => {
            let reason = format!("Unknown search provider: {}", other);
            tracing::warn!("Search service unavailable: {}", reason);
            SearchHandle::unavailable(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_unavailable() {
        let config = AppConfig::default();
        let handle = create_search_handle(&config);
        assert!(!handle.is_available());
        match handle {
            SearchHandle::Unavailable(reason) => assert!(reason.contains("TAVILY_API_KEY")),
            SearchHandle::Available(_) => panic!("expected unavailable"),
        }
    }

    #[test]
    fn test_malformed_key_is_unavailable() {
        let mut config = AppConfig::default();
        config.tavily_api_key = Some("tvly-\u{200b}abc".to_string());
        let handle = create_search_handle(&config);
        assert!(!handle.is_available());
    }

    #[test]
    fn test_tavily_available_with_key() {
        let mut config = AppConfig::default();
        config.tavily_api_key = Some("tvly-valid".to_string());
        let handle = create_search_handle(&config);
        match handle {
            SearchHandle::Available(provider) => assert_eq!(provider.provider_name(), "tavily"),
            SearchHandle::Unavailable(reason) => panic!("expected available, got {}", reason),
        }
    }

    #[test]
    fn test_static_provider() {
        let mut config = AppConfig::default();
        config.search_provider = "static".to_string();
        let handle = create_search_handle(&config);
        assert_eq!(format!("{:?}", handle), "Available(\"static\")");
    }

    #[test]
    fn test_unknown_provider() {
        let mut config = AppConfig::default();
        config.search_provider = "altavista".to_string();
        assert!(!create_search_handle(&config).is_available());
    }
}
