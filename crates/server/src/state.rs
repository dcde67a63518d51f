//! Application state shared across handlers

use ragline_core::AppConfig;
use ragline_rag::RagChain;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// The RAG pipeline, built once at startup
    pub chain: RagChain,
}

impl AppState {
    pub fn new(config: AppConfig, chain: RagChain) -> Self {
        Self {
            config: Arc::new(config),
            chain,
        }
    }
}
