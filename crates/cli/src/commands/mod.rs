//! Command handlers for the Ragline CLI.

pub mod ask;
pub mod serve;

pub use ask::AskCommand;
pub use serve::ServeCommand;

use ragline_core::{AppConfig, AppResult};
use ragline_llm::create_client;
use ragline_rag::RagChain;
use ragline_search::create_search_handle;

/// Build the providers and the pipeline.
///
/// A generation provider that cannot be built is fatal; a search provider
/// that cannot be built only disables search.
pub fn build_chain(config: &AppConfig) -> AppResult<RagChain> {
    config.validate()?;

    let llm = create_client(config)?;
    let search = create_search_handle(config);
    if !search.is_available() {
        tracing::warn!("Web search is disabled; answers will use existing knowledge only");
    }

    RagChain::from_config(config, llm, search)
}
