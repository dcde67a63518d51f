//! Ask command handler.
//!
//! Runs one query through the RAG pipeline. Answer text goes to stdout,
//! progress goes to stderr.

use clap::Args;
use futures::StreamExt;
use ragline_core::{AppConfig, AppError, AppResult};
use ragline_rag::{EventKind, Query, RagChain};
use std::io::Write;

/// Answer one query in the terminal
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Never search the web for context
    #[arg(long)]
    pub no_search: bool,

    /// Wait for the whole answer instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Output as JSON (one event per line when streaming)
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let query = Query::parse(&self.query)?;
        let chain = super::build_chain(config)?;
        let use_search = !self.no_search;

        if self.no_stream {
            self.handle_non_streaming(&chain, &query, use_search).await
        } else {
            self.handle_streaming(&chain, query, use_search).await
        }
    }

    async fn handle_non_streaming(
        &self,
        chain: &RagChain,
        query: &Query,
        use_search: bool,
    ) -> AppResult<()> {
        let result = chain.run_with_metadata(query, use_search).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", result.response);
            if result.search_used {
                tracing::debug!(
                    "Answered with {} search results ({} chars of context)",
                    result.search_results.len(),
                    result.context_length
                );
            }
        }

        match result.error {
            Some(message) => Err(AppError::Other(message)),
            None => Ok(()),
        }
    }

    async fn handle_streaming(
        &self,
        chain: &RagChain,
        query: Query,
        use_search: bool,
    ) -> AppResult<()> {
        let mut events = chain.stream(query, use_search);
        let mut stdout = std::io::stdout();

        while let Some(event) = events.next().await {
            if self.json {
                println!("{}", serde_json::to_string(&event)?);
                if event.kind == EventKind::Error {
                    return Err(AppError::Other(event.data));
                }
                continue;
            }

            match event.kind {
                EventKind::Status | EventKind::SearchComplete => {
                    eprintln!("[{}]", event.data);
                }
                EventKind::Token => {
                    print!("{}", event.data);
                    stdout.flush().ok();
                }
                EventKind::Complete => {
                    println!();
                }
                EventKind::Error => {
                    println!();
                    return Err(AppError::Other(event.data));
                }
            }
        }

        Ok(())
    }
}
