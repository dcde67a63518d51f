//! Serve command handler.

use clap::Args;
use ragline_core::{AppConfig, AppError, AppResult};
use ragline_server::AppState;

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, mut config: AppConfig) -> AppResult<()> {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }

        let chain = super::build_chain(&config)?;

        tracing::info!(
            "Starting server on {} (cors origins: {:?})",
            config.bind_address(),
            config.cors_origins
        );

        ragline_server::serve(AppState::new(config, chain))
            .await
            .map_err(|e| AppError::Other(format!("Server error: {:#}", e)))
    }
}
