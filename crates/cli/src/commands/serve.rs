//! Serve command handler.
//!
//! Runs the HTTP API until interrupted.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};

/// Serve the document question-answering API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides server.host)
    #[arg(long, env = "DOCQA_HOST")]
    pub host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(long, env = "DOCQA_PORT")]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let mut config = config.clone();
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        docqa_server::serve(&config).await
    }
}
