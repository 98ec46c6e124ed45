//! Ask command handler.
//!
//! Indexes a directory into a fresh in-memory index and answers one question.

use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_knowledge::DocumentService;
use std::path::PathBuf;

/// Answer a question from the documents in a directory
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Directory of text documents (searched recursively)
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Question to answer
    #[arg(short, long)]
    pub query: String,

    /// Number of chunks to retrieve (default: rag.top_k)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Output as JSON, including the retrieved sources
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        if !self.data_dir.is_dir() {
            return Err(AppError::NotFound(format!(
                "Data directory does not exist: {:?}",
                self.data_dir
            )));
        }

        // One-shot runs never touch a persistent registry
        let mut config = config.clone();
        config.database_url = ":memory:".to_string();

        let service = DocumentService::from_config(&config)?;
        let reports = service.ingest_dir(&self.data_dir).await?;
        tracing::debug!("Indexed {} documents", reports.len());

        let top_k = self.top_k.unwrap_or(config.rag.top_k);
        let answer = service.answer(&self.query, top_k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            println!("{}", answer.answer.trim());
        }

        Ok(())
    }
}
