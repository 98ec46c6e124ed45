//! Voice command handler.
//!
//! Runs the task agent on the console speech backend.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_llm::create_client;
use docqa_voice::{
    ChatBackend, ConsoleInput, ConsoleOutput, TaskStore, VoiceAgent, DEFAULT_TASKS_FILE,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Run the voice task and reminder agent
#[derive(Args, Debug)]
pub struct VoiceCommand {
    /// Task list location
    #[arg(long, default_value = DEFAULT_TASKS_FILE)]
    pub tasks_file: PathBuf,

    /// Send unrecognized utterances to the configured LLM
    #[arg(long)]
    pub chat: bool,

    /// Seconds between reminder checks
    #[arg(long, default_value_t = 30)]
    pub interval_secs: u64,
}

impl VoiceCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing voice command");

        let store = TaskStore::load(&self.tasks_file)?;
        let mut agent = VoiceAgent::new(store, Arc::new(ConsoleOutput::new()))?
            .with_reminder_interval(Duration::from_secs(self.interval_secs))?;

        if self.chat {
            let client = create_client(&config.llm)?;
            tracing::info!(
                "Chat fallback enabled ({} / {})",
                client.provider_name(),
                config.llm.model
            );
            agent = agent.with_chat(ChatBackend::new(client, &config.llm.model));
        }

        let mut input = ConsoleInput::new();
        agent.run(&mut input).await
    }
}
