//! LLM provider factory.
//!
//! This module creates LLM clients from the `llm` configuration section,
//! resolving endpoints and secrets.

use crate::client::LlmClient;
use crate::providers::{ollama::DEFAULT_OLLAMA_URL, openai::DEFAULT_OPENAI_URL};
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use docqa_core::config::LlmSettings;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the configured provider.
///
/// # Errors
/// Returns `AppError::Config` if:
/// - Provider is unknown
/// - Required secrets are missing
/// - Client initialization fails
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    let provider = ProviderType::parse(&settings.provider).ok_or_else(|| {
        AppError::Config(format!("Unknown provider: {}", settings.provider))
    })?;
    let timeout = Duration::from_secs(settings.timeout_secs);

    tracing::debug!(
        "Creating LLM client: provider={}, model={}",
        provider.as_str(),
        settings.model
    );

    match provider {
        ProviderType::Ollama => {
            let base_url = settings.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
            let client = OllamaClient::with_timeout(base_url, timeout)
                .map_err(|e| AppError::Config(e.to_string()))?;
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI => {
            let api_key = settings.api_key.as_deref().ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let base_url = settings.endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_URL);
            let client = OpenAiClient::new(base_url, api_key, timeout)
                .map_err(|e| AppError::Config(e.to_string()))?;
            Ok(Arc::new(client))
        }
    }
}
