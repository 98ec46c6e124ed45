//! Embedding engine.
//!
//! Wraps a provider and checks every response before it reaches the index:
//! one vector per input, in order, of the configured dimension, with only
//! finite components. Anything else is an external service failure.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use docqa_core::config::EmbeddingSettings;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Validating front end over an [`EmbeddingProvider`].
#[derive(Debug, Clone)]
pub struct EmbeddingEngine {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingEngine {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Build the engine for the configured provider.
    pub fn from_settings(settings: &EmbeddingSettings) -> AppResult<Self> {
        tracing::debug!(
            "Creating embedding provider: provider={}, model={}, dimensions={}",
            settings.provider,
            settings.model,
            settings.dimensions
        );
        Ok(Self::new(create_provider(settings)?))
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Embed `texts`, one vector per input in the same order.
    ///
    /// Empty input returns an empty result without calling the provider.
    pub async fn embed_texts(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(
            "Embedding {} texts using provider '{}' (model: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name()
        );

        let embeddings = self
            .provider
            .embed_batch(texts)
            .await
            .map_err(AppError::into_external)?;

        self.check(texts.len(), &embeddings)?;

        tracing::debug!(
            "Generated {} embeddings of dimension {}",
            embeddings.len(),
            self.dimensions()
        );

        Ok(embeddings)
    }

    /// Embed a single query text.
    pub async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut embeddings = self.embed_texts(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| AppError::ExternalService("No embedding returned".to_string()))
    }

    fn check(&self, expected: usize, embeddings: &[Vec<f32>]) -> AppResult<()> {
        if embeddings.len() != expected {
            return Err(AppError::ExternalService(format!(
                "Embedding provider returned {} vectors for {} inputs",
                embeddings.len(),
                expected
            )));
        }

        let dimensions = self.dimensions();
        for (i, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimensions {
                return Err(AppError::ExternalService(format!(
                    "Unexpected embedding dimensions at {}: got {}, expected {}",
                    i,
                    embedding.len(),
                    dimensions
                )));
            }
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(AppError::ExternalService(format!(
                    "Embedding {} contains non-finite values",
                    i
                )));
            }
        }

        Ok(())
    }
}
