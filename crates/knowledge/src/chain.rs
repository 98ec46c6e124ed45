//! RAG chain orchestration.
//!
//! Ingestion: chunk → embed → append to the index.
//! Answering: embed question → top-k search → render prompt → generate.

use crate::chunker::{Chunker, RecursiveChunker};
use crate::embeddings::EmbeddingEngine;
use crate::index::FlatIndex;
use crate::types::{ChunkRecord, RagAnswer, RetrievedChunk};
use crate::vector_index::VectorIndex;
use docqa_core::{AppConfig, AppError, AppResult};
use docqa_llm::{create_client, LlmClient, LlmRequest};
use docqa_prompt::PromptBuilder;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Model parameters passed to the generator on every question.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Embedded chunks of one document, not yet indexed.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    source: String,
    vectors: Vec<Vec<f32>>,
    records: Vec<ChunkRecord>,
}

impl PreparedDocument {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Question answering over an in-memory index of document chunks.
///
/// The index sits behind a read-write lock: each document's chunks are added
/// under one write lock so they occupy contiguous slots, and searches share
/// the read lock. Chunking, embedding and generation run outside the lock.
pub struct RagChain {
    chunker: Arc<dyn Chunker>,
    embedder: EmbeddingEngine,
    index: RwLock<Box<dyn VectorIndex<ChunkRecord>>>,
    generator: Arc<dyn LlmClient>,
    prompt: PromptBuilder,
    generation: GenerationOptions,
    top_k: usize,
}

impl RagChain {
    /// Assemble a chain over a fresh flat index sized for `embedder`.
    pub fn new(
        chunker: Arc<dyn Chunker>,
        embedder: EmbeddingEngine,
        generator: Arc<dyn LlmClient>,
        prompt: PromptBuilder,
        generation: GenerationOptions,
        top_k: usize,
    ) -> AppResult<Self> {
        if top_k == 0 {
            return Err(AppError::Config(
                "top_k must be greater than zero".to_string(),
            ));
        }

        let index: FlatIndex<ChunkRecord> = FlatIndex::new(embedder.dimensions())?;

        Ok(Self {
            chunker,
            embedder,
            index: RwLock::new(Box::new(index)),
            generator,
            prompt,
            generation,
            top_k,
        })
    }

    /// Build the chain described by the configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let generator = create_client(&config.llm)?;
        Self::from_config_with_generator(config, generator)
    }

    /// Build the chain from configuration with an explicit generator.
    pub fn from_config_with_generator(
        config: &AppConfig,
        generator: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        let chunker = RecursiveChunker::new(config.rag.chunk_size, config.rag.chunk_overlap)?;
        let embedder = EmbeddingEngine::from_settings(&config.embedding)?;
        let prompt = PromptBuilder::from_config(config.rag.prompt_template.as_deref())?;
        let generation = GenerationOptions {
            model: config.llm.model.clone(),
            temperature: Some(config.llm.temperature),
            max_tokens: Some(config.llm.max_tokens),
        };

        Self::new(
            Arc::new(chunker),
            embedder,
            generator,
            prompt,
            generation,
            config.rag.top_k,
        )
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Number of chunks currently indexed.
    pub async fn indexed_chunks(&self) -> usize {
        self.index.read().await.len()
    }

    /// Chunk, embed and index `text`, tagging every chunk with `source`.
    ///
    /// Returns the number of chunks added. On error the index is unchanged.
    pub async fn ingest(&self, source: &str, text: &str) -> AppResult<usize> {
        let prepared = self.prepare(source, text).await?;
        self.commit(prepared).await
    }

    /// Chunk and embed `text` without touching the index.
    pub async fn prepare(&self, source: &str, text: &str) -> AppResult<PreparedDocument> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            tracing::info!("Document '{}' produced no chunks", source);
            return Ok(PreparedDocument {
                source: source.to_string(),
                vectors: Vec::new(),
                records: Vec::new(),
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_texts(&texts).await?;

        let records = chunks
            .into_iter()
            .map(|c| ChunkRecord {
                source: source.to_string(),
                position: c.position,
                text: c.text,
            })
            .collect();

        Ok(PreparedDocument {
            source: source.to_string(),
            vectors,
            records,
        })
    }

    /// Append a prepared document to the index in one write.
    ///
    /// Returns the number of chunks added. On error the index is unchanged.
    pub async fn commit(&self, prepared: PreparedDocument) -> AppResult<usize> {
        if prepared.is_empty() {
            return Ok(0);
        }

        let PreparedDocument {
            source,
            vectors,
            records,
        } = prepared;
        let slots = self.index.write().await.add(vectors, records)?;

        tracing::info!(
            "Ingested '{}': {} chunks (slots {}..{})",
            source,
            slots.len(),
            slots.start,
            slots.end
        );

        Ok(slots.len())
    }

    /// Return the `top_k` chunks nearest to `question`, nearest first.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
        let query = self.embedder.embed_query(question).await?;

        let hits = self.index.read().await.search(&query, top_k)?;

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            hits.len(),
            top_k
        );

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedChunk {
                slot: hit.slot,
                distance: hit.distance,
                record: hit.metadata,
            })
            .collect())
    }

    /// Answer `question` from the configured number of retrieved chunks.
    ///
    /// The generator's text is returned verbatim.
    pub async fn ask(&self, question: &str) -> AppResult<String> {
        Ok(self.answer(question, self.top_k).await?.answer)
    }

    /// Answer `question` from `top_k` retrieved chunks, returning the sources too.
    ///
    /// An empty index still reaches the generator, with an empty context.
    pub async fn answer(&self, question: &str, top_k: usize) -> AppResult<RagAnswer> {
        tracing::info!("Answering question with top-{} retrieval", top_k);

        let sources = self.retrieve(question, top_k).await?;
        let context: Vec<String> = sources.iter().map(|s| s.record.text.clone()).collect();

        let prompt = self.prompt.build(question, &context)?;

        let mut request = LlmRequest::new(prompt.user, &self.generation.model);
        if let Some(temperature) = self.generation.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.generation.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            "Generating answer with provider '{}' from {} context chunks",
            self.generator.provider_name(),
            prompt.metadata.context_chunks
        );

        let response = self
            .generator
            .complete(&request)
            .await
            .map_err(AppError::into_external)?;

        Ok(RagAnswer {
            answer: response.content,
            sources,
        })
    }
}
