//! Document question-answering service.
//!
//! The facade used by the HTTP server and the CLI: ingest uploaded documents
//! into the RAG chain, record them in the registry, and answer questions.

use crate::chain::RagChain;
use crate::loader::{decode_text, load_documents};
use crate::registry::DocumentRegistry;
use crate::types::{DocumentRecord, RagAnswer};
use docqa_core::{AppConfig, AppResult};
use docqa_llm::LlmClient;
use std::path::Path;
use std::sync::Arc;

/// Outcome of ingesting one document.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document: DocumentRecord,
    pub chunks: usize,
}

/// Ingest and ask operations over a shared chain and registry.
pub struct DocumentService {
    chain: RagChain,
    registry: DocumentRegistry,
}

impl DocumentService {
    pub fn new(chain: RagChain, registry: DocumentRegistry) -> Self {
        Self { chain, registry }
    }

    /// Build the service from configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let chain = RagChain::from_config(config)?;
        let registry = DocumentRegistry::open(&config.database_url)?;
        Ok(Self::new(chain, registry))
    }

    /// Build the service from configuration with an explicit generator.
    pub fn from_config_with_generator(
        config: &AppConfig,
        generator: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        let chain = RagChain::from_config_with_generator(config, generator)?;
        let registry = DocumentRegistry::open(&config.database_url)?;
        Ok(Self::new(chain, registry))
    }

    pub fn chain(&self) -> &RagChain {
        &self.chain
    }

    /// Decode `bytes` as UTF-8 and ingest them under `filename`.
    pub async fn ingest_bytes(&self, filename: &str, bytes: Vec<u8>) -> AppResult<IngestReport> {
        let size_bytes = bytes.len() as u64;
        let text = decode_text(filename, bytes)?;
        self.ingest_text(filename, &text, size_bytes).await
    }

    async fn ingest_text(
        &self,
        filename: &str,
        text: &str,
        size_bytes: u64,
    ) -> AppResult<IngestReport> {
        let prepared = self.chain.prepare(filename, text).await?;

        // Registry row first: a failed insert leaves nothing searchable
        let document = self
            .registry
            .record(filename, size_bytes, prepared.len())
            .await?;

        match self.chain.commit(prepared).await {
            Ok(chunks) => Ok(IngestReport { document, chunks }),
            Err(e) => {
                if let Err(cleanup) = self.registry.remove(&document.id).await {
                    tracing::error!(
                        "Failed to remove registry row for '{}' after indexing error: {}",
                        filename,
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    /// Ingest every UTF-8 file under `dir`, returning one report per file.
    pub async fn ingest_dir(&self, dir: &Path) -> AppResult<Vec<IngestReport>> {
        let documents = load_documents(dir)?;

        let mut reports = Vec::with_capacity(documents.len());
        for doc in documents {
            let size_bytes = doc.text.len() as u64;
            reports.push(self.ingest_text(&doc.name, &doc.text, size_bytes).await?);
        }

        tracing::info!(
            "Ingested {} documents ({} chunks) from {:?}, registry holds {}",
            reports.len(),
            reports.iter().map(|r| r.chunks).sum::<usize>(),
            dir,
            self.registry.count().await?
        );

        Ok(reports)
    }

    /// Answer `question` with the configured retrieval depth.
    pub async fn ask(&self, question: &str) -> AppResult<String> {
        self.chain.ask(question).await
    }

    /// Answer `question` from `top_k` chunks, including the sources.
    pub async fn answer(&self, question: &str, top_k: usize) -> AppResult<RagAnswer> {
        self.chain.answer(question, top_k).await
    }

    /// Documents ingested so far.
    pub async fn documents(&self) -> AppResult<Vec<DocumentRecord>> {
        self.registry.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::AppError;
    use docqa_llm::{LlmRequest, LlmResponse, LlmUsage};
    use std::fs;
    use tempfile::TempDir;

    struct EchoGenerator;

    #[async_trait::async_trait]
    impl LlmClient for EchoGenerator {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            Ok(LlmResponse {
                content: request.prompt.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    fn service() -> DocumentService {
        DocumentService::from_config_with_generator(&AppConfig::default(), Arc::new(EchoGenerator))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_bytes_records_document() {
        let service = service();

        let report = service
            .ingest_bytes("notes.txt", b"Rust has ownership.".to_vec())
            .await
            .unwrap();
        assert_eq!(report.chunks, 1);
        assert_eq!(report.document.filename, "notes.txt");
        assert_eq!(report.document.size_bytes, 19);

        let docs = service.documents().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].chunk_count, 1);

        let answer = service.ask("What does Rust have?").await.unwrap();
        assert!(answer.contains("Rust has ownership."));
    }

    #[tokio::test]
    async fn test_invalid_utf8_rejected_without_side_effects() {
        let service = service();

        let result = service.ingest_bytes("bad.bin", vec![0xff, 0xfe]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(service.documents().await.unwrap().is_empty());
        assert_eq!(service.chain().indexed_chunks().await, 0);
    }

    #[tokio::test]
    async fn test_registry_failure_leaves_index_unchanged() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("docqa.db");
        let config = AppConfig::default();

        let chain =
            RagChain::from_config_with_generator(&config, Arc::new(EchoGenerator)).unwrap();
        let registry = DocumentRegistry::open(&db.display().to_string()).unwrap();
        let service = DocumentService::new(chain, registry);

        // Reject one filename at the database level
        let conn = rusqlite::Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_upload BEFORE INSERT ON documents
             WHEN NEW.filename = 'rejected.txt'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        let result = service
            .ingest_bytes("rejected.txt", b"Cats sleep all day.".to_vec())
            .await;
        assert!(matches!(result, Err(AppError::Knowledge(_))));
        assert_eq!(service.chain().indexed_chunks().await, 0);
        assert!(service.documents().await.unwrap().is_empty());

        let report = service
            .ingest_bytes("accepted.txt", b"Dogs fetch sticks.".to_vec())
            .await
            .unwrap();
        assert_eq!(report.chunks, 1);
        assert_eq!(service.chain().indexed_chunks().await, 1);
        assert_eq!(service.documents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "Cats sleep all day.").unwrap();
        fs::write(temp.path().join("b.txt"), "Dogs fetch sticks.").unwrap();
        fs::write(temp.path().join("c.bin"), [0xff, 0x00, 0xfe]).unwrap();

        let service = service();
        let reports = service.ingest_dir(temp.path()).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(service.chain().indexed_chunks().await, 2);

        let answer = service.answer("Which animal fetches sticks?", 1).await.unwrap();
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].record.source, "b.txt");
    }
}
