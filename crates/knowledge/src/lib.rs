//! Document knowledge base and retrieval-augmented answering.
//!
//! Pipeline: document → [`chunker`] → chunks → [`embeddings`] → vectors →
//! [`index`]. Questions are embedded, matched against the index, and the
//! nearest chunks are rendered into a prompt for the generator by [`chain`].
//! [`service`] wraps the chain with the SQLite [`registry`] of ingested
//! documents.

pub mod chain;
pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod registry;
pub mod service;
pub mod types;
pub mod vector_index;

// Re-export commonly used types
pub use chain::{GenerationOptions, PreparedDocument, RagChain, DEFAULT_TOP_K};
pub use chunker::{chunk_text, Chunker, RecursiveChunker};
pub use embeddings::{create_provider, EmbeddingEngine, EmbeddingProvider};
pub use index::FlatIndex;
pub use registry::DocumentRegistry;
pub use service::{DocumentService, IngestReport};
pub use types::{Chunk, ChunkRecord, DocumentRecord, RagAnswer, RetrievedChunk, SourceDocument};
pub use vector_index::{SearchHit, VectorIndex};
