//! Types for the document question-answering pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A contiguous piece of a source document produced by a chunker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequence position within the document, starting at 0
    pub position: usize,

    /// Trimmed chunk text
    pub text: String,

    /// Byte range of `text` in the source document
    pub byte_range: Range<usize>,
}

/// Metadata stored in the vector index for every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Opaque document identifier (the uploaded filename)
    pub source: String,

    /// Position of the chunk within its document
    pub position: usize,

    /// Chunk text fed to the prompt on retrieval
    pub text: String,
}

/// A document loaded from disk, decoded as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path relative to the scanned directory
    pub name: String,

    /// Full document text
    pub text: String,
}

/// A row of the document registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique identifier (UUID)
    pub id: String,

    /// Uploaded filename
    pub filename: String,

    /// Size of the raw upload in bytes
    pub size_bytes: u64,

    /// Number of chunks added to the index
    pub chunk_count: usize,

    /// When the document was ingested
    pub ingested_at: DateTime<Utc>,
}

/// One retrieved chunk with its distance to the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Index slot the chunk was stored at
    pub slot: usize,

    /// Squared Euclidean distance to the question vector
    pub distance: f32,

    /// Stored chunk metadata
    #[serde(flatten)]
    pub record: ChunkRecord,
}

/// Generated answer together with the context it was conditioned on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// Generator output, returned verbatim
    pub answer: String,

    /// Retrieved chunks, nearest first
    pub sources: Vec<RetrievedChunk>,
}
