//! Vector index abstraction for chunk embeddings.
//!
//! Defines a trait for nearest-neighbour storage generic over the metadata
//! stored alongside each vector.

use docqa_core::AppResult;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit<M> {
    /// Insertion-order slot of the stored vector
    pub slot: usize,

    /// Squared Euclidean distance to the query
    pub distance: f32,

    /// Metadata stored with the vector
    pub metadata: M,
}

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Appending vectors with metadata, slots assigned in insertion order
/// - Searching for the nearest vectors (top-k)
pub trait VectorIndex<M>: Send + Sync {
    /// Dimension every stored vector has.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `vectors` with their `metadata`, returning the assigned slots.
    ///
    /// The batch is validated as a whole; on error nothing is stored.
    fn add(&mut self, vectors: Vec<Vec<f32>>, metadata: Vec<M>) -> AppResult<Range<usize>>;

    /// Return the `k` nearest stored vectors to `query`, nearest first.
    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<SearchHit<M>>>;
}
