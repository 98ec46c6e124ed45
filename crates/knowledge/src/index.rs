//! In-memory flat vector index with exact squared-L2 search.

use crate::vector_index::{SearchHit, VectorIndex};
use docqa_core::{AppError, AppResult};
use std::ops::Range;

/// Flat index: every search scans all stored vectors.
///
/// Vectors are kept in one contiguous buffer; slot `i` occupies
/// `data[i * dimension..(i + 1) * dimension]` and `metadata[i]`.
#[derive(Debug, Clone)]
pub struct FlatIndex<M> {
    dimension: usize,
    data: Vec<f32>,
    metadata: Vec<M>,
}

impl<M> FlatIndex<M> {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> AppResult<Self> {
        if dimension == 0 {
            return Err(AppError::Config(
                "Index dimension must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            dimension,
            data: Vec::new(),
            metadata: Vec::new(),
        })
    }

    /// Vector and metadata stored at `slot`.
    pub fn entry(&self, slot: usize) -> Option<(&[f32], &M)> {
        let metadata = self.metadata.get(slot)?;
        let start = slot * self.dimension;
        Some((&self.data[start..start + self.dimension], metadata))
    }

    fn check_vector(&self, vector: &[f32], what: &str) -> AppResult<()> {
        if vector.len() != self.dimension {
            return Err(AppError::Validation(format!(
                "{} has dimension {}, index expects {}",
                what,
                vector.len(),
                self.dimension
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(AppError::Validation(format!(
                "{} contains non-finite values",
                what
            )));
        }
        Ok(())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

impl<M> VectorIndex<M> for FlatIndex<M>
where
    M: Clone + Send + Sync,
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.metadata.len()
    }

    fn add(&mut self, vectors: Vec<Vec<f32>>, metadata: Vec<M>) -> AppResult<Range<usize>> {
        if vectors.len() != metadata.len() {
            return Err(AppError::Validation(format!(
                "Got {} vectors but {} metadata entries",
                vectors.len(),
                metadata.len()
            )));
        }

        for (i, vector) in vectors.iter().enumerate() {
            self.check_vector(vector, &format!("Vector {}", i))?;
        }

        let start = self.metadata.len();
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(&vector);
        }
        self.metadata.extend(metadata);

        tracing::debug!(
            "Added {} vectors to index (total: {})",
            self.metadata.len() - start,
            self.metadata.len()
        );

        Ok(start..self.metadata.len())
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<SearchHit<M>>> {
        if self.metadata.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        self.check_vector(query, "Query")?;

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .map(|stored| squared_l2(query, stored))
            .enumerate()
            .collect();

        // Stable sort keeps lower slots first among equal distances
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(slot, distance)| SearchHit {
                slot,
                distance,
                metadata: self.metadata[slot].clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(vectors: &[[f32; 2]]) -> FlatIndex<String> {
        let mut index: FlatIndex<String> = FlatIndex::new(2).unwrap();
        let metadata: Vec<String> = (0..vectors.len()).map(|i| format!("m{}", i)).collect();
        index
            .add(vectors.iter().map(|v| v.to_vec()).collect(), metadata)
            .unwrap();
        index
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(FlatIndex::<String>::new(0).is_err());
    }

    #[test]
    fn test_empty_index_search() {
        let index: FlatIndex<String> = FlatIndex::new(3).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[0.0, 0.0, 0.0], 5).unwrap().is_empty());
        // Dimension is not checked when there is nothing to compare against
        assert!(index.search(&[0.0], 1).unwrap().is_empty());
    }

    #[test]
    fn test_slots_follow_insertion_order() {
        let mut index: FlatIndex<&str> = FlatIndex::new(2).unwrap();

        let first = index
            .add(vec![vec![0.0, 0.0], vec![1.0, 0.0]], vec!["a", "b"])
            .unwrap();
        let second = index.add(vec![vec![0.0, 1.0]], vec!["c"]).unwrap();

        assert_eq!(first, 0..2);
        assert_eq!(second, 2..3);
        assert_eq!(index.len(), 3);
        assert_eq!(index.entry(2), Some((&[0.0, 1.0][..], &"c")));
        assert_eq!(index.entry(3), None);
    }

    #[test]
    fn test_stored_vector_is_its_own_nearest() {
        let index = index_with(&[[0.0, 0.0], [3.0, 4.0], [1.0, 1.0]]);

        let hits = index.search(&[3.0, 4.0], 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slot, 1);
        assert_eq!(hits[0].metadata, "m1");
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn test_results_sorted_and_bounded() {
        let index = index_with(&[[5.0, 0.0], [1.0, 0.0], [3.0, 0.0], [2.0, 0.0]]);

        let hits = index.search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 4);
        let slots: Vec<usize> = hits.iter().map(|h| h.slot).collect();
        assert_eq!(slots, vec![1, 3, 2, 0]);
        assert_eq!(hits[0].distance, 1.0);
        assert_eq!(hits[3].distance, 25.0);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));

        assert_eq!(index.search(&[0.0, 0.0], 2).unwrap().len(), 2);
        assert!(index.search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_broken_by_slot() {
        let index = index_with(&[[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]]);

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let slots: Vec<usize> = hits.iter().map(|h| h.slot).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn test_count_mismatch_leaves_index_unchanged() {
        let mut index = index_with(&[[0.0, 0.0]]);

        let result = index.add(vec![vec![1.0, 1.0], vec![2.0, 2.0]], vec!["x".to_string()]);
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_bad_vector_rejects_whole_batch() {
        let mut index = index_with(&[[0.0, 0.0]]);

        let wrong_dim = index.add(
            vec![vec![1.0, 1.0], vec![1.0, 2.0, 3.0]],
            vec!["x".to_string(), "y".to_string()],
        );
        assert!(matches!(wrong_dim, Err(AppError::Validation(_))));

        let non_finite = index.add(vec![vec![f32::INFINITY, 0.0]], vec!["z".to_string()]);
        assert!(matches!(non_finite, Err(AppError::Validation(_))));

        assert_eq!(index.len(), 1);
        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 1);
    }

    #[test]
    fn test_query_dimension_checked() {
        let index = index_with(&[[0.0, 0.0]]);
        let result = index.search(&[0.0, 0.0, 0.0], 1);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
