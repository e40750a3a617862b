//! In-memory cosine-similarity vector sub-index
//!
//! Holds one embedding per chunk position and answers nearest-neighbor
//! queries by exhaustive cosine scan. The corpus here is a handful of
//! uploaded documents, so a linear scan beats carrying an external vector
//! server and keeps rebuilds trivially idempotent.

use crate::errors::{DocChatError, Result};

/// Embeddings for the indexed chunk set, positions matching input order
#[derive(Debug, Clone)]
pub struct VectorIndex {
    embeddings: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build from one embedding per chunk
    ///
    /// All vectors must share a dimension; an empty vector for any chunk
    /// fails the build rather than silently degrading coverage.
    pub fn build(embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if let Some(first) = embeddings.first() {
            let dim = first.len();
            if dim == 0 {
                return Err(DocChatError::IndexBuild(
                    "embedding backend produced an empty vector".to_string(),
                ));
            }
            if let Some(position) = embeddings.iter().position(|e| e.len() != dim) {
                return Err(DocChatError::IndexBuild(format!(
                    "embedding dimension mismatch at chunk {}: {} != {}",
                    position,
                    embeddings[position].len(),
                    dim
                )));
            }
        }

        Ok(Self { embeddings })
    }

    /// Top-k chunk positions by cosine similarity to the query vector
    pub fn query(&self, query_vec: &[f32], k: usize) -> Vec<(usize, f64)> {
        if self.embeddings.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f64)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(position, embedding)| (position, cosine_similarity(query_vec, embedding)))
            .collect();

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        ranked
    }

    /// Number of indexed embeddings
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// True when no embeddings are indexed
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

/// Cosine similarity in `[-1, 1]`; zero vectors score 0
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len().min(b.len());
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for i in 0..len {
        dot += a[i] as f64 * b[i] as f64;
        norm_a += (a[i] as f64).powi(2);
        norm_b += (b[i] as f64).powi(2);
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-12 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vector_ranks_first() {
        let index = VectorIndex::build(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.7, 0.7, 0.0],
        ])
        .unwrap();

        let results = index.query(&[1.0, 0.0, 0.0], 3);
        assert_eq!(results[0].0, 0);
        assert!((results[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_k_bounds_results() {
        let index = VectorIndex::build(vec![vec![1.0, 0.0]; 5]).unwrap();
        assert_eq!(index.query(&[1.0, 0.0], 2).len(), 2);
    }

    #[test]
    fn test_dimension_mismatch_fails_build() {
        let result = VectorIndex::build(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]);
        assert!(matches!(result, Err(DocChatError::IndexBuild(_))));
    }

    #[test]
    fn test_empty_embedding_fails_build() {
        let result = VectorIndex::build(vec![vec![]]);
        assert!(matches!(result, Err(DocChatError::IndexBuild(_))));
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_opposite_vectors_negative() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_tie_break() {
        let index = VectorIndex::build(vec![vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap();
        let results = index.query(&[1.0, 0.0], 2);
        assert_eq!(results[0].0, 0);
        assert_eq!(results[1].0, 1);
    }
}
