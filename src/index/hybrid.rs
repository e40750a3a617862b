//! Hybrid index: weighted fusion of lexical and vector retrieval
//!
//! Build creates both sub-indices over the same chunk set or fails
//! outright; downstream stages assume hybrid coverage, so there is no
//! silent single-mode fallback. Query fetches top-k candidates from each
//! side, scales each side's scores against its best hit, merges them with
//! the configured weights, and deduplicates by content fingerprint keeping
//! the first (highest-ranked) occurrence.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::config::RetrievalConfig;
use crate::documents::types::Document;
use crate::errors::{DocChatError, Result};
use crate::index::lexical::LexicalIndex;
use crate::index::vector::VectorIndex;
use crate::llm::Embedder;

/// A retrieval capability: question text in, ranked deduplicated chunks out
///
/// The workflow controller depends only on this trait, which keeps it
/// testable against stub retrievers.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Top-k chunks for a question, deduplicated by content fingerprint
    async fn query(&self, question: &str, k: usize) -> Result<Vec<Document>>;
}

/// Sub-index contribution weights for score fusion
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Lexical (BM25) contribution
    pub lexical_weight: f64,
    /// Vector (cosine) contribution
    pub vector_weight: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            lexical_weight: 0.4,
            vector_weight: 0.6,
        }
    }
}

impl From<&RetrievalConfig> for FusionConfig {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            lexical_weight: config.lexical_weight,
            vector_weight: config.vector_weight,
        }
    }
}

/// Lexical + vector index over one chunk set
pub struct HybridIndex {
    chunks: Vec<Document>,
    lexical: LexicalIndex,
    vector: VectorIndex,
    embedder: Arc<dyn Embedder>,
    fusion: FusionConfig,
}

impl HybridIndex {
    /// Build both sub-indices over the chunk set
    ///
    /// Chunks carrying a precomputed embedding are indexed as-is; the rest
    /// are embedded here. Any embedding failure fails the whole build.
    pub async fn build(
        chunks: Vec<Document>,
        embedder: Arc<dyn Embedder>,
        fusion: FusionConfig,
    ) -> Result<Self> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let lexical = LexicalIndex::build(&texts);

        let mut embeddings: Vec<Option<Vec<f32>>> =
            chunks.iter().map(|c| c.metadata.embedding.clone()).collect();

        let pending: Vec<usize> = embeddings
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_none())
            .map(|(i, _)| i)
            .collect();

        if !pending.is_empty() {
            let texts: Vec<String> = pending.iter().map(|&i| chunks[i].content.clone()).collect();
            let vectors = embedder
                .embed_batch(&texts)
                .await
                .map_err(|e| DocChatError::IndexBuild(format!("embedding backend failed: {}", e)))?;
            if vectors.len() != pending.len() {
                return Err(DocChatError::IndexBuild(format!(
                    "embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    pending.len()
                )));
            }
            for (&i, vector) in pending.iter().zip(vectors) {
                embeddings[i] = Some(vector);
            }
        }

        let embeddings: Vec<Vec<f32>> = embeddings.into_iter().flatten().collect();
        let vector = VectorIndex::build(embeddings)?;

        debug!(chunks = chunks.len(), "hybrid index built");
        Ok(Self {
            chunks,
            lexical,
            vector,
            embedder,
            fusion,
        })
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when no chunks are indexed
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Fuse per-sub-index rankings into one weighted, deduplicated list
    fn fuse(
        &self,
        lexical_hits: Vec<(usize, f64)>,
        vector_hits: Vec<(usize, f64)>,
        k: usize,
    ) -> Vec<Document> {
        let lex_norm = normalize(&lexical_hits);
        let vec_norm = normalize(&vector_hits);

        let mut fused: HashMap<usize, f64> = HashMap::new();
        for (position, score) in &lex_norm {
            *fused.entry(*position).or_insert(0.0) += self.fusion.lexical_weight * score;
        }
        for (position, score) in &vec_norm {
            *fused.entry(*position).or_insert(0.0) += self.fusion.vector_weight * score;
        }

        let mut ranked: Vec<(usize, f64)> = fused.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::new();
        for (position, _) in ranked {
            let chunk = &self.chunks[position];
            if seen.insert(chunk.fingerprint()) {
                results.push(chunk.clone());
                if results.len() >= k {
                    break;
                }
            }
        }
        results
    }
}

#[async_trait]
impl Retriever for HybridIndex {
    async fn query(&self, question: &str, k: usize) -> Result<Vec<Document>> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let lexical_hits = self.lexical.query(question, k);

        let query_vec = self.embedder.embed(question).await.map_err(|e| {
            DocChatError::Stage {
                stage: "retrieval".to_string(),
                reason: format!("query embedding failed: {}", e),
            }
        })?;
        let vector_hits = self.vector.query(&query_vec, k);

        let results = self.fuse(lexical_hits, vector_hits, k);
        debug!(question, results = results.len(), "hybrid query");
        Ok(results)
    }
}

/// Scale scores to `[0, 1]` against the list maximum
///
/// Scaling by the best hit keeps each hit's relative magnitude, so a
/// near-tie on one side cannot overrule a decisive margin on the other.
/// Min-max normalization would force the weakest hit to exactly zero,
/// which distorts rankings badly for two-candidate lists. Negative scores
/// (BM25 of a corpus-wide term, opposed embeddings) clamp to zero.
fn normalize(hits: &[(usize, f64)]) -> Vec<(usize, f64)> {
    let max = hits.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return hits.iter().map(|&(position, _)| (position, 0.0)).collect();
    }

    hits.iter()
        .map(|&(position, score)| (position, (score / max).clamp(0.0, 1.0)))
        .collect()
}
