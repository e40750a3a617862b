//! Hybrid retrieval engine
//!
//! Two sub-indices over the same chunk set (BM25 lexical, cosine vector)
//! fused into one deduplicated ranked result list behind the [`Retriever`]
//! trait.

pub mod hybrid;
pub mod lexical;
pub mod vector;

pub use hybrid::{FusionConfig, HybridIndex, Retriever};
pub use lexical::LexicalIndex;
pub use vector::VectorIndex;
