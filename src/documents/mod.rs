//! Document Store: extraction, splitting, caching, and deduplication
//!
//! Turns uploaded files into a deduplicated set of overlapping text chunks,
//! with an on-disk cache keyed by file content fingerprint.

pub mod cache;
pub mod extract;
pub mod processor;
pub mod splitter;
pub mod types;

pub use cache::{CacheEntry, ChunkCache};
pub use processor::{DocumentProcessor, ProcessOptions};
pub use splitter::TextSplitter;
pub use types::{fingerprint, Document, DocumentMetadata};
