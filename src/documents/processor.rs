//! Document ingestion pipeline
//!
//! `process` is the Document Store entry point: it validates the total
//! upload size, then per file loads chunks from cache or derives them
//! (extract, split, embed, persist), and finally deduplicates chunks by
//! content fingerprint across the whole batch.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ChunkingConfig;
use crate::documents::cache::ChunkCache;
use crate::documents::extract;
use crate::documents::splitter::TextSplitter;
use crate::documents::types::{fingerprint, Document};
use crate::errors::{DocChatError, Result};
use crate::llm::Embedder;

/// Ingestion parameters for one `process` call
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks
    pub chunk_overlap: usize,
    /// Embedding batch size
    pub batch_size: usize,
    /// Ceiling on the deduplicated output chunk count
    pub max_chunks: usize,
    /// Ceiling on the summed raw input size in bytes
    pub max_total_bytes: u64,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self::from(&ChunkingConfig::default())
    }
}

impl From<&ChunkingConfig> for ProcessOptions {
    fn from(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            batch_size: config.batch_size,
            max_chunks: config.max_chunks,
            max_total_bytes: config.max_total_bytes,
        }
    }
}

/// Ingests files into deduplicated, cacheable chunk sets
pub struct DocumentProcessor {
    cache: ChunkCache,
}

impl DocumentProcessor {
    /// Create a processor over an opened chunk cache
    pub fn new(cache: ChunkCache) -> Self {
        Self { cache }
    }

    /// Process a batch of files into a deduplicated chunk sequence
    ///
    /// The total-size ceiling is enforced before any file is touched; a
    /// batch over the limit fails with no partial cache writes. Per-file
    /// failures after that point are logged and skipped so one bad file
    /// never aborts the rest. When an embedder is supplied, chunks are
    /// embedded in batches and the vectors travel in chunk metadata.
    pub async fn process(
        &self,
        files: &[PathBuf],
        embedder: Option<&dyn Embedder>,
        options: &ProcessOptions,
    ) -> Result<Vec<Document>> {
        self.validate_total_size(files, options.max_total_bytes)?;

        let splitter = TextSplitter::new(options.chunk_size, options.chunk_overlap);
        let mut all_chunks: Vec<Document> = Vec::new();

        for path in files {
            match self.process_file(path, embedder, &splitter, options).await {
                Ok(chunks) => {
                    info!(file = %path.display(), chunks = chunks.len(), "processed file");
                    all_chunks.extend(chunks);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping file");
                }
            }
        }

        let mut deduped = dedup_by_fingerprint(all_chunks);

        if deduped.len() > options.max_chunks {
            warn!(
                total = deduped.len(),
                kept = options.max_chunks,
                "chunk ceiling reached, truncating in discovery order (lossy)"
            );
            deduped.truncate(options.max_chunks);
        }

        Ok(deduped)
    }

    /// Fail fast when the summed raw input exceeds the configured ceiling
    ///
    /// A file whose size cannot be read is warned about here and counted as
    /// zero; the per-file read in `process_file` reports and skips it.
    fn validate_total_size(&self, files: &[PathBuf], max_bytes: u64) -> Result<()> {
        let mut total: u64 = 0;
        for path in files {
            match fs::metadata(path) {
                Ok(meta) => total += meta.len(),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "size unknown, not counted toward limit");
                }
            }
        }

        if total > max_bytes {
            return Err(DocChatError::SizeLimitExceeded {
                total_bytes: total,
                max_bytes,
            });
        }
        Ok(())
    }

    async fn process_file(
        &self,
        path: &Path,
        embedder: Option<&dyn Embedder>,
        splitter: &TextSplitter,
        options: &ProcessOptions,
    ) -> Result<Vec<Document>> {
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if !extract::is_supported(path) {
            return Err(DocChatError::UnsupportedFileType(source));
        }

        let bytes = fs::read(path).map_err(|e| DocChatError::Ingestion {
            file: source.clone(),
            reason: e.to_string(),
        })?;
        let file_fingerprint = fingerprint(&bytes);

        if let Some(cached) = self.cache.load(&file_fingerprint) {
            // Entries written without an embedder lack vectors; backfill
            // and refresh the entry so the next hit is complete
            if embedder.is_some() && cached.iter().any(|c| c.metadata.embedding.is_none()) {
                let embedded = embed_chunks(cached, embedder, options.batch_size).await?;
                self.cache.store(&file_fingerprint, &embedded)?;
                return Ok(embedded);
            }
            return Ok(cached);
        }

        let pages = extract::extract(&source, &bytes, path)?;
        let chunks = splitter.split_all(&pages);
        let chunks = embed_chunks(chunks, embedder, options.batch_size).await?;

        self.cache.store(&file_fingerprint, &chunks)?;
        Ok(chunks)
    }
}

/// Attach embeddings to chunks in `batch_size` groups
async fn embed_chunks(
    mut chunks: Vec<Document>,
    embedder: Option<&dyn Embedder>,
    batch_size: usize,
) -> Result<Vec<Document>> {
    let Some(embedder) = embedder else {
        return Ok(chunks);
    };
    let batch_size = batch_size.max(1);

    let pending: Vec<usize> = chunks
        .iter()
        .enumerate()
        .filter(|(_, c)| c.metadata.embedding.is_none())
        .map(|(i, _)| i)
        .collect();

    for batch in pending.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|&i| chunks[i].content.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        if vectors.len() != batch.len() {
            return Err(DocChatError::Generic(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            )));
        }

        for (&i, vector) in batch.iter().zip(vectors) {
            chunks[i].metadata.embedding = Some(vector);
        }
    }

    Ok(chunks)
}

/// Keep the first occurrence of each content fingerprint, in order
fn dedup_by_fingerprint(chunks: Vec<Document>) -> Vec<Document> {
    let mut seen: HashSet<String> = HashSet::new();
    chunks
        .into_iter()
        .filter(|c| seen.insert(c.fingerprint()))
        .collect()
}
