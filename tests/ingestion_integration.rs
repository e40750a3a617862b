//! Ingestion tests across processor instances and cache lifetimes
//!
//! Exercises the cache contract at the ingest boundary: a second ingest of
//! unchanged files must reuse the on-disk entries, expiry must force a
//! re-derive, and a rejected batch must leave the cache untouched.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use docchat::documents::cache::ChunkCache;
use docchat::documents::{DocumentProcessor, ProcessOptions};
use docchat::llm::Embedder;
use docchat::{DocChatError, Result};

struct CountingEmbedder {
    batches: AtomicUsize,
}

impl CountingEmbedder {
    fn new() -> Self {
        Self {
            batches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
    }
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn processor_with_expiry(dir: &TempDir, expiry_secs: i64) -> DocumentProcessor {
    let cache = ChunkCache::new(dir.path().join("cache"), expiry_secs).unwrap();
    DocumentProcessor::new(cache)
}

#[tokio::test]
async fn test_reingest_reuses_cache_across_processor_instances() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "report.md", "Quarterly revenue rose by 12 percent.");
    let embedder = CountingEmbedder::new();

    let first = processor_with_expiry(&dir, 3600)
        .process(&[file.clone()], Some(&embedder), &ProcessOptions::default())
        .await
        .unwrap();
    let batches_after_first = embedder.batches.load(Ordering::SeqCst);
    assert!(batches_after_first > 0);

    // A fresh processor over the same cache directory must hit disk, not
    // the embedding backend
    let second = processor_with_expiry(&dir, 3600)
        .process(&[file], Some(&embedder), &ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!(second, first);
    assert_eq!(
        embedder.batches.load(Ordering::SeqCst),
        batches_after_first,
        "cache hit must not re-embed"
    );
}

#[tokio::test]
async fn test_expired_cache_forces_rederive_with_fresh_ids() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "report.md", "Quarterly revenue rose by 12 percent.");

    // Zero-second expiry: the entry written by the first ingest is already
    // stale by the second
    let processor = processor_with_expiry(&dir, 0);
    let first = processor
        .process(&[file.clone()], None, &ProcessOptions::default())
        .await
        .unwrap();
    let second = processor
        .process(&[file], None, &ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!(second.len(), first.len());
    assert_eq!(second[0].content, first[0].content);
    assert_ne!(second[0].id, first[0].id, "re-derive must mint new ids");
}

#[tokio::test]
async fn test_oversized_batch_leaves_cache_empty() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.txt", &"x".repeat(600));
    let b = write_file(&dir, "b.txt", &"y".repeat(600));

    let processor = processor_with_expiry(&dir, 3600);
    let options = ProcessOptions {
        max_total_bytes: 1000,
        ..Default::default()
    };

    let result = processor.process(&[a, b], None, &options).await;
    assert!(matches!(result, Err(DocChatError::SizeLimitExceeded { .. })));

    let entries: Vec<_> = std::fs::read_dir(dir.path().join("cache")).unwrap().collect();
    assert!(entries.is_empty(), "rejected batch must not write cache entries");
}

#[tokio::test]
async fn test_dedup_spans_files_and_cache_hits() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.txt", "identical boilerplate paragraph");
    let b = write_file(&dir, "b.txt", "identical boilerplate paragraph");
    let c = write_file(&dir, "c.txt", "a genuinely distinct paragraph");

    let processor = processor_with_expiry(&dir, 3600);

    // First ingest dedups across files
    let chunks = processor
        .process(&[a.clone(), b.clone(), c.clone()], None, &ProcessOptions::default())
        .await
        .unwrap();
    assert_eq!(chunks.len(), 2);

    // Second ingest serves every file from cache yet still dedups
    let chunks = processor
        .process(&[a, b, c], None, &ProcessOptions::default())
        .await
        .unwrap();
    assert_eq!(chunks.len(), 2);
}

#[tokio::test]
async fn test_cache_backfills_embeddings_on_later_ingest() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "doc.txt", "content first ingested without vectors");
    let processor = processor_with_expiry(&dir, 3600);

    let plain = processor
        .process(&[file.clone()], None, &ProcessOptions::default())
        .await
        .unwrap();
    assert!(plain[0].metadata.embedding.is_none());

    // Re-ingest with an embedder: the cached entry gains vectors
    let embedder = CountingEmbedder::new();
    let embedded = processor
        .process(&[file.clone()], Some(&embedder), &ProcessOptions::default())
        .await
        .unwrap();
    assert!(embedded[0].metadata.embedding.is_some());
    assert!(embedder.batches.load(Ordering::SeqCst) > 0);

    // And a third ingest gets the backfilled entry without re-embedding
    let batches = embedder.batches.load(Ordering::SeqCst);
    let third = processor
        .process(&[file], Some(&embedder), &ProcessOptions::default())
        .await
        .unwrap();
    assert!(third[0].metadata.embedding.is_some());
    assert_eq!(embedder.batches.load(Ordering::SeqCst), batches);
}

#[tokio::test]
async fn test_chunking_overlap_carries_context_between_chunks() {
    let dir = TempDir::new().unwrap();
    let text: String = (0..200).map(|i| format!("word{} ", i)).collect();
    let file = write_file(&dir, "long.txt", &text);

    let processor = processor_with_expiry(&dir, 3600);
    let options = ProcessOptions {
        chunk_size: 120,
        chunk_overlap: 30,
        ..Default::default()
    };
    let chunks = processor.process(&[file], None, &options).await.unwrap();

    assert!(chunks.len() > 1);
    for window in chunks.windows(2) {
        let first_word = window[1]
            .content
            .split_whitespace()
            .next()
            .unwrap();
        assert!(
            window[0].content.contains(first_word),
            "start of each chunk must overlap the previous one"
        );
    }
}
