//! On-disk chunk cache keyed by file content fingerprint
//!
//! One JSON file per cache entry, holding the fingerprint, a creation
//! timestamp, and the chunk payload. Entries are valid while
//! `now - timestamp < expiry`; expired entries are re-derived on the next
//! lookup. Writes go through a temp file and an atomic rename so a
//! concurrent rebuild of the same fingerprint is wasteful but never
//! corrupting.

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::documents::types::Document;
use crate::errors::{DocChatError, Result};

/// A persisted chunk set for one source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Content fingerprint of the source file
    pub fingerprint: String,
    /// Unix timestamp of creation
    pub timestamp: i64,
    /// The chunks derived from the file
    pub chunks: Vec<Document>,
}

/// Disk-backed chunk cache with time-based expiry
pub struct ChunkCache {
    cache_dir: PathBuf,
    expiry_secs: i64,
}

impl ChunkCache {
    /// Open (creating if needed) a cache rooted at `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>, expiry_secs: i64) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)
            .context("Failed to create cache directory")?;
        Ok(Self {
            cache_dir,
            expiry_secs,
        })
    }

    /// Load the chunk set for a fingerprint if a valid entry exists
    ///
    /// Returns `None` on a miss, an expired entry, or an unreadable entry
    /// (unreadable entries are treated as misses so ingestion re-derives
    /// them instead of failing).
    pub fn load(&self, fingerprint: &str) -> Option<Vec<Document>> {
        let path = self.entry_path(fingerprint);
        if !path.exists() {
            return None;
        }

        let entry = match self.read_entry(&path) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(fingerprint, error = %e, "unreadable cache entry, treating as miss");
                return None;
            }
        };

        if self.is_expired(&entry) {
            debug!(fingerprint, "cache entry expired");
            return None;
        }

        debug!(fingerprint, chunks = entry.chunks.len(), "cache hit");
        Some(entry.chunks)
    }

    /// Persist a chunk set under a fingerprint with a fresh timestamp
    ///
    /// Write-to-temp-then-rename keeps the entry file atomic with respect
    /// to concurrent readers.
    pub fn store(&self, fingerprint: &str, chunks: &[Document]) -> Result<()> {
        let entry = CacheEntry {
            fingerprint: fingerprint.to_string(),
            timestamp: Utc::now().timestamp(),
            chunks: chunks.to_vec(),
        };

        let json = serde_json::to_string(&entry)
            .context("Failed to serialize cache entry")?;

        let final_path = self.entry_path(fingerprint);
        let tmp_path = self.cache_dir.join(format!(".{}.tmp", fingerprint));

        fs::write(&tmp_path, json)
            .context("Failed to write cache temp file")?;
        fs::rename(&tmp_path, &final_path)
            .context("Failed to move cache entry into place")?;

        Ok(())
    }

    /// Remove an entry if present
    pub fn invalidate(&self, fingerprint: &str) -> Result<()> {
        let path = self.entry_path(fingerprint);
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove cache entry")?;
        }
        Ok(())
    }

    /// Timestamp of the entry for a fingerprint, if one exists on disk
    pub fn entry_timestamp(&self, fingerprint: &str) -> Option<i64> {
        let path = self.entry_path(fingerprint);
        self.read_entry(&path).ok().map(|e| e.timestamp)
    }

    fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", fingerprint))
    }

    fn read_entry(&self, path: &Path) -> Result<CacheEntry> {
        let json = fs::read_to_string(path)
            .map_err(|e| DocChatError::Cache(e.to_string()))?;
        let entry: CacheEntry =
            serde_json::from_str(&json).map_err(|e| DocChatError::Cache(e.to_string()))?;
        Ok(entry)
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        Utc::now().timestamp() - entry.timestamp >= self.expiry_secs
    }
}
