//! Core document types and content fingerprinting

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Compute the SHA-256 content fingerprint of a byte slice
///
/// Fingerprints serve three roles: cache-key derivation for source files,
/// cross-file chunk deduplication, and deduplication across retrieval
/// result streams. Identical bytes always produce identical fingerprints,
/// regardless of which file they came from.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Provenance and retrieval metadata attached to a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DocumentMetadata {
    /// Source identifier (usually the originating file name)
    pub source: String,
    /// 1-based page number for paginated formats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Precomputed embedding, carried so index builds can skip re-embedding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// An immutable unit of ingested text
///
/// Both whole extracted pages and the overlapping chunks produced by the
/// splitter are `Document`s; chunks carry provenance metadata pointing at
/// their source. Identity for all set-membership purposes is the content
/// fingerprint, not the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Random id, unique per ingestion (not stable across reprocessing)
    pub id: String,
    /// Document text
    pub content: String,
    /// Provenance metadata
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a new document with a fresh id
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            metadata,
        }
    }

    /// Content fingerprint of this document's text
    pub fn fingerprint(&self) -> String {
        fingerprint(self.content.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint(b"The Eiffel Tower is 330m tall.");
        let b = fingerprint(b"The Eiffel Tower is 330m tall.");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_on_content() {
        assert_ne!(fingerprint(b"alpha"), fingerprint(b"beta"));
    }

    #[test]
    fn test_identical_content_same_fingerprint_across_sources() {
        let a = Document::new(
            "shared paragraph",
            DocumentMetadata {
                source: "a.txt".to_string(),
                ..Default::default()
            },
        );
        let b = Document::new(
            "shared paragraph",
            DocumentMetadata {
                source: "b.txt".to_string(),
                ..Default::default()
            },
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
