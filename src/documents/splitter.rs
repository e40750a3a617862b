//! Overlapping-window text splitter
//!
//! Splits extracted documents into chunks of at most `chunk_size`
//! characters, where each chunk after the first starts `chunk_overlap`
//! characters before the previous chunk ended. Split points prefer
//! whitespace so words are not cut mid-token, and all indices are snapped
//! to UTF-8 char boundaries.

use crate::documents::types::{Document, DocumentMetadata};

/// Text splitter with configurable window and overlap
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter; overlap is clamped below the chunk size so every
    /// step makes forward progress
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let chunk_overlap = chunk_overlap.min(chunk_size.saturating_sub(1));
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split one document into overlapping chunks carrying its provenance
    ///
    /// Content that already fits in a single window is returned as one
    /// chunk. Un-splittable atomic content (a single run longer than the
    /// window with no break point) is hard-split at the window boundary.
    pub fn split(&self, document: &Document) -> Vec<Document> {
        let text = document.content.trim();
        if text.is_empty() {
            return Vec::new();
        }

        if text.len() <= self.chunk_size {
            return vec![self.make_chunk(text, &document.metadata)];
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < text.len() {
            let hard_end = snap_to_char_boundary(text, (start + self.chunk_size).min(text.len()));
            let end = if hard_end < text.len() {
                // Prefer breaking on whitespace inside the window
                text[start..hard_end]
                    .rfind(char::is_whitespace)
                    .map(|pos| start + pos + 1)
                    .filter(|&pos| pos > start)
                    .unwrap_or(hard_end)
            } else {
                hard_end
            };
            let end = snap_to_char_boundary(text, end);

            let piece = text[start..end].trim();
            if !piece.is_empty() {
                chunks.push(self.make_chunk(piece, &document.metadata));
            }

            if end >= text.len() {
                break;
            }

            // The overlap rewind must still move forward; snapping can land
            // the naive start back on a multibyte head, so fall through to
            // the next char boundary when it does
            let next = snap_to_char_boundary(text, end.saturating_sub(self.chunk_overlap));
            start = if next > start {
                next
            } else {
                next_char_boundary(text, start)
            };
        }

        chunks
    }

    /// Split a batch of documents, preserving discovery order
    pub fn split_all(&self, documents: &[Document]) -> Vec<Document> {
        documents.iter().flat_map(|d| self.split(d)).collect()
    }

    fn make_chunk(&self, text: &str, metadata: &DocumentMetadata) -> Document {
        Document::new(
            text,
            DocumentMetadata {
                source: metadata.source.clone(),
                page: metadata.page,
                embedding: None,
            },
        )
    }
}

/// Snap a byte index back to the nearest valid UTF-8 char boundary
fn snap_to_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest valid char boundary strictly after `index`
fn next_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i.min(s.len())
}
