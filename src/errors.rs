//! Error types for the DocChat core
//!
//! Splits failures along the boundaries the pipeline cares about:
//! ingestion problems that skip a file, ingestion problems that abort a
//! batch, index-build failures, and agent-stage failures.

use thiserror::Error;

/// Main error type for the DocChat pipeline
#[derive(Error, Debug)]
pub enum DocChatError {
    /// A single file could not be ingested (callers log and skip)
    #[error("Ingestion failed for {file}: {reason}")]
    Ingestion { file: String, reason: String },

    /// Total upload size exceeded the configured ceiling (fatal for the batch)
    #[error("Total upload size {total_bytes} bytes exceeds limit of {max_bytes} bytes")]
    SizeLimitExceeded { total_bytes: u64, max_bytes: u64 },

    /// A file extension with no extraction strategy
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Either sub-index failed to build; the whole rebuild is abandoned
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// A relevance/drafting/verification backend call failed
    #[error("Pipeline stage '{stage}' failed: {reason}")]
    Stage { stage: String, reason: String },

    /// State machine transition errors
    #[error("Invalid workflow transition from {from:?} to {to:?}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Cache entry could not be read or written
    #[error("Cache error: {0}")]
    Cache(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, DocChatError>;

/// Convert anyhow errors to DocChatError
impl From<anyhow::Error> for DocChatError {
    fn from(err: anyhow::Error) -> Self {
        DocChatError::Generic(err.to_string())
    }
}
