//! DocChat Core - Verified Document Question-Answering
//!
//! Answers natural-language questions against a small corpus of uploaded
//! documents. Two cooperating halves:
//!
//! - **Hybrid retrieval**: documents are split into overlapping chunks,
//!   deduplicated and cached by content fingerprint, then indexed both
//!   lexically (BM25) and by embedding similarity; queries fuse the two
//!   rankings into one deduplicated result list.
//! - **Agent pipeline**: a bounded state machine gates the question on
//!   retrieved evidence, drafts an answer strictly from that evidence,
//!   and verifies the draft's claims before returning it.
//!
//! LLM and embedding backends are pluggable capabilities behind the
//! [`llm::LanguageModel`] and [`llm::Embedder`] traits; an Ollama-backed
//! implementation is included. The UI/session layer is an external
//! collaborator that calls [`documents::DocumentProcessor::process`] and
//! [`agents::AgentWorkflow::full_pipeline`] and renders the results.

pub mod agents;
pub mod config;
pub mod documents;
pub mod errors;
pub mod index;
pub mod llm;

// Re-export commonly used types
pub use agents::{AgentWorkflow, PipelineOutcome, NOT_RELEVANT_MESSAGE};
pub use config::DocChatConfig;
pub use documents::{Document, DocumentProcessor, ProcessOptions};
pub use errors::{DocChatError, Result};
pub use index::{HybridIndex, Retriever};
