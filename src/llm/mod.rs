//! Capability traits for language-model and embedding backends
//!
//! The core depends only on these signatures; any backend that can turn a
//! prompt into text and text into vectors can drive the pipeline. The
//! bundled [`OllamaClient`] implements both against a local Ollama server.

pub mod ollama;

pub use ollama::{OllamaClient, OllamaConfig};

use async_trait::async_trait;

use crate::errors::Result;

/// A prompt-to-text generation capability
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a prompt, returning the model's text output
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// A text-to-vector embedding capability
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::errors::DocChatError::Generic(
                "embedding backend returned no vector".to_string(),
            ))
    }
}
