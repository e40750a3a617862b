//! HTTP client for a local Ollama server
//!
//! Implements both capability traits: text generation via `/api/generate`
//! and embeddings via `/api/embeddings`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::errors::{DocChatError, Result};
use crate::llm::{Embedder, LanguageModel};

/// Connection settings for the Ollama backend
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API
    pub base_url: String,
    /// Model used for generation calls
    pub generation_model: String,
    /// Model used for embedding calls
    pub embedding_model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            generation_model: "qwen2.5:7b-instruct".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Ollama-backed language model and embedder
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(OllamaConfig::default())
    }

    /// Create a client with custom settings
    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DocChatError::Http)?;

        Ok(Self { client, config })
    }

    /// Current configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "model": self.config.generation_model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DocChatError::Generic(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let mut vectors = Vec::with_capacity(texts.len());

        for text in texts {
            let response = self
                .client
                .post(&url)
                .json(&json!({
                    "model": self.config.embedding_model,
                    "prompt": text,
                }))
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(DocChatError::Generic(format!(
                    "Ollama embeddings API error: {}",
                    response.status()
                )));
            }

            let body: EmbeddingResponse = response.json().await?;
            vectors.push(body.embedding);
        }

        Ok(vectors)
    }
}
