use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Top-level configuration for the DocChat core
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocChatConfig {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Document splitting and ingestion limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap carried between consecutive chunks, in characters
    pub chunk_overlap: usize,
    /// Embedding batch size during ingestion
    pub batch_size: usize,
    /// Ceiling on the aggregate chunk count after deduplication
    pub max_chunks: usize,
    /// Total raw upload ceiling in bytes
    pub max_total_bytes: u64,
    /// Cache entry lifetime in seconds
    pub cache_expiry_secs: i64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 100,
            batch_size: 32,
            max_chunks: 2000,
            max_total_bytes: 20 * 1024 * 1024,
            cache_expiry_secs: 24 * 60 * 60,
        }
    }
}

/// Hybrid retrieval tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Results fetched per sub-index for a normal query
    pub top_k: usize,
    /// Results fetched per sub-index for the relevance check
    pub relevance_top_k: usize,
    /// Lexical contribution to the fused score
    pub lexical_weight: f64,
    /// Vector contribution to the fused score
    pub vector_weight: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            relevance_top_k: 20,
            lexical_weight: 0.4,
            vector_weight: 0.6,
        }
    }
}

/// Agent workflow policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum Research -> Verify cycles before terminating with the last draft
    pub max_research_cycles: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_research_cycles: 2,
        }
    }
}

impl DocChatConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = DocChatConfig::default();
            config.save()?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: DocChatConfig = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&config_path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".docchat").join("config.toml"))
    }
}
