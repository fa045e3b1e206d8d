// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    API_KEY_ENV, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_LLM_API_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT_SECONDS, DEFAULT_LLM_TOP_K,
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_K, DEFAULT_TOP_P,
};
use crate::config::validate_config;
use crate::errors::ConfigError;
use crate::observability::messages::validation::{ApiKeyMissing, ConfigLoaded};
use crate::observability::messages::StructuredLog;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the pipeline.
///
/// Every section is optional; anything left out takes the value from
/// [`consts`](crate::config::consts).
///
/// # Example
/// ```yaml
/// chunking:
///   chunk_size: 1000
///   chunk_overlap: 200
/// embedding:
///   provider: all-minilm-l6-v2
///   dimensions: 384
/// retrieval:
///   top_k: 4
/// llm:
///   model: gemini-2.0-flash
///   api_url: https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent
///   timeout_seconds: 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

/// How documents are cut before embedding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Which embedder turns chunks and queries into vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingProvider {
    /// Feature-hashed bag of words; offline and deterministic.
    #[default]
    Hashing,
    /// `all-MiniLM-L6-v2` sentence embeddings (fixed at 384 dimensions).
    #[serde(rename = "all-minilm-l6-v2")]
    AllMiniLmL6V2,
}

impl EmbeddingProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            EmbeddingProvider::Hashing => "hashing",
            EmbeddingProvider::AllMiniLmL6V2 => "all-minilm-l6-v2",
        }
    }
}

/// # Fields
/// * `provider` - `hashing` (default) or `all-minilm-l6-v2`
/// * `dimensions` - Vector width; must be 384 for `all-minilm-l6-v2`
/// * `cache_dir` - Where downloaded model files live; fastembed's default when unset
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub dimensions: usize,
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

/// Language model endpoint and generation settings.
///
/// # Fields
/// * `model` - Model name, informational only; the URL selects the model
/// * `api_url` - Full `generateContent` endpoint
/// * `api_key` - Left empty in files; filled from `GEMINI_API_KEY`
/// * `timeout_seconds` - Per-call limit enforced by the responder
/// * `temperature`, `top_p`, `top_k`, `max_output_tokens` - Sent as `generationConfig`
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            api_url: DEFAULT_LLM_API_URL.to_string(),
            api_key: String::new(),
            timeout_seconds: DEFAULT_LLM_TIMEOUT_SECONDS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_LLM_TOP_K,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("timeout_seconds", &self.timeout_seconds)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl Config {
    /// Fill an empty `llm.api_key` from `lookup(API_KEY_ENV)`.
    pub fn apply_api_key_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.llm.api_key.trim().is_empty() {
            if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
                self.llm.api_key = key;
            }
        }
    }
}

/// Load a config from a YAML or TOML file, picked by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (mut cfg, format): (Config, &str) = match extension.as_str() {
        "yaml" | "yml" => (serde_yaml::from_str(&content)?, "YAML"),
        "toml" => (toml::from_str(&content)?, "TOML"),
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                extension: extension.clone(),
            })
        }
    };
    cfg.apply_api_key_from(|name| std::env::var(name).ok());

    ConfigLoaded {
        path: &path.display().to_string(),
        format,
    }
    .log();

    Ok(cfg)
}

/// Load a config and run every semantic check on it.
///
/// All validation failures are reported together in [`ConfigError::Invalid`].
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg).map_err(ConfigError::Invalid)?;

    if cfg.llm.api_key.trim().is_empty() {
        ApiKeyMissing {
            env_var: API_KEY_ENV,
        }
        .log();
    }

    Ok(cfg)
}
