// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for configuration loading and validation.

use std::path::PathBuf;
use thiserror::Error;

use super::{LanguageModelError, VectorStoreError};

/// Errors that can occur while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML document could not be deserialized.
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The TOML document could not be deserialized.
    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension does not map to a supported format.
    #[error("Unsupported config format '{extension}': expected .yaml, .yml or .toml")]
    UnsupportedFormat { extension: String },

    /// The language model client could not be constructed.
    #[error("Failed to initialize language model client: {0}")]
    LanguageModel(#[from] LanguageModelError),

    /// The configured embedder could not be loaded.
    #[error("Failed to initialize embedder: {0}")]
    Embedder(#[from] VectorStoreError),

    /// One or more semantic checks failed.
    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Semantic problems found in an otherwise well-formed configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Chunks must hold at least one character.
    #[error("chunking.chunk_size must be greater than zero")]
    ZeroChunkSize,

    /// The overlap has to leave room for new text in every chunk.
    #[error("chunking.chunk_overlap ({overlap}) must be smaller than chunking.chunk_size ({size})")]
    OverlapTooLarge { overlap: usize, size: usize },

    /// Retrieval must ask for at least one chunk.
    #[error("retrieval.top_k must be greater than zero")]
    ZeroTopK,

    /// Embeddings need at least one dimension.
    #[error("embedding.dimensions must be greater than zero")]
    ZeroDimensions,

    /// A zero timeout would fail every model call.
    #[error("llm.timeout_seconds must be greater than zero")]
    ZeroTimeout,

    /// The provider's model emits a fixed vector width.
    #[error("embedding.dimensions must be {expected} for provider {provider}, got {actual}")]
    ProviderDimensions {
        provider: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The language model endpoint is required.
    #[error("llm.api_url must not be empty")]
    MissingApiUrl,
}
