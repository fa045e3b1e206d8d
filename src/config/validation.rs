// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Semantic checks on a parsed [`Config`].
//!
//! Every check runs; failures are collected rather than stopping at the
//! first one so a user can fix a file in one pass.
//!
//! # Examples
//!
//! ```rust
//! use the_ragwood::config::{validate_config, Config};
//! use the_ragwood::errors::ValidationError;
//!
//! let mut config = Config::default();
//! config.retrieval.top_k = 0;
//!
//! assert_eq!(validate_config(&config), Err(vec![ValidationError::ZeroTopK]));
//! ```

use crate::backends::local::minilm::MINILM_DIMENSIONS;
use crate::config::{Config, EmbeddingProvider};
use crate::errors::ValidationError;
use crate::observability::messages::validation::ConfigValueRejected;
use crate::observability::messages::StructuredLog;

pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let chunking = &config.chunking;
    if chunking.chunk_size == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    } else if chunking.chunk_overlap >= chunking.chunk_size {
        errors.push(ValidationError::OverlapTooLarge {
            overlap: chunking.chunk_overlap,
            size: chunking.chunk_size,
        });
    }

    let embedding = &config.embedding;
    if embedding.dimensions == 0 {
        errors.push(ValidationError::ZeroDimensions);
    } else if embedding.provider == EmbeddingProvider::AllMiniLmL6V2
        && embedding.dimensions != MINILM_DIMENSIONS
    {
        errors.push(ValidationError::ProviderDimensions {
            provider: embedding.provider.as_str(),
            expected: MINILM_DIMENSIONS,
            actual: embedding.dimensions,
        });
    }

    if config.retrieval.top_k == 0 {
        errors.push(ValidationError::ZeroTopK);
    }

    if config.llm.timeout_seconds == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.llm.api_url.trim().is_empty() {
        errors.push(ValidationError::MissingApiUrl);
    }

    for error in &errors {
        ConfigValueRejected { error }.log();
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
