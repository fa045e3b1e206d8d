// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Narrow contracts for the swappable pieces that sit behind the workers.
//!
//! None of these know about envelopes or traces; the workers adapt their
//! results and failures into protocol messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{LanguageModelError, ParseError, VectorStoreError};
use crate::protocol::SourceMetadata;

/// A span of document text plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub metadata: SourceMetadata,
}

/// Extracts plain text from a document on disk.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, path: &Path) -> Result<String, ParseError>;
}

/// Turns text into a fixed-width vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, VectorStoreError>;

    fn dimensions(&self) -> usize;
}

/// Chunking, embedding and similarity search over indexed documents.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Split, embed and insert `text`; returns the chunks that were added.
    async fn index(
        &self,
        text: &str,
        metadata: &SourceMetadata,
    ) -> Result<Vec<DocumentChunk>, VectorStoreError>;

    /// At most `k` chunks, most relevant first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>, VectorStoreError>;

    async fn len(&self) -> usize;
}

/// Produces an answer for a fully built prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LanguageModelError>;
}
