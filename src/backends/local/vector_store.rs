// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TextSplitter;
use crate::errors::VectorStoreError;
use crate::protocol::SourceMetadata;
use crate::traits::{DocumentChunk, Embedder, VectorStore};

struct IndexedChunk {
    embedding: Vec<f32>,
    chunk: DocumentChunk,
}

/// Process-local similarity index. Nothing is persisted.
pub struct InMemoryVectorStore {
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<IndexedChunk>>,
}

impl InMemoryVectorStore {
    pub fn new(splitter: TextSplitter, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            splitter,
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    async fn embed_checked(&self, text: &str) -> Result<Vec<f32>, VectorStoreError> {
        let embedding = self.embedder.embed(text).await?;
        let expected = self.embedder.dimensions();
        if embedding.len() != expected {
            return Err(VectorStoreError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }
        Ok(embedding)
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore")
            .field("splitter", &self.splitter)
            .field("dimensions", &self.embedder.dimensions())
            .finish_non_exhaustive()
    }
}

/// Both vectors are expected to share a length; zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn index(
        &self,
        text: &str,
        metadata: &SourceMetadata,
    ) -> Result<Vec<DocumentChunk>, VectorStoreError> {
        let mut prepared = Vec::new();
        for (start_index, text) in self.splitter.split_with_offsets(text) {
            let embedding = self.embed_checked(&text).await?;
            let chunk = DocumentChunk {
                text,
                metadata: SourceMetadata {
                    start_index,
                    ..metadata.clone()
                },
            };
            prepared.push(IndexedChunk { embedding, chunk });
        }

        let added: Vec<DocumentChunk> = prepared.iter().map(|entry| entry.chunk.clone()).collect();
        self.entries.write().await.extend(prepared);
        Ok(added)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>, VectorStoreError> {
        if k == 0 || self.entries.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed_checked(query).await?;
        let entries = self.entries.read().await;

        let mut scored: Vec<(f32, &IndexedChunk)> = entries
            .iter()
            .map(|entry| (cosine_similarity(&query_embedding, &entry.embedding), entry))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| entry.chunk.clone())
            .collect())
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
