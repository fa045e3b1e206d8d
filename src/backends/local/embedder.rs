// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::config::consts::DEFAULT_EMBEDDING_DIMENSIONS;
use crate::errors::VectorStoreError;
use crate::traits::Embedder;

/// Deterministic bag-of-words embedding via feature hashing.
///
/// Each lower-cased alphanumeric token is hashed (FNV-1a) into one of
/// `dimensions` buckets; the count vector is L2-normalized. Text with no
/// tokens embeds to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSIONS)
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(&self, token: &str) -> usize {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        let hash = token
            .bytes()
            .fold(OFFSET, |acc, b| (acc ^ u64::from(b)).wrapping_mul(PRIME));
        (hash % self.dimensions as u64) as usize
    }
}

pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, VectorStoreError> {
        if self.dimensions == 0 {
            return Err(VectorStoreError::Embedding(
                "embedder configured with zero dimensions".to_string(),
            ));
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            vector[self.bucket(&token)] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
