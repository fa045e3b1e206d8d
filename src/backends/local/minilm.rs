// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::errors::VectorStoreError;
use crate::traits::Embedder;

/// Output width of `all-MiniLM-L6-v2`.
pub const MINILM_DIMENSIONS: usize = 384;

/// Sentence embeddings from the `all-MiniLM-L6-v2` ONNX model.
///
/// Loading fetches the model into `cache_dir` on first use, so
/// [`load`](Self::load) blocks and should run off the async workers.
pub struct MiniLmEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl MiniLmEmbedder {
    pub fn load(cache_dir: Option<PathBuf>) -> Result<Self, VectorStoreError> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| VectorStoreError::Embedding(format!("loading all-MiniLM-L6-v2: {}", e)))?;
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

impl std::fmt::Debug for MiniLmEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniLmEmbedder")
            .field("dimensions", &MINILM_DIMENSIONS)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Embedder for MiniLmEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, VectorStoreError> {
        let model = Arc::clone(&self.model);
        let text = text.to_string();

        let mut vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| VectorStoreError::Embedding("embedding model lock poisoned".to_string()))?;
            model
                .embed(vec![text], None)
                .map_err(|e| VectorStoreError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| VectorStoreError::Embedding(format!("embedding task aborted: {}", e)))??;

        vectors
            .pop()
            .ok_or_else(|| VectorStoreError::Embedding("model returned no vector".to_string()))
    }

    fn dimensions(&self) -> usize {
        MINILM_DIMENSIONS
    }
}
