// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::backends::gemini::GeminiClient;
use crate::backends::local::{
    FileDocumentParser, HashingEmbedder, InMemoryVectorStore, MiniLmEmbedder, TextSplitter,
};
use crate::bus::DispatchBus;
use crate::config::{Config, EmbeddingConfig, EmbeddingProvider};
use crate::errors::{ConfigError, VectorStoreError};
use crate::protocol::{CorrelationId, Envelope, Message, QueryPayload, UploadPayload};
use crate::traits::{CallerBoundary, DocumentParser, Embedder, LanguageModel, VectorStore};
use crate::workers::{
    Coordinator, Ingestor, Responder, Retriever, TraceStore, CALLER, COORDINATOR,
};

/// Pipeline runtime builder - wires the bus, collaborators and workers from configuration.
///
/// Collaborators default to the local backends plus [`GeminiClient`]; any of
/// them can be swapped before [`build`](Self::build).
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use the_ragwood::boundary::ChannelBoundary;
/// use the_ragwood::config::{Config, RuntimeBuilder};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let (boundary, mut notifications) = ChannelBoundary::new();
/// let runtime = RuntimeBuilder::from_config(&Config::default())
///     .build(Arc::new(boundary))
///     .await?;
///
/// runtime.submit_query("What is the refund policy?").await;
/// while let Ok(note) = notifications.try_recv() {
///     println!("{:?}", note);
/// }
/// # Ok(())
/// # }
/// ```
pub struct RuntimeBuilder {
    config: Config,
    parser: Option<Arc<dyn DocumentParser>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    model: Option<Arc<dyn LanguageModel>>,
}

impl RuntimeBuilder {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            config: cfg.clone(),
            parser: None,
            vector_store: None,
            model: None,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    pub fn with_language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Register all four workers, then release anything queued for them.
    pub async fn build(self, boundary: Arc<dyn CallerBoundary>) -> Result<Runtime, ConfigError> {
        let cfg = self.config;

        let parser: Arc<dyn DocumentParser> = match self.parser {
            Some(parser) => parser,
            None => Arc::new(FileDocumentParser::new()),
        };
        let vector_store: Arc<dyn VectorStore> = match self.vector_store {
            Some(store) => store,
            None => Arc::new(InMemoryVectorStore::new(
                TextSplitter::new(cfg.chunking.chunk_size, cfg.chunking.chunk_overlap),
                embedder_for(&cfg.embedding).await?,
            )),
        };
        let model: Arc<dyn LanguageModel> = match self.model {
            Some(model) => model,
            None => Arc::new(GeminiClient::from_config(&cfg.llm)?),
        };

        let bus = DispatchBus::new();
        let traces = Arc::new(TraceStore::new());

        Coordinator::start(&bus, traces.clone(), boundary).await;
        Ingestor::start(&bus, parser).await;
        Retriever::start(&bus, vector_store.clone(), cfg.retrieval.top_k).await;
        Responder::start(
            &bus,
            model,
            Duration::from_secs(cfg.llm.timeout_seconds),
        )
        .await;

        bus.flush_pending().await;
        bus.run_until_idle().await;

        Ok(Runtime {
            bus,
            traces,
            vector_store,
        })
    }
}

/// The embedder `embedding.provider` names. Loading a model blocks, so it
/// runs on the blocking pool.
async fn embedder_for(cfg: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, ConfigError> {
    match cfg.provider {
        EmbeddingProvider::Hashing => Ok(Arc::new(HashingEmbedder::new(cfg.dimensions))),
        EmbeddingProvider::AllMiniLmL6V2 => {
            let cache_dir = cfg.cache_dir.clone();
            let embedder = tokio::task::spawn_blocking(move || MiniLmEmbedder::load(cache_dir))
                .await
                .map_err(|e| {
                    ConfigError::Embedder(VectorStoreError::Embedding(format!(
                        "model loader aborted: {}",
                        e
                    )))
                })??;
            Ok(Arc::new(embedder))
        }
    }
}

/// A wired pipeline.
///
/// Submissions drive the bus until it is idle. When no other task is
/// draining the same bus, every notification for the request has been
/// emitted by the time they return; otherwise the active drain delivers
/// them and they may arrive after the submit call completes.
pub struct Runtime {
    bus: Arc<DispatchBus>,
    traces: Arc<TraceStore>,
    vector_store: Arc<dyn VectorStore>,
}

impl Runtime {
    pub fn bus(&self) -> &Arc<DispatchBus> {
        &self.bus
    }

    pub fn traces(&self) -> &Arc<TraceStore> {
        &self.traces
    }

    pub async fn indexed_chunks(&self) -> usize {
        self.vector_store.len().await
    }

    /// Submit a document upload. Returns the request id echoed in notifications.
    pub async fn submit_upload(&self, path: &Path) -> CorrelationId {
        self.submit(Message::UiUploadRequest(upload_payload(path)))
            .await
    }

    /// Submit a question. Returns the request id echoed in notifications.
    pub async fn submit_query(&self, query: &str) -> CorrelationId {
        self.submit(Message::UiQueryRequest(QueryPayload {
            query: query.to_string(),
        }))
        .await
    }

    /// Drop upload traces still marked `uploading`. Once the bus is idle
    /// those uploads have indexed successfully. Returns how many were removed.
    pub async fn prune_uploads(&self) -> usize {
        self.traces.prune_uploads(Duration::ZERO).await.len()
    }

    async fn submit(&self, message: Message) -> CorrelationId {
        let envelope = Envelope::new(CALLER, COORDINATOR, message);
        let request_id = envelope.correlation_id();
        self.bus.dispatch(envelope).await;
        request_id
    }
}

/// Describe a file on disk the way the caller boundary does.
pub fn upload_payload(path: &Path) -> UploadPayload {
    UploadPayload {
        file_path: path.display().to_string(),
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_type: path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default(),
    }
}
