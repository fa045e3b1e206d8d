// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;

use super::{COORDINATOR, RESPONDER, RETRIEVER};
use crate::bus::{BusHandle, DispatchBus};
use crate::errors::WorkerError;
use crate::observability::messages::worker::{
    ChunksIndexed, ChunksRetrieved, CollaboratorFailed, EnvelopeReceived, MissingPayloadField,
    UnrecognizedMessage,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{Envelope, IngestionPayload, Message, QueryPayload, RetrievalPayload};
use crate::traits::{VectorStore, Worker};

/// Owns the vector store: indexes ingested text and answers similarity searches.
pub struct Retriever {
    bus: BusHandle,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(bus: BusHandle, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self { bus, store, top_k }
    }

    pub async fn start(
        bus: &Arc<DispatchBus>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Arc<Self> {
        let retriever = Arc::new(Self::new(bus.handle(), store, top_k));
        bus.register_worker(retriever.clone()).await;
        retriever
    }

    /// Indexing success is silent; only failures produce a message.
    async fn index(&self, envelope: &Envelope, payload: &IngestionPayload) {
        if payload.raw_text.is_empty() {
            self.missing(envelope, "raw_text");
            return;
        }

        let file_name = match payload.source_metadata.file_name.as_str() {
            "" => "unknown",
            name => name,
        };

        match self.store.index(&payload.raw_text, &payload.source_metadata).await {
            Ok(added) => ChunksIndexed {
                file_name,
                chunk_count: added.len(),
                index_size: self.store.len().await,
            }
            .log(),
            Err(e) => {
                CollaboratorFailed {
                    worker: RETRIEVER,
                    operation: "index",
                    correlation_id: envelope.correlation_id(),
                    error: &e,
                }
                .log();

                let context = format!("Failed to add document '{}' to vector store.", file_name);
                self.bus
                    .send(envelope.reply(RETRIEVER, COORDINATOR, Message::error(e.to_string(), context)))
                    .await;
            }
        }
    }

    async fn retrieve(&self, envelope: &Envelope, payload: &QueryPayload) {
        if payload.query.is_empty() {
            self.missing(envelope, "query");
            return;
        }

        match self.store.search(&payload.query, self.top_k).await {
            Ok(chunks) => {
                ChunksRetrieved {
                    query: &payload.query,
                    requested: self.top_k,
                    returned: chunks.len(),
                }
                .log();

                let (retrieved_context, source_metadata) = chunks
                    .into_iter()
                    .map(|chunk| (chunk.text, chunk.metadata))
                    .unzip();
                let message = Message::RetrievalResult(RetrievalPayload {
                    query: payload.query.clone(),
                    retrieved_context,
                    source_metadata,
                });
                self.bus.send(envelope.reply(RETRIEVER, RESPONDER, message)).await;
            }
            Err(e) => {
                CollaboratorFailed {
                    worker: RETRIEVER,
                    operation: "search",
                    correlation_id: envelope.correlation_id(),
                    error: &e,
                }
                .log();

                let context = format!("Failed to retrieve information for query: '{}'", payload.query);
                self.bus
                    .send(envelope.reply(RETRIEVER, COORDINATOR, Message::error(e.to_string(), context)))
                    .await;
            }
        }
    }

    fn missing(&self, envelope: &Envelope, field: &str) {
        MissingPayloadField {
            worker: RETRIEVER,
            message_type: envelope.message_type().as_str(),
            field,
            correlation_id: envelope.correlation_id(),
        }
        .log();
    }
}

#[async_trait]
impl Worker for Retriever {
    async fn handle(&self, envelope: Envelope) -> Result<(), WorkerError> {
        EnvelopeReceived {
            worker: RETRIEVER,
            sender: envelope.sender(),
            message_type: envelope.message_type().as_str(),
            correlation_id: envelope.correlation_id(),
        }
        .log();

        match envelope.message() {
            Message::IngestionComplete(payload) => self.index(&envelope, payload).await,
            Message::QueryRequest(payload) => self.retrieve(&envelope, payload).await,
            _ => UnrecognizedMessage {
                worker: RETRIEVER,
                message_type: envelope.message_type().as_str(),
                correlation_id: envelope.correlation_id(),
            }
            .log(),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        RETRIEVER
    }
}
