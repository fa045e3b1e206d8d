// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::{COORDINATOR, INGESTOR, RETRIEVER};
use crate::bus::{BusHandle, DispatchBus};
use crate::errors::WorkerError;
use crate::observability::messages::worker::{
    CollaboratorFailed, DocumentParsed, EnvelopeReceived, MissingPayloadField,
    UnrecognizedMessage,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{Envelope, IngestionPayload, Message, SourceMetadata, UploadPayload};
use crate::traits::{DocumentParser, Worker};

/// Turns an upload request into document text for the retriever.
pub struct Ingestor {
    bus: BusHandle,
    parser: Arc<dyn DocumentParser>,
}

impl Ingestor {
    pub fn new(bus: BusHandle, parser: Arc<dyn DocumentParser>) -> Self {
        Self { bus, parser }
    }

    pub async fn start(bus: &Arc<DispatchBus>, parser: Arc<dyn DocumentParser>) -> Arc<Self> {
        let ingestor = Arc::new(Self::new(bus.handle(), parser));
        bus.register_worker(ingestor.clone()).await;
        ingestor
    }

    async fn ingest(&self, envelope: &Envelope, payload: &UploadPayload) {
        if payload.file_path.is_empty() {
            MissingPayloadField {
                worker: INGESTOR,
                message_type: envelope.message_type().as_str(),
                field: "file_path",
                correlation_id: envelope.correlation_id(),
            }
            .log();
            return;
        }

        let started = Instant::now();
        match self.parser.parse(Path::new(&payload.file_path)).await {
            Ok(raw_text) => {
                DocumentParsed {
                    file_name: &payload.file_name,
                    text_length: raw_text.chars().count(),
                    duration: started.elapsed(),
                }
                .log();

                let source_metadata = SourceMetadata {
                    file_name: payload.file_name.clone(),
                    file_type: payload.file_type.clone(),
                    original_path: payload.file_path.clone(),
                    start_index: None,
                };
                let message = Message::IngestionComplete(IngestionPayload {
                    raw_text,
                    source_metadata,
                });
                self.bus.send(envelope.reply(INGESTOR, RETRIEVER, message)).await;
            }
            Err(e) => {
                CollaboratorFailed {
                    worker: INGESTOR,
                    operation: "parse",
                    correlation_id: envelope.correlation_id(),
                    error: &e,
                }
                .log();

                let context = format!("Failed to parse document: {}", payload.file_name);
                self.bus
                    .send(envelope.reply(INGESTOR, COORDINATOR, Message::error(e.to_string(), context)))
                    .await;
            }
        }
    }
}

#[async_trait]
impl Worker for Ingestor {
    async fn handle(&self, envelope: Envelope) -> Result<(), WorkerError> {
        EnvelopeReceived {
            worker: INGESTOR,
            sender: envelope.sender(),
            message_type: envelope.message_type().as_str(),
            correlation_id: envelope.correlation_id(),
        }
        .log();

        match envelope.message() {
            Message::UploadDocument(payload) => self.ingest(&envelope, payload).await,
            _ => UnrecognizedMessage {
                worker: INGESTOR,
                message_type: envelope.message_type().as_str(),
                correlation_id: envelope.correlation_id(),
            }
            .log(),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        INGESTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingParser, FixedTextParser, RecordingWorker};

    async fn setup(
        parser: Arc<dyn DocumentParser>,
    ) -> (Arc<DispatchBus>, Arc<RecordingWorker>, Arc<RecordingWorker>) {
        let bus = DispatchBus::new();
        Ingestor::start(&bus, parser).await;
        let retriever = Arc::new(RecordingWorker::new(RETRIEVER));
        let coordinator = Arc::new(RecordingWorker::new(COORDINATOR));
        bus.register_worker(retriever.clone()).await;
        bus.register_worker(coordinator.clone()).await;
        (bus, retriever, coordinator)
    }

    fn upload(path: &str) -> Envelope {
        Envelope::new(
            COORDINATOR,
            INGESTOR,
            Message::UploadDocument(UploadPayload {
                file_path: path.to_string(),
                file_name: "policy.txt".to_string(),
                file_type: ".txt".to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn test_parsed_text_goes_to_retriever_with_metadata() {
        let (bus, retriever, coordinator) =
            setup(Arc::new(FixedTextParser::new("Refunds within 30 days."))).await;
        let request = upload("/docs/policy.txt");
        let id = request.correlation_id();

        bus.dispatch(request).await;

        assert!(coordinator.received().await.is_empty());
        let sent = retriever.received().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].correlation_id(), id);
        assert_eq!(sent[0].sender(), INGESTOR);
        match sent[0].message() {
            Message::IngestionComplete(payload) => {
                assert_eq!(payload.raw_text, "Refunds within 30 days.");
                assert_eq!(payload.source_metadata.file_name, "policy.txt");
                assert_eq!(payload.source_metadata.file_type, ".txt");
                assert_eq!(payload.source_metadata.original_path, "/docs/policy.txt");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_parse_failure_reports_to_coordinator_only() {
        let (bus, retriever, coordinator) = setup(Arc::new(FailingParser::unsupported(".xyz"))).await;
        let request = upload("/docs/policy.xyz");
        let id = request.correlation_id();

        bus.dispatch(request).await;

        assert!(retriever.received().await.is_empty());
        let sent = coordinator.received().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].correlation_id(), id);
        match sent[0].message() {
            Message::ErrorMessage(payload) => {
                assert!(payload.error.starts_with("Unsupported file format: .xyz"));
                assert_eq!(payload.context, "Failed to parse document: policy.txt");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_path_is_dropped() {
        let (bus, retriever, coordinator) = setup(Arc::new(FixedTextParser::new("x"))).await;
        bus.dispatch(upload("")).await;

        assert!(retriever.received().await.is_empty());
        assert!(coordinator.received().await.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_type_is_dropped() {
        let (bus, retriever, coordinator) = setup(Arc::new(FixedTextParser::new("x"))).await;
        bus.dispatch(Envelope::new(
            COORDINATOR,
            INGESTOR,
            Message::QueryRequest(Default::default()),
        ))
        .await;

        assert!(retriever.received().await.is_empty());
        assert!(coordinator.received().await.is_empty());
    }
}
