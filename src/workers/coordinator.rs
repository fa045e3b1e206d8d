// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;

use super::{OriginalRequest, Trace, TraceStore, COORDINATOR, INGESTOR, RETRIEVER};
use crate::bus::{BusHandle, DispatchBus};
use crate::errors::{RequestValidationError, WorkerError};
use crate::observability::messages::coordinator::{
    ProgressObserved, RequestRejected, TraceCompleted, TraceFailed, TraceOpened, UnknownTrace,
};
use crate::observability::messages::worker::{EnvelopeReceived, UnrecognizedMessage};
use crate::observability::messages::StructuredLog;
use crate::protocol::{
    CorrelationId, Envelope, ErrorPayload, FinalResponsePayload, Message, Notification,
    QueryPayload, UploadPayload,
};
use crate::traits::{CallerBoundary, Worker};

const STATUS_PROCESSING: &str = "Processing document...";
const STATUS_SEARCHING: &str = "Searching for answers...";
const VALIDATION_CONTEXT: &str = "CoordinatorAgent initiated error.";

/// Upload requests need a path, a name and a type.
pub fn validate_upload(payload: &UploadPayload) -> Result<(), RequestValidationError> {
    let missing: Vec<&'static str> = [
        ("file_path", &payload.file_path),
        ("file_name", &payload.file_name),
        ("file_type", &payload.file_type),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RequestValidationError::MissingFileDetails { missing })
    }
}

pub fn validate_query(payload: &QueryPayload) -> Result<(), RequestValidationError> {
    if payload.query.trim().is_empty() {
        Err(RequestValidationError::EmptyQuery)
    } else {
        Ok(())
    }
}

/// Orchestrates caller requests into worker flows and reports outcomes.
///
/// Every accepted request gets a fresh correlation id and a trace in the
/// [`TraceStore`]. Terminal replies from downstream workers resolve the trace
/// and are forwarded to the [`CallerBoundary`]; replies for ids with no trace
/// are forwarded as-is.
pub struct Coordinator {
    bus: BusHandle,
    traces: Arc<TraceStore>,
    boundary: Arc<dyn CallerBoundary>,
}

impl Coordinator {
    pub fn new(bus: BusHandle, traces: Arc<TraceStore>, boundary: Arc<dyn CallerBoundary>) -> Self {
        Self {
            bus,
            traces,
            boundary,
        }
    }

    /// Build a coordinator and register it on `bus`.
    pub async fn start(
        bus: &Arc<DispatchBus>,
        traces: Arc<TraceStore>,
        boundary: Arc<dyn CallerBoundary>,
    ) -> Arc<Self> {
        let coordinator = Arc::new(Self::new(bus.handle(), traces, boundary));
        bus.register_worker(coordinator.clone()).await;
        coordinator
    }

    pub fn traces(&self) -> &Arc<TraceStore> {
        &self.traces
    }

    async fn accept_upload(
        &self,
        envelope: &Envelope,
        payload: &UploadPayload,
    ) -> Result<(), WorkerError> {
        let request_id = envelope.correlation_id();
        if let Err(e) = validate_upload(payload) {
            self.reject(envelope, &e);
            return Ok(());
        }

        let trace_id = CorrelationId::new();
        self.traces
            .open(Trace::new(trace_id, Some(request_id), OriginalRequest::from(payload)))
            .await?;

        TraceOpened {
            trace_id,
            request_id,
            status: "uploading",
            subject: &payload.file_name,
            downstream: INGESTOR,
        }
        .log();

        self.bus
            .send(Envelope::with_correlation(
                COORDINATOR,
                INGESTOR,
                trace_id,
                Message::UploadDocument(payload.clone()),
            ))
            .await;

        self.boundary.notify(Notification::StatusUpdate {
            status: STATUS_PROCESSING.to_string(),
            trace_id,
            request_id: Some(request_id),
            file_name: Some(payload.file_name.clone()),
            original_query: None,
        });
        Ok(())
    }

    async fn accept_query(
        &self,
        envelope: &Envelope,
        payload: &QueryPayload,
    ) -> Result<(), WorkerError> {
        let request_id = envelope.correlation_id();
        if let Err(e) = validate_query(payload) {
            self.reject(envelope, &e);
            return Ok(());
        }

        let trace_id = CorrelationId::new();
        let original = OriginalRequest::Query {
            query: payload.query.clone(),
        };
        self.traces
            .open(Trace::new(trace_id, Some(request_id), original))
            .await?;

        TraceOpened {
            trace_id,
            request_id,
            status: "querying",
            subject: &payload.query,
            downstream: RETRIEVER,
        }
        .log();

        self.bus
            .send(Envelope::with_correlation(
                COORDINATOR,
                RETRIEVER,
                trace_id,
                Message::QueryRequest(payload.clone()),
            ))
            .await;

        self.boundary.notify(Notification::StatusUpdate {
            status: STATUS_SEARCHING.to_string(),
            trace_id,
            request_id: Some(request_id),
            file_name: None,
            original_query: Some(payload.query.clone()),
        });
        Ok(())
    }

    /// Validation failures never open a trace; the caller's own id is echoed.
    fn reject(&self, envelope: &Envelope, error: &RequestValidationError) {
        let reason = error.to_string();
        RequestRejected {
            request_id: envelope.correlation_id(),
            message_type: envelope.message_type().as_str(),
            reason: &reason,
        }
        .log();

        self.boundary.notify(Notification::ErrorMessage {
            trace_id: envelope.correlation_id(),
            request_id: Some(envelope.correlation_id()),
            error: reason,
            context: VALIDATION_CONTEXT.to_string(),
            sender: COORDINATOR.to_string(),
        });
    }

    async fn receive_final_response(
        &self,
        envelope: &Envelope,
        payload: &FinalResponsePayload,
    ) -> Result<(), WorkerError> {
        let trace_id = envelope.correlation_id();
        let request_id = match self.traces.complete(trace_id, payload).await? {
            Some(trace) => {
                TraceCompleted {
                    trace_id,
                    chunk_count: trace.retrieved_chunks.len(),
                    duration: Some(trace.elapsed()),
                }
                .log();
                trace.request_id
            }
            None => {
                UnknownTrace {
                    trace_id,
                    message_type: envelope.message_type().as_str(),
                }
                .log();
                None
            }
        };

        self.boundary.notify(Notification::FinalResponse {
            trace_id,
            request_id,
            query: payload.original_query.clone(),
            answer: payload.answer.clone(),
            source_chunks: payload.source_chunks.clone(),
            source_metadata: payload.source_metadata.clone(),
        });
        Ok(())
    }

    async fn receive_error(
        &self,
        envelope: &Envelope,
        payload: &ErrorPayload,
    ) -> Result<(), WorkerError> {
        let trace_id = envelope.correlation_id();
        TraceFailed {
            trace_id,
            sender: envelope.sender(),
            error: &payload.error,
            context: &payload.context,
        }
        .log();

        let request_id = match self
            .traces
            .fail(trace_id, &payload.error, &payload.context)
            .await?
        {
            Some(trace) => trace.request_id,
            None => {
                UnknownTrace {
                    trace_id,
                    message_type: envelope.message_type().as_str(),
                }
                .log();
                None
            }
        };

        self.boundary.notify(Notification::ErrorMessage {
            trace_id,
            request_id,
            error: payload.error.clone(),
            context: payload.context.clone(),
            sender: envelope.sender().to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl Worker for Coordinator {
    async fn handle(&self, envelope: Envelope) -> Result<(), WorkerError> {
        EnvelopeReceived {
            worker: COORDINATOR,
            sender: envelope.sender(),
            message_type: envelope.message_type().as_str(),
            correlation_id: envelope.correlation_id(),
        }
        .log();

        match envelope.message() {
            Message::UiUploadRequest(payload) => self.accept_upload(&envelope, payload).await,
            Message::UiQueryRequest(payload) => self.accept_query(&envelope, payload).await,
            Message::FinalResponse(payload) => {
                self.receive_final_response(&envelope, payload).await
            }
            Message::ErrorMessage(payload) => self.receive_error(&envelope, payload).await,
            Message::IngestionComplete(payload) => {
                ProgressObserved {
                    trace_id: envelope.correlation_id(),
                    message_type: envelope.message_type().as_str(),
                    detail: &format!("ingestion of '{}' complete", payload.source_metadata.file_name),
                }
                .log();
                Ok(())
            }
            Message::RetrievalResult(payload) => {
                ProgressObserved {
                    trace_id: envelope.correlation_id(),
                    message_type: envelope.message_type().as_str(),
                    detail: &format!("retrieval complete for query '{}'", payload.query),
                }
                .log();
                Ok(())
            }
            Message::UploadDocument(_) | Message::QueryRequest(_) => {
                UnrecognizedMessage {
                    worker: COORDINATOR,
                    message_type: envelope.message_type().as_str(),
                    correlation_id: envelope.correlation_id(),
                }
                .log();
                Ok(())
            }
        }
    }

    fn name(&self) -> &'static str {
        COORDINATOR
    }
}
