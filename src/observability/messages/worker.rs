// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the ingestion, retrieval and response workers.
//!
//! This module contains message types for logging events related to:
//! * Envelope receipt and unrecognized message types
//! * Document parsing
//! * Chunk indexing and retrieval
//! * Answer generation
//! * Collaborator failures reported back to the coordinator

use crate::observability::messages::StructuredLog;
use crate::protocol::CorrelationId;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker picked up an envelope.
///
/// # Log Level
/// `debug!` - High-volume routing detail
pub struct EnvelopeReceived<'a> {
    pub worker: &'a str,
    pub sender: &'a str,
    pub message_type: &'a str,
    pub correlation_id: CorrelationId,
}

impl Display for EnvelopeReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: received '{}' from {} (trace {})",
            self.worker, self.message_type, self.sender, self.correlation_id
        )
    }
}

impl StructuredLog for EnvelopeReceived<'_> {
    fn log(&self) {
        tracing::debug!(
            worker = self.worker,
            sender = self.sender,
            message_type = self.message_type,
            correlation_id = %self.correlation_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker",
            span_name = name,
            worker = self.worker,
            message_type = self.message_type,
            correlation_id = %self.correlation_id,
        )
    }
}

/// Worker got a message type it has no handler for; dropped.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
///
/// # Example
/// ```
/// use the_ragwood::observability::messages::worker::UnrecognizedMessage;
/// use the_ragwood::protocol::CorrelationId;
///
/// let msg = UnrecognizedMessage {
///     worker: "IngestionAgent",
///     message_type: "QUERY_REQUEST",
///     correlation_id: CorrelationId::new(),
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct UnrecognizedMessage<'a> {
    pub worker: &'a str,
    pub message_type: &'a str,
    pub correlation_id: CorrelationId,
}

impl Display for UnrecognizedMessage<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: unrecognized message type '{}' (trace {}); dropped",
            self.worker, self.message_type, self.correlation_id
        )
    }
}

impl StructuredLog for UnrecognizedMessage<'_> {
    fn log(&self) {
        tracing::warn!(
            worker = self.worker,
            message_type = self.message_type,
            correlation_id = %self.correlation_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("unrecognized_message", span_name = name, worker = self.worker)
    }
}

/// Required payload field empty; the envelope is dropped without reply.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct MissingPayloadField<'a> {
    pub worker: &'a str,
    pub message_type: &'a str,
    pub field: &'a str,
    pub correlation_id: CorrelationId,
}

impl Display for MissingPayloadField<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: '{}' missing in {} payload (trace {})",
            self.worker, self.field, self.message_type, self.correlation_id
        )
    }
}

impl StructuredLog for MissingPayloadField<'_> {
    fn log(&self) {
        tracing::warn!(
            worker = self.worker,
            message_type = self.message_type,
            field = self.field,
            correlation_id = %self.correlation_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("missing_payload_field", span_name = name, field = self.field)
    }
}

/// Document text extracted.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DocumentParsed<'a> {
    pub file_name: &'a str,
    pub text_length: usize,
    pub duration: std::time::Duration,
}

impl Display for DocumentParsed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Parsed '{}': {} characters in {:?}",
            self.file_name, self.text_length, self.duration
        )
    }
}

impl StructuredLog for DocumentParsed<'_> {
    fn log(&self) {
        tracing::info!(
            file_name = self.file_name,
            text_length = self.text_length,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("document_parsed", span_name = name, file_name = self.file_name)
    }
}

/// Chunks written into the vector store.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ChunksIndexed<'a> {
    pub file_name: &'a str,
    pub chunk_count: usize,
    pub index_size: usize,
}

impl Display for ChunksIndexed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.chunk_count == 0 {
            write!(f, "No chunks were added to the vector store for '{}'", self.file_name)
        } else {
            write!(
                f,
                "Added {} chunks from '{}' to the vector store (index size {})",
                self.chunk_count, self.file_name, self.index_size
            )
        }
    }
}

impl StructuredLog for ChunksIndexed<'_> {
    fn log(&self) {
        tracing::info!(
            file_name = self.file_name,
            chunk_count = self.chunk_count,
            index_size = self.index_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("chunks_indexed", span_name = name, file_name = self.file_name)
    }
}

/// Similarity search finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ChunksRetrieved<'a> {
    pub query: &'a str,
    pub requested: usize,
    pub returned: usize,
}

impl Display for ChunksRetrieved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrieved {} of up to {} chunks for query '{}'",
            self.returned, self.requested, self.query
        )
    }
}

impl StructuredLog for ChunksRetrieved<'_> {
    fn log(&self) {
        tracing::info!(
            query = self.query,
            requested = self.requested,
            returned = self.returned,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("chunks_retrieved", span_name = name, returned = self.returned)
    }
}

/// Model produced an answer.
///
/// # Log Level
/// `info!` - Important operational event
pub struct AnswerGenerated<'a> {
    pub query: &'a str,
    pub answer_length: usize,
    pub duration: std::time::Duration,
}

impl Display for AnswerGenerated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Generated answer for '{}': {} characters in {:?}",
            self.query, self.answer_length, self.duration
        )
    }
}

impl StructuredLog for AnswerGenerated<'_> {
    fn log(&self) {
        tracing::info!(
            query = self.query,
            answer_length = self.answer_length,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("answer_generated", span_name = name)
    }
}

/// A collaborator call failed; an `ERROR_MESSAGE` goes to the coordinator.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_ragwood::observability::messages::worker::CollaboratorFailed;
/// use the_ragwood::protocol::CorrelationId;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
/// let msg = CollaboratorFailed {
///     worker: "IngestionAgent",
///     operation: "parse",
///     correlation_id: CorrelationId::new(),
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CollaboratorFailed<'a> {
    pub worker: &'a str,
    pub operation: &'a str,
    pub correlation_id: CorrelationId,
    pub error: &'a dyn std::error::Error,
}

impl Display for CollaboratorFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: {} failed (trace {}): {}",
            self.worker, self.operation, self.correlation_id, self.error
        )
    }
}

impl StructuredLog for CollaboratorFailed<'_> {
    fn log(&self) {
        tracing::error!(
            worker = self.worker,
            operation = self.operation,
            correlation_id = %self.correlation_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "collaborator_failed",
            span_name = name,
            worker = self.worker,
            operation = self.operation,
        )
    }
}
