// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the dispatch bus.
//!
//! This module contains message types for logging events related to:
//! * Handler registration
//! * Envelope routing (inbox vs. pending queue)
//! * Handler failure isolation
//! * Pending queue flushes and inbox draining

use crate::observability::messages::StructuredLog;
use crate::protocol::CorrelationId;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Handler registered for a worker name.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_ragwood::observability::messages::bus::HandlerRegistered;
///
/// let msg = HandlerRegistered {
///     name: "RetrievalAgent",
///     handler_count: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct HandlerRegistered<'a> {
    pub name: &'a str,
    pub handler_count: usize,
}

impl Display for HandlerRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handler registered for '{}' ({} total)",
            self.name, self.handler_count
        )
    }
}

impl StructuredLog for HandlerRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            name = self.name,
            handler_count = self.handler_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "handler_registered",
            span_name = name,
            name = self.name,
            handler_count = self.handler_count,
        )
    }
}

/// Envelope accepted into the delivery inbox.
///
/// # Log Level
/// `debug!` - High-volume routing detail
///
/// # Example
/// ```
/// use the_ragwood::observability::messages::bus::EnvelopeSent;
/// use the_ragwood::protocol::CorrelationId;
///
/// let msg = EnvelopeSent {
///     sender: "CoordinatorAgent",
///     receiver: "RetrievalAgent",
///     message_type: "QUERY_REQUEST",
///     correlation_id: CorrelationId::new(),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct EnvelopeSent<'a> {
    pub sender: &'a str,
    pub receiver: &'a str,
    pub message_type: &'a str,
    pub correlation_id: CorrelationId,
}

impl Display for EnvelopeSent<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sending {} from {} to {} (trace {})",
            self.message_type, self.sender, self.receiver, self.correlation_id
        )
    }
}

impl StructuredLog for EnvelopeSent<'_> {
    fn log(&self) {
        tracing::debug!(
            sender = self.sender,
            receiver = self.receiver,
            message_type = self.message_type,
            correlation_id = %self.correlation_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "envelope",
            span_name = name,
            sender = self.sender,
            receiver = self.receiver,
            message_type = self.message_type,
            correlation_id = %self.correlation_id,
        )
    }
}

/// No handler registered for the receiver; envelope parked in the pending queue.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
///
/// # Example
/// ```
/// use the_ragwood::observability::messages::bus::EnvelopeQueued;
/// use the_ragwood::protocol::CorrelationId;
///
/// let msg = EnvelopeQueued {
///     receiver: "RetrievalAgent",
///     message_type: "QUERY_REQUEST",
///     correlation_id: CorrelationId::new(),
///     pending: 1,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct EnvelopeQueued<'a> {
    pub receiver: &'a str,
    pub message_type: &'a str,
    pub correlation_id: CorrelationId,
    pub pending: usize,
}

impl Display for EnvelopeQueued<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No handler registered for {}. {} queued (trace {}); pending queue size: {}",
            self.receiver, self.message_type, self.correlation_id, self.pending
        )
    }
}

impl StructuredLog for EnvelopeQueued<'_> {
    fn log(&self) {
        tracing::warn!(
            receiver = self.receiver,
            message_type = self.message_type,
            correlation_id = %self.correlation_id,
            pending = self.pending,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "envelope_queued",
            span_name = name,
            receiver = self.receiver,
            correlation_id = %self.correlation_id,
        )
    }
}

/// A handler returned an error or panicked; the bus swallowed it.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_ragwood::observability::messages::bus::HandlerFailed;
/// use the_ragwood::protocol::CorrelationId;
///
/// let msg = HandlerFailed {
///     receiver: "IngestionAgent",
///     message_type: "UPLOAD_DOCUMENT",
///     correlation_id: CorrelationId::new(),
///     reason: "handler panicked",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct HandlerFailed<'a> {
    pub receiver: &'a str,
    pub message_type: &'a str,
    pub correlation_id: CorrelationId,
    pub reason: &'a str,
}

impl Display for HandlerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handler for {} failed to process message type '{}' (trace {}): {}",
            self.receiver, self.message_type, self.correlation_id, self.reason
        )
    }
}

impl StructuredLog for HandlerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            receiver = self.receiver,
            message_type = self.message_type,
            correlation_id = %self.correlation_id,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "handler_failed",
            span_name = name,
            receiver = self.receiver,
            correlation_id = %self.correlation_id,
        )
    }
}

/// Pending queue re-examined after registrations changed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PendingFlushed {
    pub released: usize,
    pub remaining: usize,
}

impl Display for PendingFlushed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.remaining == 0 {
            write!(f, "Released {} queued envelopes; pending queue empty", self.released)
        } else {
            write!(
                f,
                "Released {} queued envelopes; {} remain undeliverable",
                self.released, self.remaining
            )
        }
    }
}

impl StructuredLog for PendingFlushed {
    fn log(&self) {
        tracing::info!(released = self.released, remaining = self.remaining, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pending_flushed",
            span_name = name,
            released = self.released,
            remaining = self.remaining,
        )
    }
}

/// The driver loop emptied the inbox.
///
/// # Log Level
/// `debug!` - High-volume routing detail
pub struct InboxDrained {
    pub deliveries: usize,
    pub duration: std::time::Duration,
}

impl Display for InboxDrained {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Inbox drained: {} deliveries in {:?}",
            self.deliveries, self.duration
        )
    }
}

impl StructuredLog for InboxDrained {
    fn log(&self) {
        tracing::debug!(
            deliveries = self.deliveries,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("inbox_drained", span_name = name, deliveries = self.deliveries)
    }
}

/// A worker tried to send after its bus was dropped.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct EnvelopeDropped<'a> {
    pub sender: &'a str,
    pub receiver: &'a str,
    pub message_type: &'a str,
    pub correlation_id: CorrelationId,
}

impl Display for EnvelopeDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bus is gone; dropped {} from {} to {} (trace {})",
            self.message_type, self.sender, self.receiver, self.correlation_id
        )
    }
}

impl StructuredLog for EnvelopeDropped<'_> {
    fn log(&self) {
        tracing::warn!(
            sender = self.sender,
            receiver = self.receiver,
            message_type = self.message_type,
            correlation_id = %self.correlation_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("envelope_dropped", span_name = name, receiver = self.receiver)
    }
}
