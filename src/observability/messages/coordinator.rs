// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the coordinator's trace lifecycle.

use crate::observability::messages::StructuredLog;
use crate::protocol::CorrelationId;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Caller request accepted and a trace opened.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_ragwood::observability::messages::coordinator::TraceOpened;
/// use the_ragwood::protocol::CorrelationId;
///
/// let msg = TraceOpened {
///     trace_id: CorrelationId::new(),
///     request_id: CorrelationId::new(),
///     status: "querying",
///     subject: "What is the refund policy?",
///     downstream: "RetrievalAgent",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct TraceOpened<'a> {
    pub trace_id: CorrelationId,
    pub request_id: CorrelationId,
    pub status: &'a str,
    pub subject: &'a str,
    pub downstream: &'a str,
}

impl Display for TraceOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Trace {} opened ({}) for '{}'; routing to {}",
            self.trace_id, self.status, self.subject, self.downstream
        )
    }
}

impl StructuredLog for TraceOpened<'_> {
    fn log(&self) {
        tracing::info!(
            trace_id = %self.trace_id,
            request_id = %self.request_id,
            status = self.status,
            downstream = self.downstream,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "trace",
            span_name = name,
            trace_id = %self.trace_id,
            status = self.status,
        )
    }
}

/// Caller request rejected before a trace existed.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct RequestRejected<'a> {
    pub request_id: CorrelationId,
    pub message_type: &'a str,
    pub reason: &'a str,
}

impl Display for RequestRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected {} (request {}): {}",
            self.message_type, self.request_id, self.reason
        )
    }
}

impl StructuredLog for RequestRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            request_id = %self.request_id,
            message_type = self.message_type,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("request_rejected", span_name = name, request_id = %self.request_id)
    }
}

/// Final response merged into the trace and forwarded.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TraceCompleted {
    pub trace_id: CorrelationId,
    pub chunk_count: usize,
    pub duration: Option<std::time::Duration>,
}

impl Display for TraceCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.duration {
            Some(duration) => write!(
                f,
                "Trace {} complete with {} source chunks in {:?}",
                self.trace_id, self.chunk_count, duration
            ),
            None => write!(
                f,
                "Trace {} complete with {} source chunks",
                self.trace_id, self.chunk_count
            ),
        }
    }
}

impl StructuredLog for TraceCompleted {
    fn log(&self) {
        tracing::info!(
            trace_id = %self.trace_id,
            chunk_count = self.chunk_count,
            duration_ms = self.duration.map(|d| d.as_millis() as u64),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("trace_completed", span_name = name, trace_id = %self.trace_id)
    }
}

/// A worker reported an error for a trace.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TraceFailed<'a> {
    pub trace_id: CorrelationId,
    pub sender: &'a str,
    pub error: &'a str,
    pub context: &'a str,
}

impl Display for TraceFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Received error from {} (trace {}): {} - Context: {}",
            self.sender, self.trace_id, self.error, self.context
        )
    }
}

impl StructuredLog for TraceFailed<'_> {
    fn log(&self) {
        tracing::error!(
            trace_id = %self.trace_id,
            sender = self.sender,
            error = self.error,
            context = self.context,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "trace_failed",
            span_name = name,
            trace_id = %self.trace_id,
            sender = self.sender,
        )
    }
}

/// Terminal message arrived for a correlation id with no trace.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct UnknownTrace<'a> {
    pub trace_id: CorrelationId,
    pub message_type: &'a str,
}

impl Display for UnknownTrace<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Received {} for unknown trace {}; forwarding directly to caller",
            self.message_type, self.trace_id
        )
    }
}

impl StructuredLog for UnknownTrace<'_> {
    fn log(&self) {
        tracing::warn!(
            trace_id = %self.trace_id,
            message_type = self.message_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("unknown_trace", span_name = name, trace_id = %self.trace_id)
    }
}

/// Intermediate hop seen by the coordinator; nothing to do but note it.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProgressObserved<'a> {
    pub trace_id: CorrelationId,
    pub message_type: &'a str,
    pub detail: &'a str,
}

impl Display for ProgressObserved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Observed {} for trace {}: {}",
            self.message_type, self.trace_id, self.detail
        )
    }
}

impl StructuredLog for ProgressObserved<'_> {
    fn log(&self) {
        tracing::info!(
            trace_id = %self.trace_id,
            message_type = self.message_type,
            detail = self.detail,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("progress", span_name = name, trace_id = %self.trace_id)
    }
}
