// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::protocol::CorrelationId;
use crate::workers::TraceStatus;
use thiserror::Error;

/// Failure raised by a worker while handling one envelope.
///
/// The bus logs these and moves on; they never reach the sender.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The trace table rejected an update.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Anything else that went wrong inside a handler.
    #[error("{worker} failed to handle {message_type}: {reason}")]
    Internal {
        worker: String,
        message_type: String,
        reason: String,
    },
}

/// Errors raised by the coordinator's trace table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// Only uploading/querying traces may move, and only to complete/error.
    #[error("Illegal trace transition for {correlation_id}: {from:?} -> {to:?}")]
    IllegalTransition {
        correlation_id: CorrelationId,
        from: TraceStatus,
        to: TraceStatus,
    },

    /// A correlation id was opened twice.
    #[error("Trace {0} already exists")]
    AlreadyOpen(CorrelationId),
}
