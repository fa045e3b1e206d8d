// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::{CorrelationId, SourceMetadata};

/// Callback shapes the coordinator hands to the caller boundary.
///
/// These sit outside the bus protocol: they are never routed, only delivered
/// to whatever [`CallerBoundary`](crate::traits::CallerBoundary) the
/// coordinator was built with. `trace_id` is the coordinator's correlation id;
/// `request_id` echoes the id of the caller envelope that opened the trace,
/// when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    StatusUpdate {
        status: String,
        trace_id: CorrelationId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<CorrelationId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original_query: Option<String>,
    },
    FinalResponse {
        trace_id: CorrelationId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<CorrelationId>,
        query: String,
        answer: String,
        source_chunks: Vec<String>,
        source_metadata: Vec<SourceMetadata>,
    },
    ErrorMessage {
        trace_id: CorrelationId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<CorrelationId>,
        error: String,
        context: String,
        sender: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    StatusUpdate,
    FinalResponse,
    ErrorMessage,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::StatusUpdate { .. } => NotificationKind::StatusUpdate,
            Notification::FinalResponse { .. } => NotificationKind::FinalResponse,
            Notification::ErrorMessage { .. } => NotificationKind::ErrorMessage,
        }
    }

    pub fn trace_id(&self) -> CorrelationId {
        match self {
            Notification::StatusUpdate { trace_id, .. }
            | Notification::FinalResponse { trace_id, .. }
            | Notification::ErrorMessage { trace_id, .. } => *trace_id,
        }
    }

    pub fn request_id(&self) -> Option<CorrelationId> {
        match self {
            Notification::StatusUpdate { request_id, .. }
            | Notification::FinalResponse { request_id, .. }
            | Notification::ErrorMessage { request_id, .. } => *request_id,
        }
    }

    /// Final responses and errors end a trace's visible lifecycle.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::StatusUpdate { .. })
    }
}
