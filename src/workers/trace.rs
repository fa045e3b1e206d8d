// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The coordinator's per-request aggregation records.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::errors::TraceError;
use crate::protocol::{CorrelationId, FinalResponsePayload, SourceMetadata, UploadPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceStatus {
    Uploading,
    Querying,
    Complete,
    Error,
}

impl TraceStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TraceStatus::Complete | TraceStatus::Error)
    }

    /// `uploading|querying -> complete|error`; nothing else moves.
    pub fn can_transition_to(self, next: TraceStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TraceStatus::Uploading => "uploading",
            TraceStatus::Querying => "querying",
            TraceStatus::Complete => "complete",
            TraceStatus::Error => "error",
        }
    }
}

impl fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller asked for when the trace was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalRequest {
    Upload {
        file_path: String,
        file_name: String,
        file_type: String,
    },
    Query {
        query: String,
    },
}

impl OriginalRequest {
    pub fn initial_status(&self) -> TraceStatus {
        match self {
            OriginalRequest::Upload { .. } => TraceStatus::Uploading,
            OriginalRequest::Query { .. } => TraceStatus::Querying,
        }
    }

    /// File name or query text, whichever identifies the request.
    pub fn subject(&self) -> &str {
        match self {
            OriginalRequest::Upload { file_name, .. } => file_name,
            OriginalRequest::Query { query } => query,
        }
    }
}

impl From<&UploadPayload> for OriginalRequest {
    fn from(payload: &UploadPayload) -> Self {
        OriginalRequest::Upload {
            file_path: payload.file_path.clone(),
            file_name: payload.file_name.clone(),
            file_type: payload.file_type.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Trace {
    pub correlation_id: CorrelationId,
    /// Correlation id of the caller envelope that opened this trace.
    pub request_id: Option<CorrelationId>,
    pub status: TraceStatus,
    pub original_request: OriginalRequest,
    pub answer: Option<String>,
    pub retrieved_chunks: Vec<String>,
    pub chunk_metadata: Vec<SourceMetadata>,
    pub error: Option<String>,
    pub error_context: Option<String>,
    pub opened_at: Instant,
}

impl Trace {
    pub fn new(
        correlation_id: CorrelationId,
        request_id: Option<CorrelationId>,
        original_request: OriginalRequest,
    ) -> Self {
        Self {
            correlation_id,
            request_id,
            status: original_request.initial_status(),
            original_request,
            answer: None,
            retrieved_chunks: Vec::new(),
            chunk_metadata: Vec::new(),
            error: None,
            error_context: None,
            opened_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.opened_at.elapsed()
    }

    fn transition(&mut self, next: TraceStatus) -> Result<(), TraceError> {
        if !self.status.can_transition_to(next) {
            return Err(TraceError::IllegalTransition {
                correlation_id: self.correlation_id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Trace table keyed by correlation id.
///
/// Owned by the coordinator. Completed traces are removed as they complete;
/// failed traces stay until [`remove`](Self::remove) is called so they can be
/// inspected afterwards.
///
/// Indexing success sends no message, so an upload trace that indexed cleanly
/// stays `uploading` forever. Without [`prune_uploads`](Self::prune_uploads)
/// the table grows by one entry per successful upload.
#[derive(Debug, Default)]
pub struct TraceStore {
    traces: Mutex<HashMap<CorrelationId, Trace>>,
}

impl TraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, trace: Trace) -> Result<(), TraceError> {
        let mut traces = self.traces.lock().await;
        if traces.contains_key(&trace.correlation_id) {
            return Err(TraceError::AlreadyOpen(trace.correlation_id));
        }
        traces.insert(trace.correlation_id, trace);
        Ok(())
    }

    pub async fn get(&self, id: CorrelationId) -> Option<Trace> {
        self.traces.lock().await.get(&id).cloned()
    }

    /// Merge a final response, mark the trace complete and remove it.
    ///
    /// `Ok(None)` means no trace exists for `id`.
    pub async fn complete(
        &self,
        id: CorrelationId,
        response: &FinalResponsePayload,
    ) -> Result<Option<Trace>, TraceError> {
        let mut traces = self.traces.lock().await;
        let Some(trace) = traces.get_mut(&id) else {
            return Ok(None);
        };

        trace.transition(TraceStatus::Complete)?;
        trace.answer = Some(response.answer.clone());
        trace.retrieved_chunks = response.source_chunks.clone();
        trace.chunk_metadata = response.source_metadata.clone();

        Ok(traces.remove(&id))
    }

    /// Mark the trace failed and record why. The trace is retained.
    ///
    /// `Ok(None)` means no trace exists for `id`.
    pub async fn fail(
        &self,
        id: CorrelationId,
        error: &str,
        context: &str,
    ) -> Result<Option<Trace>, TraceError> {
        let mut traces = self.traces.lock().await;
        let Some(trace) = traces.get_mut(&id) else {
            return Ok(None);
        };

        trace.transition(TraceStatus::Error)?;
        trace.error = Some(error.to_string());
        trace.error_context = Some(context.to_string());

        Ok(Some(trace.clone()))
    }

    pub async fn remove(&self, id: CorrelationId) -> Option<Trace> {
        self.traces.lock().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.traces.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.traces.lock().await.is_empty()
    }

    /// Remove `uploading` traces opened at least `min_age` ago and return
    /// them. Failed uploads and every query trace are left alone.
    pub async fn prune_uploads(&self, min_age: Duration) -> Vec<Trace> {
        let mut traces = self.traces.lock().await;
        let stale: Vec<CorrelationId> = traces
            .values()
            .filter(|trace| trace.status == TraceStatus::Uploading && trace.elapsed() >= min_age)
            .map(|trace| trace.correlation_id)
            .collect();

        stale.iter().filter_map(|id| traces.remove(id)).collect()
    }

    /// Ids of every trace currently in `status`.
    pub async fn ids_with_status(&self, status: TraceStatus) -> Vec<CorrelationId> {
        self.traces
            .lock()
            .await
            .values()
            .filter(|trace| trace.status == status)
            .map(|trace| trace.correlation_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_trace(text: &str) -> Trace {
        Trace::new(
            CorrelationId::new(),
            None,
            OriginalRequest::Query {
                query: text.to_string(),
            },
        )
    }

    fn response(answer: &str) -> FinalResponsePayload {
        FinalResponsePayload {
            answer: answer.to_string(),
            source_chunks: vec!["chunk".to_string()],
            source_metadata: vec![SourceMetadata::default()],
            original_query: "q".to_string(),
        }
    }

    #[test]
    fn test_status_transitions_table() {
        use TraceStatus::*;
        let cases = [
            (Uploading, Complete, true),
            (Uploading, Error, true),
            (Querying, Complete, true),
            (Querying, Error, true),
            (Uploading, Querying, false),
            (Querying, Querying, false),
            (Complete, Error, false),
            (Error, Complete, false),
            (Error, Error, false),
        ];

        for (from, to, allowed) in cases {
            assert_eq!(
                from.can_transition_to(to),
                allowed,
                "{} -> {} should be {}",
                from,
                to,
                if allowed { "allowed" } else { "rejected" }
            );
        }
    }

    #[test]
    fn test_initial_status_follows_request_kind() {
        let upload = OriginalRequest::from(&UploadPayload {
            file_path: "/tmp/a.txt".to_string(),
            file_name: "a.txt".to_string(),
            file_type: ".txt".to_string(),
        });
        assert_eq!(upload.initial_status(), TraceStatus::Uploading);
        assert_eq!(upload.subject(), "a.txt");
        assert_eq!(query_trace("q").status, TraceStatus::Querying);
    }

    #[tokio::test]
    async fn test_open_rejects_duplicate_id() {
        let store = TraceStore::new();
        let trace = query_trace("q");
        let id = trace.correlation_id;

        store.open(trace.clone()).await.unwrap();
        assert_eq!(store.open(trace).await, Err(TraceError::AlreadyOpen(id)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_complete_merges_and_removes() {
        let store = TraceStore::new();
        let trace = query_trace("q");
        let id = trace.correlation_id;
        store.open(trace).await.unwrap();

        let done = store.complete(id, &response("42")).await.unwrap().unwrap();

        assert_eq!(done.status, TraceStatus::Complete);
        assert_eq!(done.answer.as_deref(), Some("42"));
        assert_eq!(done.retrieved_chunks, vec!["chunk"]);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_fail_records_error_and_retains_trace() {
        let store = TraceStore::new();
        let trace = query_trace("q");
        let id = trace.correlation_id;
        store.open(trace).await.unwrap();

        store.fail(id, "boom", "ctx").await.unwrap();

        let kept = store.get(id).await.unwrap();
        assert_eq!(kept.status, TraceStatus::Error);
        assert_eq!(kept.error.as_deref(), Some("boom"));
        assert_eq!(kept.error_context.as_deref(), Some("ctx"));
        assert_eq!(store.ids_with_status(TraceStatus::Error).await, vec![id]);
    }

    #[tokio::test]
    async fn test_terminal_trace_rejects_further_transitions() {
        let store = TraceStore::new();
        let trace = query_trace("q");
        let id = trace.correlation_id;
        store.open(trace).await.unwrap();
        store.fail(id, "first", "").await.unwrap();

        let err = store.fail(id, "second", "").await.unwrap_err();
        assert_eq!(
            err,
            TraceError::IllegalTransition {
                correlation_id: id,
                from: TraceStatus::Error,
                to: TraceStatus::Error,
            }
        );

        let err = store.complete(id, &response("late")).await.unwrap_err();
        assert!(matches!(err, TraceError::IllegalTransition { to: TraceStatus::Complete, .. }));
        assert_eq!(store.get(id).await.unwrap().error.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_prune_uploads_only_takes_settled_uploads() {
        let store = TraceStore::new();
        let upload = |name: &str| {
            Trace::new(
                CorrelationId::new(),
                None,
                OriginalRequest::Upload {
                    file_path: format!("/tmp/{}", name),
                    file_name: name.to_string(),
                    file_type: ".txt".to_string(),
                },
            )
        };

        let indexed = upload("indexed.txt");
        let failed = upload("failed.txt");
        let query = query_trace("q");
        let (indexed_id, failed_id, query_id) =
            (indexed.correlation_id, failed.correlation_id, query.correlation_id);
        for trace in [indexed, failed, query] {
            store.open(trace).await.unwrap();
        }
        store.fail(failed_id, "boom", "ctx").await.unwrap();

        assert!(store.prune_uploads(Duration::from_secs(3600)).await.is_empty());
        assert_eq!(store.len().await, 3);

        let pruned = store.prune_uploads(Duration::ZERO).await;
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].correlation_id, indexed_id);
        assert!(store.get(indexed_id).await.is_none());
        assert_eq!(store.get(failed_id).await.unwrap().status, TraceStatus::Error);
        assert_eq!(store.get(query_id).await.unwrap().status, TraceStatus::Querying);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_an_error() {
        let store = TraceStore::new();
        let id = CorrelationId::new();

        assert!(store.complete(id, &response("a")).await.unwrap().is_none());
        assert!(store.fail(id, "e", "c").await.unwrap().is_none());
        assert!(store.remove(id).await.is_none());
        assert!(store.is_empty().await);
    }
}
