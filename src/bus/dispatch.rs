// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};

use super::HandlerRegistry;
use crate::observability::messages::bus::{
    EnvelopeDropped, EnvelopeQueued, EnvelopeSent, HandlerFailed, HandlerRegistered,
    InboxDrained, PendingFlushed,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::Envelope;
use crate::traits::Worker;

/// In-process router that delivers envelopes to workers by name.
///
/// `send` never runs a handler. It appends the envelope to the inbox when the
/// receiver has a handler, or to the pending queue when it does not. Delivery
/// happens in [`run_until_idle`](Self::run_until_idle), which pops one
/// envelope at a time and awaits every handler for it, in registration order,
/// before moving on. Envelopes sent from inside a handler join the back of the
/// inbox and are picked up by the same loop, so for any one correlation id a
/// worker observes envelopes in send order.
///
/// A handler that returns an error or panics is logged and skipped; the
/// remaining handlers for the envelope still run and nothing reaches the
/// sender.
pub struct DispatchBus {
    registry: RwLock<HandlerRegistry>,
    inbox: Mutex<VecDeque<Envelope>>,
    pending: Mutex<VecDeque<Envelope>>,
    draining: AtomicBool,
}

impl DispatchBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            registry: RwLock::new(HandlerRegistry::new()),
            inbox: Mutex::new(VecDeque::new()),
            pending: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
        })
    }

    /// Non-owning sending handle for workers. Workers are owned by the bus,
    /// so they must not own it back.
    pub fn handle(self: &Arc<Self>) -> BusHandle {
        BusHandle(Arc::downgrade(self))
    }

    /// Append `handler` to the list bound to `name`. Registering the same name
    /// twice is allowed; both handlers receive every envelope.
    pub async fn register(&self, name: &str, handler: Arc<dyn Worker>) {
        let handler_count = self.registry.write().await.register(name, handler);
        HandlerRegistered { name, handler_count }.log();
    }

    /// Register a worker under its own name.
    pub async fn register_worker(&self, worker: Arc<dyn Worker>) {
        let name = worker.name();
        self.register(name, worker).await;
    }

    /// Route an envelope without delivering it.
    pub async fn send(&self, envelope: Envelope) {
        let message_type = envelope.message_type();
        let routable = self.registry.read().await.contains(envelope.receiver());

        if routable {
            EnvelopeSent {
                sender: envelope.sender(),
                receiver: envelope.receiver(),
                message_type: message_type.as_str(),
                correlation_id: envelope.correlation_id(),
            }
            .log();
            self.inbox.lock().await.push_back(envelope);
        } else {
            let mut pending = self.pending.lock().await;
            EnvelopeQueued {
                receiver: envelope.receiver(),
                message_type: message_type.as_str(),
                correlation_id: envelope.correlation_id(),
                pending: pending.len() + 1,
            }
            .log();
            pending.push_back(envelope);
        }
    }

    /// `send` followed by `run_until_idle`.
    pub async fn dispatch(&self, envelope: Envelope) -> usize {
        self.send(envelope).await;
        self.run_until_idle().await
    }

    /// Deliver inbox envelopes until the inbox is empty.
    ///
    /// Returns the number of handler invocations performed. If another call is
    /// already draining (a handler calling back in, or a second task), this
    /// returns 0 immediately and the active loop delivers whatever was queued.
    pub async fn run_until_idle(&self) -> usize {
        let started = Instant::now();
        let mut deliveries = 0;

        loop {
            if self.draining.swap(true, Ordering::AcqRel) {
                return deliveries;
            }
            let guard = DrainGuard(&self.draining);

            while let Some(envelope) = self.next_envelope().await {
                let handlers = self.registry.read().await.handlers_for(envelope.receiver());
                for handler in handlers {
                    self.deliver(handler, envelope.clone()).await;
                    deliveries += 1;
                }
            }

            drop(guard);

            // Another task may have sent between our last pop and releasing the flag.
            if self.inbox.lock().await.is_empty() {
                break;
            }
        }

        InboxDrained {
            deliveries,
            duration: started.elapsed(),
        }
        .log();
        deliveries
    }

    /// Move every pending envelope whose receiver is now registered into the
    /// inbox, in enqueue order. Undeliverable envelopes stay queued. Returns the
    /// number moved; a no-op on an empty queue.
    pub async fn flush_pending(&self) -> usize {
        let mut pending = self.pending.lock().await;
        if pending.is_empty() {
            return 0;
        }

        let registry = self.registry.read().await;
        let (ready, waiting): (VecDeque<Envelope>, VecDeque<Envelope>) = pending
            .drain(..)
            .partition(|envelope| registry.contains(envelope.receiver()));
        drop(registry);

        let released = ready.len();
        *pending = waiting;
        let remaining = pending.len();
        drop(pending);

        self.inbox.lock().await.extend(ready);
        PendingFlushed {
            released,
            remaining,
        }
        .log();
        released
    }

    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn inbox_len(&self) -> usize {
        self.inbox.lock().await.len()
    }

    pub async fn is_registered(&self, name: &str) -> bool {
        self.registry.read().await.contains(name)
    }

    /// Registered worker names, sorted.
    pub async fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().await.names().cloned().collect();
        names.sort();
        names
    }

    async fn next_envelope(&self) -> Option<Envelope> {
        self.inbox.lock().await.pop_front()
    }

    async fn deliver(&self, handler: Arc<dyn Worker>, envelope: Envelope) {
        let receiver = envelope.receiver().to_string();
        let message_type = envelope.message_type();
        let correlation_id = envelope.correlation_id();

        let outcome = AssertUnwindSafe(handler.handle(envelope))
            .catch_unwind()
            .await;

        let reason = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("handler panicked: {}", panic_message(&panic)),
        };

        HandlerFailed {
            receiver: &receiver,
            message_type: message_type.as_str(),
            correlation_id,
            reason: &reason,
        }
        .log();
    }
}

impl std::fmt::Debug for DispatchBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchBus")
            .field("draining", &self.draining.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Clears the draining flag even if a handler panic escapes the loop.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Weak sending handle held by workers.
#[derive(Clone, Debug)]
pub struct BusHandle(Weak<DispatchBus>);

impl BusHandle {
    /// Route an envelope on the owning bus. Logs and drops it when the bus is gone.
    pub async fn send(&self, envelope: Envelope) {
        match self.0.upgrade() {
            Some(bus) => bus.send(envelope).await,
            None => EnvelopeDropped {
                sender: envelope.sender(),
                receiver: envelope.receiver(),
                message_type: envelope.message_type().as_str(),
                correlation_id: envelope.correlation_id(),
            }
            .log(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingWorker, PanickingWorker, RecordingWorker, RelayWorker};
    use crate::protocol::{CorrelationId, Message, QueryPayload};

    fn query_to(receiver: &str, text: &str) -> Envelope {
        Envelope::new(
            "UI",
            receiver,
            Message::QueryRequest(QueryPayload {
                query: text.to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn test_send_to_registered_receiver_waits_for_driver() {
        let bus = DispatchBus::new();
        let worker = Arc::new(RecordingWorker::new("RetrievalAgent"));
        bus.register_worker(worker.clone()).await;

        bus.send(query_to("RetrievalAgent", "q")).await;
        assert_eq!(bus.inbox_len().await, 1);
        assert!(worker.received().await.is_empty());

        assert_eq!(bus.run_until_idle().await, 1);
        assert_eq!(worker.received().await.len(), 1);
        assert_eq!(bus.inbox_len().await, 0);
    }

    #[tokio::test]
    async fn test_per_correlation_order_is_send_order() {
        let bus = DispatchBus::new();
        let worker = Arc::new(RecordingWorker::new("RetrievalAgent"));
        bus.register_worker(worker.clone()).await;

        let id = CorrelationId::new();
        for text in ["first", "second", "third"] {
            let envelope = Envelope::with_correlation(
                "UI",
                "RetrievalAgent",
                id,
                Message::QueryRequest(QueryPayload {
                    query: text.to_string(),
                }),
            );
            bus.send(envelope).await;
        }
        bus.run_until_idle().await;

        let queries: Vec<String> = worker
            .received()
            .await
            .into_iter()
            .map(|env| match env.into_message() {
                Message::QueryRequest(payload) => payload.query,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(queries, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_unregistered_receiver_is_queued_then_flushed() {
        let bus = DispatchBus::new();

        bus.dispatch(query_to("RetrievalAgent", "early")).await;
        bus.dispatch(query_to("Nobody", "lost")).await;
        assert_eq!(bus.pending_len().await, 2);

        let worker = Arc::new(RecordingWorker::new("RetrievalAgent"));
        bus.register_worker(worker.clone()).await;

        assert_eq!(bus.flush_pending().await, 1);
        assert_eq!(bus.pending_len().await, 1);
        bus.run_until_idle().await;

        let received = worker.received().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].receiver(), "RetrievalAgent");
    }

    #[tokio::test]
    async fn test_flush_preserves_enqueue_order() {
        let bus = DispatchBus::new();
        for text in ["one", "two", "three"] {
            bus.send(query_to("RetrievalAgent", text)).await;
        }

        let worker = Arc::new(RecordingWorker::new("RetrievalAgent"));
        bus.register_worker(worker.clone()).await;
        bus.flush_pending().await;
        bus.run_until_idle().await;

        let queries: Vec<String> = worker
            .received()
            .await
            .into_iter()
            .filter_map(|env| match env.into_message() {
                Message::QueryRequest(payload) => Some(payload.query),
                _ => None,
            })
            .collect();
        assert_eq!(queries, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_flush_on_empty_queue_is_noop() {
        let bus = DispatchBus::new();
        let worker = Arc::new(RecordingWorker::new("RetrievalAgent"));
        bus.register_worker(worker.clone()).await;

        assert_eq!(bus.flush_pending().await, 0);
        assert_eq!(bus.flush_pending().await, 0);
        assert_eq!(bus.inbox_len().await, 0);
        assert_eq!(bus.run_until_idle().await, 0);
        assert!(worker.received().await.is_empty());
    }

    #[tokio::test]
    async fn test_every_handler_runs_in_registration_order() {
        let bus = DispatchBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::new(RecordingWorker::with_log("RetrievalAgent", "first", log.clone()));
        let second = Arc::new(RecordingWorker::with_log("RetrievalAgent", "second", log.clone()));
        bus.register_worker(first).await;
        bus.register_worker(second).await;

        assert_eq!(bus.dispatch(query_to("RetrievalAgent", "q")).await, 2);
        assert_eq!(*log.lock().await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_remaining_handlers() {
        let bus = DispatchBus::new();
        let survivor = Arc::new(RecordingWorker::new("IngestionAgent"));
        bus.register_worker(Arc::new(FailingWorker::new("IngestionAgent"))).await;
        bus.register_worker(survivor.clone()).await;

        let deliveries = bus.dispatch(query_to("IngestionAgent", "q")).await;

        assert_eq!(deliveries, 2);
        assert_eq!(survivor.received().await.len(), 1);
    }

    #[tokio::test]
    async fn test_handler_panic_is_isolated() {
        let bus = DispatchBus::new();
        let survivor = Arc::new(RecordingWorker::new("IngestionAgent"));
        bus.register_worker(Arc::new(PanickingWorker::new("IngestionAgent"))).await;
        bus.register_worker(survivor.clone()).await;

        bus.dispatch(query_to("IngestionAgent", "first")).await;
        bus.dispatch(query_to("IngestionAgent", "second")).await;

        assert_eq!(survivor.received().await.len(), 2);
    }

    #[tokio::test]
    async fn test_envelopes_sent_by_handlers_are_drained_by_same_loop() {
        let bus = DispatchBus::new();
        let sink = Arc::new(RecordingWorker::new("LLMResponseAgent"));
        let relay = Arc::new(RelayWorker::new("RetrievalAgent", "LLMResponseAgent", bus.handle()));
        bus.register_worker(relay).await;
        bus.register_worker(sink.clone()).await;

        let envelope = query_to("RetrievalAgent", "hop");
        let id = envelope.correlation_id();
        assert_eq!(bus.dispatch(envelope).await, 2);

        let received = sink.received().await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].correlation_id(), id);
        assert_eq!(received[0].sender(), "RetrievalAgent");
    }

    #[tokio::test]
    async fn test_dispatch_during_another_drain_returns_before_delivery() {
        let bus = DispatchBus::new();
        let worker = Arc::new(RecordingWorker::new("RetrievalAgent"));
        bus.register_worker(worker.clone()).await;

        // Stand in for a drain already running on another task.
        bus.draining.store(true, Ordering::Release);
        assert_eq!(bus.dispatch(query_to("RetrievalAgent", "q")).await, 0);
        assert!(worker.received().await.is_empty());
        assert_eq!(bus.inbox_len().await, 1);

        bus.draining.store(false, Ordering::Release);
        assert_eq!(bus.run_until_idle().await, 1);
        assert_eq!(worker.received().await.len(), 1);
    }

    #[tokio::test]
    async fn test_registered_names_are_sorted() {
        let bus = DispatchBus::new();
        assert!(!bus.is_registered("RetrievalAgent").await);

        bus.register_worker(Arc::new(RecordingWorker::new("RetrievalAgent"))).await;
        bus.register_worker(Arc::new(RecordingWorker::new("IngestionAgent"))).await;
        bus.register_worker(Arc::new(RecordingWorker::new("RetrievalAgent"))).await;

        assert!(bus.is_registered("RetrievalAgent").await);
        assert_eq!(bus.registered_names().await, vec!["IngestionAgent", "RetrievalAgent"]);
    }

    #[tokio::test]
    async fn test_handle_outliving_bus_drops_quietly() {
        let bus = DispatchBus::new();
        let handle = bus.handle();
        drop(bus);

        handle.send(query_to("RetrievalAgent", "late")).await;
    }
}
