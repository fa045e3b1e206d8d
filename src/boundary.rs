// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Caller boundary implementations.

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::protocol::{CorrelationId, Notification, NotificationKind};
use crate::traits::CallerBoundary;

/// Forwards notifications into an unbounded channel.
///
/// A closed receiver is not an error for the coordinator; the notification is
/// dropped and logged.
#[derive(Debug, Clone)]
pub struct ChannelBoundary {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelBoundary {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl CallerBoundary for ChannelBoundary {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.sender.send(notification) {
            tracing::warn!(
                trace_id = %e.0.trace_id(),
                "Caller boundary closed; dropped {:?} notification",
                e.0.kind()
            );
        }
    }
}

/// Keeps every notification in arrival order.
#[derive(Debug, Default)]
pub struct RecordingBoundary {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Notifications for one trace id, in arrival order.
    pub fn for_trace(&self, trace_id: CorrelationId) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter(|n| n.trace_id() == trace_id)
            .cloned()
            .collect()
    }

    pub fn kinds_for(&self, trace_id: CorrelationId) -> Vec<NotificationKind> {
        self.for_trace(trace_id).iter().map(Notification::kind).collect()
    }

    /// Remove and return everything received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CallerBoundary for RecordingBoundary {
    fn notify(&self, notification: Notification) {
        self.lock().push(notification);
    }
}
