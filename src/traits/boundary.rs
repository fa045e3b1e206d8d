// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::protocol::Notification;

/// The client-facing surface that receives the coordinator's callbacks.
///
/// Notifications for one trace may arrive in any order relative to other
/// traces, so implementations key everything by `trace_id`.
pub trait CallerBoundary: Send + Sync {
    fn notify(&self, notification: Notification);
}
