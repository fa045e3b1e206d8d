// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it with its fields attached.
//!
//! # Organization
//!
//! * `bus` - dispatch bus routing and delivery events
//! * `coordinator` - trace lifecycle events
//! * `worker` - per-worker processing events
//! * `validation` - configuration validation problems

use tracing::Span;

pub mod bus;
pub mod coordinator;
pub mod validation;
pub mod worker;

/// Emit a message as a structured `tracing` event, or open a span for it.
pub trait StructuredLog {
    /// Log at the level appropriate for this message.
    fn log(&self);

    /// A span carrying the same fields, for grouping nested events.
    fn span(&self, name: &str) -> Span;
}
