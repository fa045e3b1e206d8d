// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational log lines are typed messages that implement
//! `Display` and [`StructuredLog`](messages::StructuredLog). Call sites build a
//! message struct and call `.log()`, which emits the event at the right level
//! with the message fields attached as structured `tracing` fields.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::bus` - routing, queueing and handler isolation on the dispatch bus
//! * `messages::coordinator` - trace lifecycle and caller-boundary notifications
//! * `messages::worker` - ingestion, indexing, retrieval and answer generation
//! * `messages::validation` - configuration validation problems
//!
//! # Usage
//!
//! ```rust
//! use the_ragwood::observability::messages::{bus::EnvelopeQueued, StructuredLog};
//! use the_ragwood::protocol::CorrelationId;
//!
//! let msg = EnvelopeQueued {
//!     receiver: "RetrievalAgent",
//!     message_type: "QUERY_REQUEST",
//!     correlation_id: CorrelationId::new(),
//!     pending: 1,
//! };
//!
//! msg.log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is
/// harmless; the second install is ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
