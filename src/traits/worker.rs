// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::WorkerError;
use crate::protocol::Envelope;

/// A named participant on the dispatch bus.
///
/// Implementations dispatch on the envelope's message type. A type the worker
/// does not recognize is logged and dropped, never forwarded and never an
/// error. Envelopes a worker originates carry its own `name()` as sender.
#[async_trait]
pub trait Worker: Send + Sync {
    async fn handle(&self, envelope: Envelope) -> Result<(), WorkerError>;

    /// Unique, stable bus registration key.
    fn name(&self) -> &'static str;
}
