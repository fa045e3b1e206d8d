// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::Worker;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps a worker name to every handler registered under it.
///
/// Handlers are kept in registration order; a name may carry more than one
/// handler and every one of them sees each envelope addressed to that name.
/// Workers are held as `Arc<dyn Worker>` so the bus can clone the handler list
/// out of its lock before awaiting any of them.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use the_ragwood::bus::HandlerRegistry;
/// use the_ragwood::errors::WorkerError;
/// use the_ragwood::protocol::Envelope;
/// use the_ragwood::traits::Worker;
///
/// struct Sink;
///
/// #[async_trait]
/// impl Worker for Sink {
///     async fn handle(&self, _envelope: Envelope) -> Result<(), WorkerError> {
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "RetrievalAgent"
///     }
/// }
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("RetrievalAgent", Arc::new(Sink));
///
/// assert!(registry.contains("RetrievalAgent"));
/// assert_eq!(registry.handlers_for("RetrievalAgent").len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry(HashMap<String, Vec<Arc<dyn Worker>>>);

impl HandlerRegistry {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Append a handler under `name`. Returns how many handlers the name now has.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Worker>) -> usize {
        let handlers = self.0.entry(name.into()).or_default();
        handlers.push(handler);
        handlers.len()
    }

    /// Handlers for `name` in registration order; empty when none are registered.
    pub fn handlers_for(&self, name: &str) -> Vec<Arc<dyn Worker>> {
        self.0.get(name).cloned().unwrap_or_default()
    }

    /// True when at least one handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|handlers| !handlers.is_empty())
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&String, usize> = self.0.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("HandlerRegistry")
            .field("name_count", &self.0.len())
            .field("handlers", &counts)
            .finish()
    }
}
