// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The four bus workers and the coordinator's trace table.
//!
//! ```text
//! caller -> Coordinator -> Ingestor -> Retriever (index)
//! caller -> Coordinator -> Retriever (search) -> Responder -> Coordinator -> caller
//! ```
//!
//! Each worker registers under a fixed name, uses that name as the `sender` of
//! everything it emits, and carries the incoming correlation id forward. Only
//! the coordinator mints new ids.

mod coordinator;
mod ingestor;
mod responder;
mod retriever;
mod trace;


pub use coordinator::{validate_query, validate_upload, Coordinator};
pub use ingestor::Ingestor;
pub use responder::{build_prompt, Responder, GROUNDING_INSTRUCTION};
pub use retriever::Retriever;
pub use trace::{OriginalRequest, Trace, TraceStatus, TraceStore};

pub const COORDINATOR: &str = "CoordinatorAgent";
pub const INGESTOR: &str = "IngestionAgent";
pub const RETRIEVER: &str = "RetrievalAgent";
pub const RESPONDER: &str = "LLMResponseAgent";

/// Sender name used for envelopes that enter from the caller boundary.
pub const CALLER: &str = "UI";
