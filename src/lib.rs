// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // collaborator implementations
pub mod boundary;   // caller-facing notification sinks
pub mod bus;        // dispatch bus + handler registry
pub mod config;     // config + runtime wiring
pub mod errors;     // error handling
pub mod observability;
pub mod protocol;   // envelopes, messages, notifications
pub mod traits;     // unified abstractions
pub mod workers;    // coordinator, ingestor, retriever, responder
