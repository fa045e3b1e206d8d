// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod collaborator;
mod config;
mod request;
mod worker;

pub use collaborator::{LanguageModelError, ParseError, VectorStoreError};
pub use config::{ConfigError, ValidationError};
pub use request::RequestValidationError;
pub use worker::{TraceError, WorkerError};
