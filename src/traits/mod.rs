// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod boundary;
pub mod collaborators;
pub mod worker;

pub use boundary::CallerBoundary;
pub use collaborators::{DocumentChunk, DocumentParser, Embedder, LanguageModel, VectorStore};
pub use worker::Worker;
