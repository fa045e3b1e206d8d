// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collaborator implementations that sit behind the workers.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process implementations:
//! - **FileDocumentParser**: text, markdown, CSV, PDF, DOCX and PPTX extraction
//! - **TextSplitter**: recursive character chunking with overlap
//! - **MiniLmEmbedder**: `all-MiniLM-L6-v2` sentence embeddings via fastembed
//!   (model files are downloaded on first use)
//! - **HashingEmbedder**: deterministic feature-hashed embeddings, fully offline
//! - **InMemoryVectorStore**: cosine-similarity search over indexed chunks
//!
//! ## Gemini Backend
//! [`gemini::GeminiClient`] calls the hosted `generateContent` endpoint over HTTPS.
//!
//! ## Stub Backend (Test-Only)
//! Recording and failing workers, parsers, stores and models for unit and
//! integration tests. NOT available in production builds.

pub mod gemini;
pub mod local;
#[cfg(test)]
pub mod stub;
