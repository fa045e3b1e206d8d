// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types reported by the external collaborators (document parser,
//! vector store and language model).
//!
//! Workers turn every one of these into a single `ERROR_MESSAGE` addressed to
//! the coordinator. The `Display` text is what ends up in the `error` field.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Document text extraction failures.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Extension is not one of the known document formats.
    #[error("Unsupported file format: {extension}. Supported formats are .pdf, .pptx, .csv, .docx, .txt, .md.")]
    UnsupportedFormat { extension: String },

    /// The file could not be opened or read.
    #[error("Error reading file {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was readable but its content could not be interpreted.
    #[error("Error parsing file {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Chunking, embedding or index failures.
#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: index holds {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector store unavailable: {0}")]
    Unavailable(String),
}

/// Language model call failures, kept distinct so the responder can report
/// each one with its own message.
#[derive(Error, Debug)]
pub enum LanguageModelError {
    /// The call did not finish within the configured timeout.
    #[error("LLM API request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS or other transport failure.
    #[error("{0}")]
    Transport(String),

    /// The response body was not the JSON shape we expect.
    #[error("{0}")]
    MalformedResponse(String),

    /// The model endpoint answered with an explicit error.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },
}
