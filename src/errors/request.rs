// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A caller-originated request that is missing a required field.
///
/// These are surfaced straight to the caller boundary and never open a trace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("Missing file details for upload.")]
    MissingFileDetails { missing: Vec<&'static str> },

    #[error("Your query is empty. Please ask a question.")]
    EmptyQuery,
}
