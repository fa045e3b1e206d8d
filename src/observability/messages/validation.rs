// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration file loaded and parsed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub format: &'a str,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded {} configuration from '{}'", self.format, self.path)
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, format = self.format, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config_loaded", span_name = name, path = self.path, format = self.format)
    }
}

/// A configuration value failed a semantic check.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_ragwood::errors::ValidationError;
/// use the_ragwood::observability::messages::validation::ConfigValueRejected;
///
/// let error = ValidationError::ZeroTopK;
/// let msg = ConfigValueRejected { error: &error };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ConfigValueRejected<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ConfigValueRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration value rejected: {}", self.error)
    }
}

impl StructuredLog for ConfigValueRejected<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("config_value_rejected", span_name = name, error = %self.error)
    }
}

/// The language model API key is empty after env overrides.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct ApiKeyMissing<'a> {
    pub env_var: &'a str,
}

impl Display for ApiKeyMissing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No language model API key configured; set llm.api_key or {}",
            self.env_var
        )
    }
}

impl StructuredLog for ApiKeyMissing<'_> {
    fn log(&self) {
        tracing::warn!(env_var = self.env_var, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("api_key_missing", span_name = name, env_var = self.env_var)
    }
}
