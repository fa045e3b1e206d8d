// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test doubles for workers and collaborators.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::bus::BusHandle;
use crate::errors::{LanguageModelError, ParseError, VectorStoreError, WorkerError};
use crate::protocol::{Envelope, SourceMetadata};
use crate::traits::{DocumentChunk, DocumentParser, LanguageModel, VectorStore, Worker};

/// Records every envelope it is handed.
pub struct RecordingWorker {
    name: &'static str,
    label: &'static str,
    received: Mutex<Vec<Envelope>>,
    log: Option<Arc<Mutex<Vec<&'static str>>>>,
}

impl RecordingWorker {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            label: name,
            received: Mutex::new(Vec::new()),
            log: None,
        }
    }

    /// Also appends `label` to a log shared with other workers, for ordering checks.
    pub fn with_log(
        name: &'static str,
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    ) -> Self {
        Self {
            label,
            log: Some(log),
            ..Self::new(name)
        }
    }

    pub async fn received(&self) -> Vec<Envelope> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl Worker for RecordingWorker {
    async fn handle(&self, envelope: Envelope) -> Result<(), WorkerError> {
        if let Some(log) = &self.log {
            log.lock().await.push(self.label);
        }
        self.received.lock().await.push(envelope);
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// A worker that always fails for testing failure isolation
pub struct FailingWorker {
    name: &'static str,
}

impl FailingWorker {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl Worker for FailingWorker {
    async fn handle(&self, envelope: Envelope) -> Result<(), WorkerError> {
        Err(WorkerError::Internal {
            worker: self.name.to_string(),
            message_type: envelope.message_type().to_string(),
            reason: "Simulated worker failure".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub struct PanickingWorker {
    name: &'static str,
}

impl PanickingWorker {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl Worker for PanickingWorker {
    async fn handle(&self, _envelope: Envelope) -> Result<(), WorkerError> {
        panic!("Simulated worker panic");
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Forwards a copy of every envelope to `target` in the same flow.
pub struct RelayWorker {
    name: &'static str,
    target: &'static str,
    bus: BusHandle,
}

impl RelayWorker {
    pub fn new(name: &'static str, target: &'static str, bus: BusHandle) -> Self {
        Self { name, target, bus }
    }
}

#[async_trait]
impl Worker for RelayWorker {
    async fn handle(&self, envelope: Envelope) -> Result<(), WorkerError> {
        let forwarded = envelope.reply(self.name, self.target, envelope.message().clone());
        self.bus.send(forwarded).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Returns the same text for every path.
pub struct FixedTextParser {
    text: String,
}

impl FixedTextParser {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl DocumentParser for FixedTextParser {
    async fn parse(&self, _path: &Path) -> Result<String, ParseError> {
        Ok(self.text.clone())
    }
}

pub struct FailingParser {
    extension: String,
}

impl FailingParser {
    pub fn unsupported(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl DocumentParser for FailingParser {
    async fn parse(&self, _path: &Path) -> Result<String, ParseError> {
        Err(ParseError::UnsupportedFormat {
            extension: self.extension.clone(),
        })
    }
}

pub struct FailingVectorStore {
    reason: String,
}

impl FailingVectorStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn index(
        &self,
        _text: &str,
        _metadata: &SourceMetadata,
    ) -> Result<Vec<DocumentChunk>, VectorStoreError> {
        Err(VectorStoreError::Unavailable(self.reason.clone()))
    }

    async fn search(&self, _query: &str, _k: usize) -> Result<Vec<DocumentChunk>, VectorStoreError> {
        Err(VectorStoreError::Unavailable(self.reason.clone()))
    }

    async fn len(&self) -> usize {
        0
    }
}

/// Answers every prompt with a fixed string and keeps the prompts it saw.
pub struct ScriptedModel {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, LanguageModelError> {
        self.prompts.lock().await.push(prompt.to_string());
        Ok(self.answer.clone())
    }
}

pub struct SlowModel {
    delay: Duration,
}

impl SlowModel {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl LanguageModel for SlowModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LanguageModelError> {
        tokio::time::sleep(self.delay).await;
        Ok("too late".to_string())
    }
}

pub struct FailingModel {
    make_error: Box<dyn Fn() -> LanguageModelError + Send + Sync>,
}

impl FailingModel {
    pub fn new(make_error: impl Fn() -> LanguageModelError + Send + Sync + 'static) -> Self {
        Self {
            make_error: Box::new(make_error),
        }
    }
}

#[async_trait]
impl LanguageModel for FailingModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LanguageModelError> {
        Err((self.make_error)())
    }
}

pub const NOT_ENOUGH_INFORMATION: &str =
    "I don't have enough information to answer that question based on the provided context.";

/// Follows the grounding instruction: echoes the first context line, or
/// declines when the prompt carries no context.
#[derive(Default)]
pub struct GroundedModel;

#[async_trait]
impl LanguageModel for GroundedModel {
    async fn generate(&self, prompt: &str) -> Result<String, LanguageModelError> {
        let context = prompt
            .split_once("Context:\n")
            .and_then(|(_, rest)| rest.split_once("\n\nQuestion:"))
            .map(|(context, _)| context.trim())
            .unwrap_or_default();

        match context.lines().next() {
            Some(first) if !first.trim().is_empty() => Ok(format!("According to the documents: {}", first)),
            _ => Ok(NOT_ENOUGH_INFORMATION.to_string()),
        }
    }
}
