// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{COORDINATOR, RESPONDER};
use crate::bus::{BusHandle, DispatchBus};
use crate::errors::{LanguageModelError, WorkerError};
use crate::observability::messages::worker::{
    AnswerGenerated, CollaboratorFailed, EnvelopeReceived, MissingPayloadField,
    UnrecognizedMessage,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{Envelope, FinalResponsePayload, Message, RetrievalPayload};
use crate::traits::{LanguageModel, Worker};

pub const GROUNDING_INSTRUCTION: &str = "You are an AI assistant designed to answer questions based on the provided context.\n\
If the answer is not found in the context, state that you don't have enough information.\n\
Do not make up answers.";

/// Instruction, then the retrieved chunks one per line, then the question.
pub fn build_prompt(query: &str, context: &[String]) -> String {
    format!(
        "{}\n\nContext:\n{}\n\nQuestion: {}\n\nAnswer:",
        GROUNDING_INSTRUCTION,
        context.join("\n"),
        query
    )
}

/// Caller-facing text for each model failure class.
fn describe_failure(error: &LanguageModelError) -> String {
    match error {
        LanguageModelError::Timeout(_) => "LLM API request timed out. Please try again.".to_string(),
        LanguageModelError::Transport(detail) => format!("LLM API request failed: {}", detail),
        LanguageModelError::MalformedResponse(detail) => {
            format!("LLM response parsing failed: {}", detail)
        }
        LanguageModelError::Api { message, .. } => format!("Error from LLM API: {}", message),
    }
}

/// Generates a grounded answer from retrieved context and hands it to the coordinator.
pub struct Responder {
    bus: BusHandle,
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl Responder {
    pub fn new(bus: BusHandle, model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self {
            bus,
            model,
            timeout,
        }
    }

    pub async fn start(
        bus: &Arc<DispatchBus>,
        model: Arc<dyn LanguageModel>,
        timeout: Duration,
    ) -> Arc<Self> {
        let responder = Arc::new(Self::new(bus.handle(), model, timeout));
        bus.register_worker(responder.clone()).await;
        responder
    }

    async fn generate(&self, prompt: &str) -> Result<String, LanguageModelError> {
        match tokio::time::timeout(self.timeout, self.model.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(LanguageModelError::Timeout(self.timeout)),
        }
    }

    async fn respond(&self, envelope: &Envelope, payload: &RetrievalPayload) {
        if payload.query.is_empty() {
            MissingPayloadField {
                worker: RESPONDER,
                message_type: envelope.message_type().as_str(),
                field: "query",
                correlation_id: envelope.correlation_id(),
            }
            .log();
            return;
        }

        let prompt = build_prompt(&payload.query, &payload.retrieved_context);
        let started = Instant::now();

        let message = match self.generate(&prompt).await {
            Ok(answer) => {
                let answer = answer.trim().to_string();
                AnswerGenerated {
                    query: &payload.query,
                    answer_length: answer.len(),
                    duration: started.elapsed(),
                }
                .log();

                Message::FinalResponse(FinalResponsePayload {
                    answer,
                    source_chunks: payload.retrieved_context.clone(),
                    source_metadata: payload.source_metadata.clone(),
                    original_query: payload.query.clone(),
                })
            }
            Err(e) => {
                CollaboratorFailed {
                    worker: RESPONDER,
                    operation: "generate",
                    correlation_id: envelope.correlation_id(),
                    error: &e,
                }
                .log();
                Message::error(describe_failure(&e), format!("Query: '{}'", payload.query))
            }
        };

        self.bus.send(envelope.reply(RESPONDER, COORDINATOR, message)).await;
    }
}

#[async_trait]
impl Worker for Responder {
    async fn handle(&self, envelope: Envelope) -> Result<(), WorkerError> {
        EnvelopeReceived {
            worker: RESPONDER,
            sender: envelope.sender(),
            message_type: envelope.message_type().as_str(),
            correlation_id: envelope.correlation_id(),
        }
        .log();

        match envelope.message() {
            Message::RetrievalResult(payload) => self.respond(&envelope, payload).await,
            _ => UnrecognizedMessage {
                worker: RESPONDER,
                message_type: envelope.message_type().as_str(),
                correlation_id: envelope.correlation_id(),
            }
            .log(),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        RESPONDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingModel, RecordingWorker, ScriptedModel, SlowModel};
    use crate::protocol::SourceMetadata;
    use crate::workers::RETRIEVER;

    async fn setup(model: Arc<dyn LanguageModel>, timeout: Duration) -> (Arc<DispatchBus>, Arc<RecordingWorker>) {
        let bus = DispatchBus::new();
        Responder::start(&bus, model, timeout).await;
        let coordinator = Arc::new(RecordingWorker::new(COORDINATOR));
        bus.register_worker(coordinator.clone()).await;
        (bus, coordinator)
    }

    fn retrieval(query: &str, chunks: &[&str]) -> Envelope {
        Envelope::new(
            RETRIEVER,
            RESPONDER,
            Message::RetrievalResult(RetrievalPayload {
                query: query.to_string(),
                retrieved_context: chunks.iter().map(|c| c.to_string()).collect(),
                source_metadata: chunks
                    .iter()
                    .enumerate()
                    .map(|(i, _)| SourceMetadata {
                        file_name: format!("doc{}.txt", i),
                        ..Default::default()
                    })
                    .collect(),
            }),
        )
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("Why?", &["one".to_string(), "two".to_string()]);
        assert!(prompt.starts_with(GROUNDING_INSTRUCTION));
        assert!(prompt.contains("\n\nContext:\none\ntwo\n\nQuestion: Why?\n\nAnswer:"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_failure_texts_are_distinct() {
        let cases = [
            (
                LanguageModelError::Timeout(Duration::from_secs(30)),
                "LLM API request timed out. Please try again.",
            ),
            (
                LanguageModelError::Transport("connection refused".to_string()),
                "LLM API request failed: connection refused",
            ),
            (
                LanguageModelError::MalformedResponse("expected value".to_string()),
                "LLM response parsing failed: expected value",
            ),
            (
                LanguageModelError::Api {
                    status: Some(400),
                    message: "API key not valid".to_string(),
                },
                "Error from LLM API: API key not valid",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(describe_failure(&error), expected);
        }
    }

    #[tokio::test]
    async fn test_answer_is_trimmed_and_lists_threaded_through() {
        let model = Arc::new(ScriptedModel::new("  Thirty days.\n"));
        let (bus, coordinator) = setup(model.clone(), Duration::from_secs(5)).await;
        let request = retrieval("Refund window?", &["Refunds within 30 days.", "Receipts required."]);
        let id = request.correlation_id();

        bus.dispatch(request).await;

        let sent = coordinator.received().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].correlation_id(), id);
        match sent[0].message() {
            Message::FinalResponse(payload) => {
                assert_eq!(payload.answer, "Thirty days.");
                assert_eq!(payload.original_query, "Refund window?");
                assert_eq!(payload.source_chunks.len(), 2);
                assert_eq!(payload.source_metadata[1].file_name, "doc1.txt");
            }
            other => panic!("unexpected {:?}", other),
        }

        let prompts = model.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Refunds within 30 days.\nReceipts required."));
    }

    #[tokio::test]
    async fn test_timeout_is_reported_distinctly() {
        let model = Arc::new(SlowModel::new(Duration::from_millis(200)));
        let (bus, coordinator) = setup(model, Duration::from_millis(20)).await;

        bus.dispatch(retrieval("slow?", &[])).await;

        match coordinator.received().await[0].message() {
            Message::ErrorMessage(payload) => {
                assert_eq!(payload.error, "LLM API request timed out. Please try again.");
                assert_eq!(payload.context, "Query: 'slow?'");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_error_is_reported() {
        let model = Arc::new(FailingModel::new(|| LanguageModelError::Api {
            status: None,
            message: "quota exceeded".to_string(),
        }));
        let (bus, coordinator) = setup(model, Duration::from_secs(5)).await;

        bus.dispatch(retrieval("q", &["c"])).await;

        match coordinator.received().await[0].message() {
            Message::ErrorMessage(payload) => {
                assert_eq!(payload.error, "Error from LLM API: quota exceeded")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_query_is_dropped() {
        let model = Arc::new(ScriptedModel::new("unused"));
        let (bus, coordinator) = setup(model.clone(), Duration::from_secs(5)).await;

        bus.dispatch(retrieval("", &["c"])).await;

        assert!(coordinator.received().await.is_empty());
        assert!(model.prompts().await.is_empty());
    }
}
