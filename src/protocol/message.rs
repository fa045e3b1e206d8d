// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The closed message taxonomy carried inside an [`Envelope`](super::Envelope).
//!
//! Every row of the protocol table is one [`Message`] variant, so receivers
//! match exhaustively instead of probing an open map. On the wire a message is
//! adjacently tagged:
//!
//! ```json
//! { "type": "QUERY_REQUEST", "payload": { "query": "What is the refund policy?" } }
//! ```
//!
//! | type                | sender -> receiver        |
//! |---------------------|---------------------------|
//! | `UI_UPLOAD_REQUEST` | boundary -> Coordinator   |
//! | `UI_QUERY_REQUEST`  | boundary -> Coordinator   |
//! | `UPLOAD_DOCUMENT`   | Coordinator -> Ingestor   |
//! | `INGESTION_COMPLETE`| Ingestor -> Retriever     |
//! | `QUERY_REQUEST`     | Coordinator -> Retriever  |
//! | `RETRIEVAL_RESULT`  | Retriever -> Responder    |
//! | `FINAL_RESPONSE`    | Responder -> Coordinator  |
//! | `ERROR_MESSAGE`     | any -> Coordinator        |

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    UiUploadRequest(UploadPayload),
    UiQueryRequest(QueryPayload),
    UploadDocument(UploadPayload),
    IngestionComplete(IngestionPayload),
    QueryRequest(QueryPayload),
    RetrievalResult(RetrievalPayload),
    FinalResponse(FinalResponsePayload),
    ErrorMessage(ErrorPayload),
}

impl Message {
    pub fn kind(&self) -> MessageType {
        match self {
            Message::UiUploadRequest(_) => MessageType::UiUploadRequest,
            Message::UiQueryRequest(_) => MessageType::UiQueryRequest,
            Message::UploadDocument(_) => MessageType::UploadDocument,
            Message::IngestionComplete(_) => MessageType::IngestionComplete,
            Message::QueryRequest(_) => MessageType::QueryRequest,
            Message::RetrievalResult(_) => MessageType::RetrievalResult,
            Message::FinalResponse(_) => MessageType::FinalResponse,
            Message::ErrorMessage(_) => MessageType::ErrorMessage,
        }
    }

    /// Shorthand for building an `ERROR_MESSAGE`.
    pub fn error(error: impl Into<String>, context: impl Into<String>) -> Self {
        Message::ErrorMessage(ErrorPayload {
            error: error.into(),
            context: context.into(),
        })
    }
}

/// Fieldless tag for a [`Message`], used for logging and routing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    UiUploadRequest,
    UiQueryRequest,
    UploadDocument,
    IngestionComplete,
    QueryRequest,
    RetrievalResult,
    FinalResponse,
    ErrorMessage,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::UiUploadRequest => "UI_UPLOAD_REQUEST",
            MessageType::UiQueryRequest => "UI_QUERY_REQUEST",
            MessageType::UploadDocument => "UPLOAD_DOCUMENT",
            MessageType::IngestionComplete => "INGESTION_COMPLETE",
            MessageType::QueryRequest => "QUERY_REQUEST",
            MessageType::RetrievalResult => "RETRIEVAL_RESULT",
            MessageType::FinalResponse => "FINAL_RESPONSE",
            MessageType::ErrorMessage => "ERROR_MESSAGE",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File descriptor for `UI_UPLOAD_REQUEST` and `UPLOAD_DOCUMENT`.
///
/// Fields default to empty so a caller that omits one is rejected by the
/// coordinator rather than by the deserializer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPayload {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPayload {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionPayload {
    pub raw_text: String,
    pub source_metadata: SourceMetadata,
}

/// Chunk texts and their metadata travel as parallel lists: index `i` of
/// `source_metadata` describes index `i` of `retrieved_context`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalPayload {
    pub query: String,
    #[serde(default)]
    pub retrieved_context: Vec<String>,
    #[serde(default)]
    pub source_metadata: Vec<SourceMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResponsePayload {
    pub answer: String,
    #[serde(default)]
    pub source_chunks: Vec<String>,
    #[serde(default)]
    pub source_metadata: Vec<SourceMetadata>,
    pub original_query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default = "unknown_error")]
    pub error: String,
    #[serde(default)]
    pub context: String,
}

fn unknown_error() -> String {
    "An unknown error occurred.".to_string()
}

/// Where a chunk of text came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub file_name: String,
    pub file_type: String,
    pub original_path: String,
    /// Character offset of the chunk inside the parsed document text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tags_match_protocol_names() {
        let msg = Message::QueryRequest(QueryPayload {
            query: "What is the refund policy?".to_string(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "QUERY_REQUEST");
        assert_eq!(json["payload"]["query"], "What is the refund policy?");
        assert_eq!(msg.kind().as_str(), "QUERY_REQUEST");
    }

    #[test]
    fn upload_request_tolerates_missing_fields() {
        let json = r#"{"type":"UI_UPLOAD_REQUEST","payload":{"file_name":"a.txt"}}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        match msg {
            Message::UiUploadRequest(payload) => {
                assert_eq!(payload.file_name, "a.txt");
                assert!(payload.file_path.is_empty());
                assert!(payload.file_type.is_empty());
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn error_payload_defaults_error_text() {
        let json = r#"{"type":"ERROR_MESSAGE","payload":{}}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            Message::error("An unknown error occurred.", "")
        );
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let json = r#"{"type":"INGESTION_COMPLETE_CONFIRMATION","payload":{}}"#;
        assert!(serde_json::from_str::<Message>(json).is_err());
    }

    #[test]
    fn start_index_is_omitted_when_absent() {
        let meta = SourceMetadata {
            file_name: "policy.md".to_string(),
            file_type: ".md".to_string(),
            original_path: "/tmp/policy.md".to_string(),
            start_index: None,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("start_index").is_none());
    }
}
