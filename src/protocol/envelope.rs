// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::{CorrelationId, Message, MessageType};

/// Immutable message record exchanged on the bus.
///
/// `receiver` is the routing key. No validation of the message content
/// happens here; each receiving worker checks what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    sender: String,
    receiver: String,
    correlation_id: CorrelationId,
    message: Message,
}

impl Envelope {
    /// Start a new logical flow under a freshly minted correlation id.
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, message: Message) -> Self {
        Self::with_correlation(sender, receiver, CorrelationId::new(), message)
    }

    pub fn with_correlation(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        correlation_id: CorrelationId,
        message: Message,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            correlation_id,
            message,
        }
    }

    /// Build a downstream envelope that stays in this envelope's flow.
    pub fn reply(
        &self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        message: Message,
    ) -> Self {
        Self::with_correlation(sender, receiver, self.correlation_id, message)
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_type(&self) -> MessageType {
        self.message.kind()
    }

    pub fn into_message(self) -> Message {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::QueryPayload;

    fn query(text: &str) -> Message {
        Message::QueryRequest(QueryPayload {
            query: text.to_string(),
        })
    }

    #[test]
    fn new_envelopes_get_distinct_ids() {
        let a = Envelope::new("UI", "CoordinatorAgent", query("a"));
        let b = Envelope::new("UI", "CoordinatorAgent", query("a"));
        assert_ne!(a.correlation_id(), b.correlation_id());
    }

    #[test]
    fn reply_keeps_correlation_id() {
        let incoming = Envelope::new("CoordinatorAgent", "RetrievalAgent", query("refunds"));
        let outgoing = incoming.reply("RetrievalAgent", "LLMResponseAgent", query("refunds"));

        assert_eq!(outgoing.correlation_id(), incoming.correlation_id());
        assert_eq!(outgoing.sender(), "RetrievalAgent");
        assert_eq!(outgoing.receiver(), "LLMResponseAgent");
    }

    #[test]
    fn message_type_follows_payload() {
        let env = Envelope::new("a", "b", Message::error("boom", "ctx"));
        assert_eq!(env.message_type(), MessageType::ErrorMessage);
    }
}
