// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wire types shared by every worker: the envelope, its correlation id, the
//! closed message taxonomy and the notifications handed to the caller
//! boundary.

mod correlation;
mod envelope;
mod message;
mod notification;

pub use correlation::CorrelationId;
pub use envelope::Envelope;
pub use message::{
    ErrorPayload, FinalResponsePayload, IngestionPayload, Message, MessageType, QueryPayload,
    RetrievalPayload, SourceMetadata, UploadPayload,
};
pub use notification::{Notification, NotificationKind};
