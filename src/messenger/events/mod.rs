//! Messenger webhook payload model.
//!
//! Only the `message` event is modelled in full; other event kinds
//! (postbacks, deliveries, reads) decode with `message: None` and are
//! skipped by the router.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Object discriminator for page subscriptions.
pub const PAGE_OBJECT: &str = "page";

/// Reply sent for a message that carries attachments but no text.
pub const ATTACHMENT_PLACEHOLDER: &str = "message with attachment received";

/// Reply sent for a message with neither text nor attachments.
pub const UNRECOGNIZED_PLACEHOLDER: &str = "unrecognised message received";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

impl WebhookPayload {
    pub fn is_page(&self) -> bool {
        self.object == PAGE_OBJECT
    }
}

/// One batched entry; the platform may deliver several per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagingEvent {
    #[serde(default)]
    pub sender: Participant,
    #[serde(default)]
    pub recipient: Participant,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

impl MessagingEvent {
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Classify the event, or `None` when it carries no message at all.
    pub fn classify(&self) -> Option<Classified<'_>> {
        self.message.as_ref().map(Message::classify)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub mid: String,
    #[serde(default)]
    pub seq: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub quick_reply: Option<QuickReply>,
}

impl Message {
    pub fn classify(&self) -> Classified<'_> {
        if !self.text.is_empty() {
            Classified::Text(&self.text)
        } else if !self.attachments.is_empty() {
            Classified::Attachment
        } else {
            Classified::Unrecognized
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: AttachmentPayload,
}

/// Image/audio/video/file attachments carry `url`; location attachments carry
/// `coordinates`. Neither is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub long: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    #[serde(default)]
    pub payload: String,
}

/// Message class, derived from which message fields are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Text,
    Attachment,
    Unrecognized,
}

/// Classification result; text messages borrow their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified<'a> {
    Text(&'a str),
    Attachment,
    Unrecognized,
}

impl Classified<'_> {
    pub fn class(&self) -> MessageClass {
        match self {
            Self::Text(_) => MessageClass::Text,
            Self::Attachment => MessageClass::Attachment,
            Self::Unrecognized => MessageClass::Unrecognized,
        }
    }

    /// Fixed reply for classes that never reach the NLU backend.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Text(_) => None,
            Self::Attachment => Some(ATTACHMENT_PLACEHOLDER),
            Self::Unrecognized => Some(UNRECOGNIZED_PLACEHOLDER),
        }
    }
}

impl std::fmt::Display for MessageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Attachment => "attachment",
            Self::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}
