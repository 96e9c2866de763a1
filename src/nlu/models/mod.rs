//! Wire types for the NLU `/query` endpoint.
//!
//! Every response field tolerates absence: the backend omits whole objects
//! (`result`, `status`, `fulfillment`) on some error paths, and the relay
//! still needs to decode what is there.

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

fn is_false(value: &bool) -> bool {
    !*value
}

// ---------------------------------------------------------------------------
// Request side
// ---------------------------------------------------------------------------

/// One query against the NLU backend. Built fresh per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    #[serde(default, rename = "sessionId", skip_serializing_if = "String::is_empty")]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lang: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
    #[serde(default, rename = "resetContexts", skip_serializing_if = "is_false")]
    pub reset_contexts: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<Entity>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(
        default,
        rename = "originalRequest",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_request: Option<OriginalRequest>,
}

impl QueryRequest {
    /// A plain text query for `session_id`.
    pub fn text(session_id: impl Into<String>, utterances: &[String]) -> Self {
        Self {
            query: utterances.to_vec(),
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

/// Named event that triggers an intent without user text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    #[serde(default)]
    pub lifespan: i32,
}

/// User entity sent along with a query to extend or replace a developer entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<EntityEntry>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub extend: bool,
    #[serde(default, rename = "isEnum", skip_serializing_if = "is_false")]
    pub is_enum: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityEntry {
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginalRequest {
    pub source: String,
    #[serde(default)]
    pub data: HashMap<String, Value>,
}

// ---------------------------------------------------------------------------
// Response side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default, rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub result: Option<QueryResult>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl QueryResponse {
    /// The fulfillment speech, if the backend produced a non-blank one.
    pub fn speech(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|r| r.fulfillment.as_ref())
            .map(|f| f.speech.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// The status block when the backend reported a failure.
    pub fn backend_error(&self) -> Option<&Status> {
        self.status.as_ref().filter(|s| s.is_error())
    }

    /// Rich messages attached to the fulfillment, in backend order.
    pub fn messages(&self) -> &[FulfillmentMessage] {
        self.result
            .as_ref()
            .and_then(|r| r.fulfillment.as_ref())
            .map_or(&[], |f| f.messages.as_slice())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub source: String,
    #[serde(default, rename = "resolvedQuery")]
    pub resolved_query: String,
    #[serde(default)]
    pub action: String,
    #[serde(default, rename = "actionIncomplete")]
    pub action_incomplete: bool,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    #[serde(default)]
    pub contexts: Vec<Context>,
    #[serde(default)]
    pub fulfillment: Option<Fulfillment>,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<IntentMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fulfillment {
    #[serde(default)]
    pub speech: String,
    #[serde(default)]
    pub messages: Vec<FulfillmentMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentMetadata {
    #[serde(default, rename = "intentId")]
    pub intent_id: String,
    #[serde(default, rename = "intentName")]
    pub intent_name: String,
    #[serde(default, rename = "webhookUsed")]
    pub webhook_used: String,
    #[serde(default, rename = "webhookForSlotFillingUsed")]
    pub webhook_for_slot_filling_used: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default, rename = "errorType")]
    pub error_type: String,
    #[serde(default, rename = "errorDetails")]
    pub error_details: String,
    #[serde(default, rename = "errorID", alias = "errorId")]
    pub error_id: String,
}

impl Status {
    /// 4xx/5xx codes are failures; 2xx with a non-`success` error type
    /// (e.g. `partial_content`) is degraded but usable.
    pub fn is_error(&self) -> bool {
        self.code >= 400
    }

    pub fn is_degraded(&self) -> bool {
        !self.is_error() && !self.error_type.is_empty() && self.error_type != "success"
    }
}

// ---------------------------------------------------------------------------
// Rich messages, keyed by the integer `type` discriminant
// ---------------------------------------------------------------------------

pub const MESSAGE_TYPE_TEXT: i64 = 0;
pub const MESSAGE_TYPE_CARD: i64 = 1;
pub const MESSAGE_TYPE_QUICK_REPLIES: i64 = 2;
pub const MESSAGE_TYPE_IMAGE: i64 = 3;
pub const MESSAGE_TYPE_CUSTOM_PAYLOAD: i64 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentMessage {
    Text(TextMessage),
    Card(CardMessage),
    QuickReplies(QuickRepliesMessage),
    Image(ImageMessage),
    CustomPayload(CustomPayloadMessage),
    /// A discriminant this client does not model. The raw object is kept as-is.
    Unknown { kind: i64, raw: Value },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    #[serde(default)]
    pub speech: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardMessage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Button {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub postback: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickRepliesMessage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub replies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMessage {
    #[serde(default, rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomPayloadMessage {
    /// Arbitrary platform-specific JSON.
    #[serde(default)]
    pub payload: Value,
}

impl FulfillmentMessage {
    /// The wire discriminant for this message.
    pub fn kind(&self) -> i64 {
        match self {
            Self::Text(_) => MESSAGE_TYPE_TEXT,
            Self::Card(_) => MESSAGE_TYPE_CARD,
            Self::QuickReplies(_) => MESSAGE_TYPE_QUICK_REPLIES,
            Self::Image(_) => MESSAGE_TYPE_IMAGE,
            Self::CustomPayload(_) => MESSAGE_TYPE_CUSTOM_PAYLOAD,
            Self::Unknown { kind, .. } => *kind,
        }
    }
}

impl<'de> Deserialize<'de> for FulfillmentMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let kind = raw
            .get("type")
            .and_then(Value::as_i64)
            .ok_or_else(|| de::Error::missing_field("type"))?;

        let parsed = match kind {
            MESSAGE_TYPE_TEXT => serde_json::from_value(raw.clone()).map(Self::Text),
            MESSAGE_TYPE_CARD => serde_json::from_value(raw.clone()).map(Self::Card),
            MESSAGE_TYPE_QUICK_REPLIES => {
                serde_json::from_value(raw.clone()).map(Self::QuickReplies)
            }
            MESSAGE_TYPE_IMAGE => serde_json::from_value(raw.clone()).map(Self::Image),
            MESSAGE_TYPE_CUSTOM_PAYLOAD => {
                serde_json::from_value(raw.clone()).map(Self::CustomPayload)
            }
            _ => return Ok(Self::Unknown { kind, raw }),
        };

        // Shape mismatches on a known type stay raw so the response still decodes.
        Ok(parsed.unwrap_or_else(|e| {
            debug!("keeping type {} message raw, body did not decode: {}", kind, e);
            Self::Unknown { kind, raw }
        }))
    }
}

impl Serialize for FulfillmentMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let body = match self {
            Self::Text(m) => serde_json::to_value(m),
            Self::Card(m) => serde_json::to_value(m),
            Self::QuickReplies(m) => serde_json::to_value(m),
            Self::Image(m) => serde_json::to_value(m),
            Self::CustomPayload(m) => serde_json::to_value(m),
            Self::Unknown { raw, .. } => return raw.serialize(serializer),
        };
        let mut body = body.map_err(ser::Error::custom)?;
        if let Value::Object(map) = &mut body {
            map.insert("type".to_string(), Value::from(self.kind()));
        }
        body.serialize(serializer)
    }
}
