//! Messenger platform side of the relay: webhook payloads, the subscription
//! handshake, per-event routing, and the Send API.

pub mod events;
pub mod router;
pub mod send;
pub mod server;
pub mod verify;

pub use events::{MessageClass, MessagingEvent, WebhookPayload};
pub use router::{DeliveryStatus, DispatchReport, EventOutcome, EventRouter, TextResolver};
pub use send::{GraphApiSender, MessageSender, SendRequest};
pub use server::{WebhookState, build_router};
