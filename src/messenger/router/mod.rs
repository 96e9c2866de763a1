use crate::errors::{RelayError, RelayResult};
use crate::messenger::events::{Classified, MessageClass, MessagingEvent, WebhookPayload};
use crate::messenger::send::MessageSender;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Turns a user's text into the reply sent back to them.
///
/// This is the seam between the webhook pipeline and whatever produces
/// replies (the NLU backend in production, fixed answers in tests).
#[async_trait]
pub trait TextResolver: Send + Sync {
    async fn resolve(&self, sender_id: &str, text: &str) -> RelayResult<String>;
}

/// What happened to one messaging event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    /// The event carried no `message`; nothing was sent.
    Skipped,
    ResolveFailed(String),
    SendFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    pub sender_id: String,
    pub class: Option<MessageClass>,
    /// The reply handed to the sender, when one was produced.
    pub reply: Option<String>,
    pub status: DeliveryStatus,
}

/// Per-delivery record of every event the router looked at, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub object: String,
    /// Set when the payload was not a page subscription and was dropped whole.
    pub ignored: bool,
    pub outcomes: Vec<EventOutcome>,
}

impl DispatchReport {
    pub fn sent(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == DeliveryStatus::Sent)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EventOutcome> {
        self.outcomes.iter().filter(|o| {
            matches!(
                o.status,
                DeliveryStatus::ResolveFailed(_) | DeliveryStatus::SendFailed(_)
            )
        })
    }
}

/// Dispatches decoded webhook payloads to the resolver and the sender.
///
/// Entries and their events are handled strictly in array order, one at a
/// time; a failure on one event never stops the rest of the batch.
pub struct EventRouter {
    resolver: Arc<dyn TextResolver>,
    sender: Arc<dyn MessageSender>,
}

impl EventRouter {
    pub fn new(resolver: Arc<dyn TextResolver>, sender: Arc<dyn MessageSender>) -> Self {
        Self { resolver, sender }
    }

    /// Decode a raw POST body and dispatch it. Only a decode failure is an error.
    pub async fn handle_body(&self, body: &[u8]) -> RelayResult<DispatchReport> {
        let payload: WebhookPayload = serde_json::from_slice(body).map_err(RelayError::Decode)?;
        Ok(self.dispatch(&payload).await)
    }

    pub async fn dispatch(&self, payload: &WebhookPayload) -> DispatchReport {
        let mut report = DispatchReport {
            object: payload.object.clone(),
            ..DispatchReport::default()
        };

        if !payload.is_page() {
            info!(
                "webhook received non-page object '{}' with {} entries, dropping",
                payload.object,
                payload.entry.len()
            );
            report.ignored = true;
            return report;
        }

        for entry in &payload.entry {
            debug!(
                "entry for page {} at {}: {} events",
                entry.id,
                entry.time,
                entry.messaging.len()
            );
            for event in &entry.messaging {
                let outcome = self.handle_event(event).await;
                report.outcomes.push(outcome);
            }
        }

        if report.failures().next().is_some() {
            warn!(
                "webhook delivery finished: {} sent, {} failed, {} events",
                report.sent(),
                report.failures().count(),
                report.outcomes.len()
            );
        } else {
            debug!(
                "webhook delivery finished: {} sent, {} events",
                report.sent(),
                report.outcomes.len()
            );
        }
        report
    }

    async fn handle_event(&self, event: &MessagingEvent) -> EventOutcome {
        let sender_id = event.sender.id.clone();

        let Some(classified) = event.classify() else {
            debug!("webhook received non-message event from {}", sender_id);
            return EventOutcome {
                sender_id,
                class: None,
                reply: None,
                status: DeliveryStatus::Skipped,
            };
        };
        let class = classified.class();

        let reply = match classified {
            Classified::Text(text) => {
                info!(
                    "received message from {}: {}",
                    sender_id,
                    truncate_for_log(text, 80)
                );
                match self.resolver.resolve(&sender_id, text).await {
                    Ok(reply) if !reply.trim().is_empty() => reply,
                    Ok(_) => {
                        error!("resolver returned an empty reply for {}", sender_id);
                        return EventOutcome {
                            sender_id,
                            class: Some(class),
                            reply: None,
                            status: DeliveryStatus::ResolveFailed("empty reply".into()),
                        };
                    }
                    Err(e) => {
                        error!("resolver failed for {}: {}", sender_id, e);
                        return EventOutcome {
                            sender_id,
                            class: Some(class),
                            reply: None,
                            status: DeliveryStatus::ResolveFailed(e.to_string()),
                        };
                    }
                }
            }
            Classified::Attachment | Classified::Unrecognized => {
                info!("received {} message from {}", class, sender_id);
                classified
                    .placeholder()
                    .unwrap_or_default()
                    .to_string()
            }
        };

        info!(
            "sending reply to {}: {}",
            sender_id,
            truncate_for_log(&reply, 80)
        );
        let status = match self.sender.send(&sender_id, &reply).await {
            Ok(()) => DeliveryStatus::Sent,
            Err(e) => {
                error!("failed to send reply to {}: {}", sender_id, e);
                DeliveryStatus::SendFailed(e.to_string())
            }
        };

        EventOutcome {
            sender_id,
            class: Some(class),
            reply: Some(reply),
            status,
        }
    }
}
