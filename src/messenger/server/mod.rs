//! Webhook HTTP surface.
//!
//! `GET` answers the subscription handshake, `POST` delivers events to the
//! [`EventRouter`], any other method (`HEAD` included) gets a 400.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{debug, error, info, warn};

use crate::errors::RelayError;
use crate::messenger::router::EventRouter;
use crate::messenger::verify::{SIGNATURE_HEADER, validate_payload_signature, verify_subscription};

/// Shared, immutable state for the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    router: Arc<EventRouter>,
    validation_token: Arc<str>,
    app_secret: Arc<str>,
}

impl WebhookState {
    /// `app_secret` may be empty, which turns off payload signature checks.
    pub fn new(router: Arc<EventRouter>, validation_token: &str, app_secret: &str) -> Self {
        Self {
            router,
            validation_token: Arc::from(validation_token),
            app_secret: Arc::from(app_secret),
        }
    }
}

/// Build the webhook router mounted at `path`.
pub fn build_router(state: WebhookState, path: &str) -> Router {
    Router::new()
        .route(
            path,
            get(verify_handler)
                .post(receive_handler)
                .fallback(unsupported_method_handler),
        )
        .with_state(state)
}

/// GET — subscription handshake. The `get` route also matches `HEAD`.
async fn verify_handler(
    method: Method,
    State(state): State<WebhookState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if method != Method::GET {
        return unsupported_method_handler(method).await.into_response();
    }

    match verify_subscription(&params, &state.validation_token) {
        Some(challenge) => {
            info!("validating webhook subscription");
            (StatusCode::OK, challenge.to_string()).into_response()
        }
        None => {
            warn!("failed webhook validation, make sure the validation tokens match");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// POST — event delivery. Always acknowledged with 200 once the body decodes,
/// whatever happened to individual events.
async fn receive_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            error!("failed to read webhook body: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !state.app_secret.is_empty() {
        let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
            warn!("webhook delivery missing {} header", SIGNATURE_HEADER);
            return StatusCode::FORBIDDEN.into_response();
        };
        if !validate_payload_signature(&state.app_secret, signature, &body) {
            warn!("webhook delivery has an invalid signature");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    match state.router.handle_body(&body).await {
        Ok(report) => {
            debug!(
                "webhook delivery acknowledged: object={}, events={}, sent={}",
                report.object,
                report.outcomes.len(),
                report.sent()
            );
            StatusCode::OK.into_response()
        }
        Err(RelayError::Decode(e)) => {
            warn!("could not decode webhook body as JSON: {}", e);
            StatusCode::BAD_REQUEST.into_response()
        }
        Err(e) => {
            error!("webhook delivery failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn unsupported_method_handler(method: Method) -> StatusCode {
    warn!("unsupported HTTP method {} on webhook", method);
    StatusCode::BAD_REQUEST
}

#[cfg(test)]
mod tests;
