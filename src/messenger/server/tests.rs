use super::*;
use crate::errors::RelayResult;
use crate::messenger::router::TextResolver;
use crate::messenger::send::MessageSender;
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::Request;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Mutex;
use tower::ServiceExt;

struct FixedResolver;

#[async_trait]
impl TextResolver for FixedResolver {
    async fn resolve(&self, _sender_id: &str, text: &str) -> RelayResult<String> {
        Ok(format!("re: {text}"))
    }
}

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, recipient_id: &str, text: &str) -> RelayResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient_id.to_string(), text.to_string()));
        Ok(())
    }
}

fn app(app_secret: &str) -> (Router, Arc<RecordingSender>) {
    let sender = Arc::new(RecordingSender::default());
    let router = Arc::new(EventRouter::new(Arc::new(FixedResolver), sender.clone()));
    let state = WebhookState::new(router, "verify-me", app_secret);
    (build_router(state, "/webhook"), sender)
}

const TEXT_PAYLOAD: &str = r#"{"object":"page","entry":[{"id":"P","time":1,"messaging":[
    {"sender":{"id":"U1"},"recipient":{"id":"P"},"timestamp":1,"message":{"mid":"m1","seq":1,"text":"hi"}}
]}]}"#;

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

async fn body_string(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_get_handshake_echoes_challenge() {
    let (app, _) = app("");
    let resp = app
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=1158201444")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "1158201444");
}

#[tokio::test]
async fn test_get_handshake_wrong_token_forbidden() {
    let (app, _) = app("");
    let resp = app
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_string(resp).await.is_empty());
}

#[tokio::test]
async fn test_get_without_params_forbidden() {
    let (app, _) = app("");
    let resp = app
        .oneshot(Request::get("/webhook").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_post_dispatches_and_acknowledges() {
    let (app, sender) = app("");
    let resp = app
        .oneshot(
            Request::post("/webhook")
                .header("Content-Type", "application/json")
                .body(Body::from(TEXT_PAYLOAD))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        *sender.sent.lock().unwrap(),
        vec![("U1".to_string(), "re: hi".to_string())]
    );
}

#[tokio::test]
async fn test_post_malformed_json_is_bad_request() {
    let (app, sender) = app("");
    let resp = app
        .oneshot(
            Request::post("/webhook")
                .body(Body::from("not json at all"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_non_page_object_still_acknowledged() {
    let (app, sender) = app("");
    let resp = app
        .oneshot(
            Request::post("/webhook")
                .body(Body::from(r#"{"object":"user","entry":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_other_methods_are_bad_request() {
    for method in [Method::HEAD, Method::PUT, Method::DELETE, Method::PATCH] {
        let (app, _) = app("");
        let resp = app
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri("/webhook")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "method {method}");
    }
}

#[tokio::test]
async fn test_head_with_valid_handshake_is_bad_request() {
    let (app, _) = app("");
    let resp = app
        .oneshot(
            Request::head("/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signed_post_accepted_when_secret_configured() {
    let (app, sender) = app("app-secret");
    let resp = app
        .oneshot(
            Request::post("/webhook")
                .header(SIGNATURE_HEADER, sign("app-secret", TEXT_PAYLOAD.as_bytes()))
                .body(Body::from(TEXT_PAYLOAD))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(sender.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unsigned_post_rejected_when_secret_configured() {
    let (app, sender) = app("app-secret");
    let resp = app
        .oneshot(
            Request::post("/webhook")
                .body(Body::from(TEXT_PAYLOAD))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_signature_rejected() {
    let (app, sender) = app("app-secret");
    let resp = app
        .oneshot(
            Request::post("/webhook")
                .header(SIGNATURE_HEADER, sign("other-secret", TEXT_PAYLOAD.as_bytes()))
                .body(Body::from(TEXT_PAYLOAD))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_path_not_found() {
    let (app, _) = app("");
    let resp = app
        .oneshot(Request::get("/elsewhere").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
