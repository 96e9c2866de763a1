// Shared test helpers — not all items used by every test binary.
#![allow(unused)]

use chatrelay::config::Config;
use chatrelay::relay::{build_app, serve_on};
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const VALIDATION_TOKEN: &str = "verify-me";
pub const PAGE_TOKEN: &str = "page-token";
pub const NLU_TOKEN: &str = "nlu-token";
pub const PAGE_ID: &str = "PAGE_ID";

/// Config wired to mock NLU and Graph API servers.
pub fn config_for(nlu: &MockServer, graph: &MockServer) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".into();
    config.messenger.validation_token = VALIDATION_TOKEN.into();
    config.messenger.page_access_token = PAGE_TOKEN.into();
    config.messenger.graph_api_base = graph.uri();
    config.nlu.access_token = NLU_TOKEN.into();
    config.nlu.base_url = nlu.uri();
    config
}

/// A relay listening on an ephemeral local port.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub path: String,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl RunningRelay {
    pub async fn start(config: &Config) -> Self {
        let app = build_app(config).expect("build app");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve_on(listener, app, async {
            stopped.await.ok();
        }));
        Self {
            addr,
            path: config.server.webhook_path.clone(),
            stop: Some(stop),
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, self.path)
    }

    pub async fn post(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.url())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("post webhook")
    }

    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await.expect("join").expect("serve");
    }
}

pub fn text_event(sender: &str, text: &str) -> Value {
    json!({
        "sender": {"id": sender},
        "recipient": {"id": PAGE_ID},
        "timestamp": 1_458_692_752_478_i64,
        "message": {"mid": format!("mid.{sender}.{text}"), "seq": 73, "text": text}
    })
}

pub fn attachment_event(sender: &str) -> Value {
    json!({
        "sender": {"id": sender},
        "recipient": {"id": PAGE_ID},
        "timestamp": 1_458_692_752_478_i64,
        "message": {
            "mid": "mid.att",
            "seq": 74,
            "attachments": [{"type": "image", "payload": {"url": "https://example.com/cat.png"}}]
        }
    })
}

pub fn page_payload(events: Vec<Value>) -> String {
    json!({
        "object": "page",
        "entry": [{"id": PAGE_ID, "time": 1_458_692_752_478_i64, "messaging": events}]
    })
    .to_string()
}

pub fn nlu_speech(speech: &str) -> Value {
    json!({
        "id": "3622be70-cb49-4796-a4fa-71f16f7b5600",
        "timestamp": "2016-03-23T00:00:00.000Z",
        "lang": "en",
        "result": {
            "source": "agent",
            "resolvedQuery": "hi",
            "action": "greet",
            "fulfillment": {"speech": speech, "messages": [{"type": 0, "speech": speech}]},
            "score": 1.0
        },
        "status": {"code": 200, "errorType": "success"},
        "sessionId": "USER_ID"
    })
}

/// Accepts every Send API call.
pub async fn mount_send_ok(graph: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2.6/me/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recipient_id": "USER_ID",
            "message_id": "mid.1"
        })))
        .mount(graph)
        .await;
}

/// `(recipient id, text)` for every Send API call the mock received, in order.
pub async fn sent_messages(graph: &MockServer) -> Vec<(String, String)> {
    graph
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().ends_with("/me/messages"))
        .map(|r: &Request| {
            let body: Value = serde_json::from_slice(&r.body).expect("send body is JSON");
            (
                body["recipient"]["id"].as_str().unwrap_or_default().to_string(),
                body["message"]["text"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
