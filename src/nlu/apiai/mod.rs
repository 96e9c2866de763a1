use super::NluClient;
use super::models::{QueryRequest, QueryResponse};
use crate::config::NluConfig;
use crate::errors::{RelayError, RelayResult};
use crate::utils::http::build_http_client;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};

/// Client for the API.AI-style `POST /query?v=<version>` endpoint.
pub struct ApiAiClient {
    client: Client,
    base_url: String,
    access_token: String,
    version: String,
    lang: String,
}

impl ApiAiClient {
    pub fn new(config: &NluConfig) -> RelayResult<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            version: config.version.clone(),
            lang: config.lang.clone(),
        })
    }

    pub fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }

    /// Build a text query, enforcing the session and utterance constraints.
    pub fn build_request(&self, session_id: &str, utterances: &[String]) -> RelayResult<QueryRequest> {
        if session_id.trim().is_empty() {
            return Err(RelayError::InvalidQuery("session id is empty".into()));
        }
        if !utterances.iter().any(|u| !u.trim().is_empty()) {
            return Err(RelayError::InvalidQuery(
                "at least one non-empty utterance is required".into(),
            ));
        }
        Ok(QueryRequest::text(session_id, utterances).with_lang(self.lang.clone()))
    }

    /// Send a fully built request. An empty `lang` falls back to the configured default.
    ///
    /// The HTTP status is not inspected: error responses carry a `status` block
    /// that callers read from the decoded body.
    pub async fn execute(&self, mut request: QueryRequest) -> RelayResult<QueryResponse> {
        if request.lang.is_empty() {
            request.lang.clone_from(&self.lang);
        }

        let body = serde_json::to_vec(&request).map_err(RelayError::Encode)?;

        debug!(
            "nlu query: session={}, utterances={}, lang={}",
            request.session_id,
            request.query.len(),
            request.lang
        );

        let resp = self
            .client
            .post(self.query_url())
            .query(&[("v", self.version.as_str())])
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            warn!("nlu backend answered HTTP {}, decoding body anyway", status);
        }

        serde_json::from_slice::<QueryResponse>(&bytes).map_err(RelayError::Decode)
    }
}

#[async_trait]
impl NluClient for ApiAiClient {
    async fn query(&self, session_id: &str, utterances: &[String]) -> RelayResult<QueryResponse> {
        let request = self.build_request(session_id, utterances)?;
        self.execute(request).await
    }
}
