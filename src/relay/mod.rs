use crate::config::Config;
use crate::errors::RelayResult;
use crate::messenger::router::{EventRouter, TextResolver};
use crate::messenger::send::{GraphApiSender, MessageSender};
use crate::messenger::server::{WebhookState, build_router};
use crate::nlu::{ApiAiClient, NluClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Resolves user text through an NLU backend.
///
/// The sender id doubles as the NLU session id, so each user keeps their own
/// conversational context. Any backend failure degrades to the fallback reply.
pub struct NluResolver {
    client: Arc<dyn NluClient>,
    fallback: String,
}

impl NluResolver {
    pub fn new(client: Arc<dyn NluClient>, fallback: impl Into<String>) -> Self {
        Self {
            client,
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Always yields something to send back.
    pub async fn reply_for(&self, session_id: &str, text: &str) -> String {
        let response = match self.client.query(session_id, &[text.to_string()]).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    warn!("nlu query for {} timed out, using fallback", session_id);
                } else if e.is_retryable() {
                    warn!("nlu query for {} failed: {}", session_id, e);
                } else {
                    error!("nlu query for {} failed: {}", session_id, e);
                }
                return self.fallback.clone();
            }
        };

        if let Some(status) = response.backend_error() {
            warn!(
                "nlu backend error for {}: {} {} {}",
                session_id, status.code, status.error_type, status.error_details
            );
        } else if let Some(status) = response.status.as_ref()
            && status.is_degraded()
        {
            info!(
                "nlu answered {} for {} with {}",
                status.code, session_id, status.error_type
            );
        }

        match response.speech() {
            Some(speech) => speech.to_string(),
            None => {
                info!("nlu returned no speech for {}, using fallback", session_id);
                self.fallback.clone()
            }
        }
    }
}

#[async_trait]
impl TextResolver for NluResolver {
    async fn resolve(&self, sender_id: &str, text: &str) -> RelayResult<String> {
        Ok(self.reply_for(sender_id, text).await)
    }
}

/// Assemble the webhook app from explicit collaborators.
pub fn build_app_with(
    config: &Config,
    nlu: Arc<dyn NluClient>,
    sender: Arc<dyn MessageSender>,
) -> Router {
    let resolver = Arc::new(NluResolver::new(nlu, config.nlu.fallback_reply.clone()));
    let router = Arc::new(EventRouter::new(resolver, sender));
    let state = WebhookState::new(
        router,
        &config.messenger.validation_token,
        &config.messenger.app_secret,
    );
    build_router(state, &config.server.webhook_path)
}

/// Assemble the webhook app with the production NLU client and Send API sender.
pub fn build_app(config: &Config) -> RelayResult<Router> {
    let nlu = Arc::new(ApiAiClient::new(&config.nlu)?);
    let sender = Arc::new(GraphApiSender::new(&config.messenger)?);
    if config.messenger.app_secret.is_empty() {
        info!("no app secret configured, webhook payload signatures are not checked");
    }
    Ok(build_app_with(config, nlu, sender))
}

/// Serve `app` on an already-bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("webhook server error")
}

/// Validate the config, bind the configured address and serve until ctrl-c.
pub async fn serve(config: &Config) -> Result<()> {
    config.validate_for_serve()?;
    let app = build_app(config)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(
        "webhook listening on {}{}",
        addr, config.server.webhook_path
    );

    serve_on(listener, app, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
        info!("shutting down webhook server");
    })
    .await
}
