use crate::config::credentials::{CREDENTIAL_NAMES, detect_source};
use crate::config::{Config, get_config_path, load_config};
use crate::nlu::{ApiAiClient, NluClient, QueryResponse};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

pub(super) async fn serve(config: Config) -> Result<()> {
    info!(
        "starting chatrelay {} (graph {}, nlu v={})",
        crate::VERSION,
        config.messenger.graph_api_version,
        config.nlu.version
    );
    crate::relay::serve(&config).await
}

pub(super) async fn query(
    config: &Config,
    session: &str,
    utterances: &[String],
    json: bool,
) -> Result<()> {
    config.validate_nlu_credentials()?;
    let client = ApiAiClient::new(&config.nlu)?;
    let response = client
        .query(session, utterances)
        .await
        .with_context(|| format!("NLU query to {} failed", client.query_url()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_query_response(&response, &config.nlu.fallback_reply));
    }
    Ok(())
}

/// Human-readable summary of a query response.
pub(super) fn render_query_response(response: &QueryResponse, fallback: &str) -> String {
    let mut out = String::new();

    match response.speech() {
        Some(speech) => {
            let _ = writeln!(out, "{}", speech);
        }
        None => {
            let _ = writeln!(out, "{} (fallback, no speech returned)", fallback);
        }
    }

    if let Some(result) = response.result.as_ref() {
        if let Some(meta) = result.metadata.as_ref()
            && !meta.intent_name.is_empty()
        {
            let _ = writeln!(out, "intent: {}", meta.intent_name);
        }
        if !result.action.is_empty() {
            let _ = writeln!(out, "action: {}", result.action);
        }
    }

    let messages = response.messages();
    if !messages.is_empty() {
        let kinds: Vec<String> = messages.iter().map(|m| m.kind().to_string()).collect();
        let _ = writeln!(out, "messages: {} (types {})", messages.len(), kinds.join(", "));
    }

    if let Some(status) = response.status.as_ref() {
        let _ = write!(out, "status: {} {}", status.code, status.error_type);
        if !status.error_details.is_empty() {
            let _ = write!(out, " ({})", status.error_details);
        }
        out.push('\n');
    }
    out
}

pub(super) fn config_command(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };
    let config = load_config(Some(path.as_path()))?;

    println!(
        "Config: {} {}",
        path.display(),
        if path.exists() { "\u{2713}" } else { "(not found, using defaults)" }
    );
    println!(
        "Webhook: {}:{}{}",
        config.server.host, config.server.port, config.server.webhook_path
    );
    println!("Send API: {}", config.messenger.messages_url());
    println!(
        "NLU: {}/query?v={} (lang {})",
        config.nlu.base_url.trim_end_matches('/'),
        config.nlu.version,
        config.nlu.lang
    );
    println!("\nCredentials:");
    for (name, source) in credential_report(&config) {
        println!("  {:<18} {}", name, source);
    }
    println!("\n{:#?}", config);
    Ok(())
}

pub(super) fn credential_report(config: &Config) -> Vec<(&'static str, &'static str)> {
    CREDENTIAL_NAMES
        .iter()
        .map(|name| (*name, detect_source(name, config)))
        .collect()
}
