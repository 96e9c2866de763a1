use serde::{Deserialize, Serialize};

/// Generate a `Debug` impl that redacts sensitive fields.
///
/// Usage:
/// ```ignore
/// redact_debug!(MyStruct, normal_field, redact(secret_field));
/// ```
///
/// Fields wrapped in `redact(...)` print `"[REDACTED]"` when non-empty,
/// `"[empty]"` when empty. All other fields use their normal `Debug` output.
macro_rules! redact_debug {
    // Internal: emit a single .field() call
    (@field $builder:ident, $self:ident, redact($field:ident)) => {
        $builder.field(
            stringify!($field),
            &if $self.$field.is_empty() {
                "[empty]"
            } else {
                "[REDACTED]"
            },
        );
    };
    (@field $builder:ident, $self:ident, $field:ident) => {
        $builder.field(stringify!($field), &$self.$field);
    };

    // Internal: recursive TT muncher
    (@fields $builder:ident, $self:ident,) => {};
    (@fields $builder:ident, $self:ident, redact($field:ident), $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, redact($field));
        redact_debug!(@fields $builder, $self, $($rest)*);
    };
    (@fields $builder:ident, $self:ident, $field:ident, $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, $field);
        redact_debug!(@fields $builder, $self, $($rest)*);
    };

    // Entry point
    ($struct_name:ident, $($fields:tt)*) => {
        impl std::fmt::Debug for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut builder = f.debug_struct(stringify!($struct_name));
                redact_debug!(@fields builder, self, $($fields)*);
                builder.finish()
            }
        }
    };
}

/// Reply sent when the NLU backend cannot produce a usable answer.
pub const DEFAULT_FALLBACK_REPLY: &str = "Sorry! I cannot understand what you said.";

/// Upper bound for any client timeout, in seconds.
const MAX_TIMEOUT_SECS: u64 = 300;

fn default_timeout_secs() -> u64 {
    20
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_webhook_path", rename = "webhookPath")]
    pub webhook_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_path: default_webhook_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Messenger (Graph API)
// ---------------------------------------------------------------------------

fn default_graph_api_version() -> String {
    "v2.6".to_string()
}

fn default_graph_api_base() -> String {
    "https://graph.facebook.com".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MessengerConfig {
    /// Shared secret echoed back by the platform during the subscription handshake.
    #[serde(default, rename = "validationToken")]
    pub validation_token: String,
    #[serde(default, rename = "pageAccessToken")]
    pub page_access_token: String,
    /// App secret for `X-Hub-Signature-256` checks on event deliveries.
    /// Empty disables the check.
    #[serde(default, rename = "appSecret")]
    pub app_secret: String,
    #[serde(default = "default_graph_api_version", rename = "graphApiVersion")]
    pub graph_api_version: String,
    #[serde(default = "default_graph_api_base", rename = "graphApiBase")]
    pub graph_api_base: String,
    #[serde(default = "default_timeout_secs", rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            validation_token: String::new(),
            page_access_token: String::new(),
            app_secret: String::new(),
            graph_api_version: default_graph_api_version(),
            graph_api_base: default_graph_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

redact_debug!(
    MessengerConfig,
    redact(validation_token),
    redact(page_access_token),
    redact(app_secret),
    graph_api_version,
    graph_api_base,
    timeout_secs,
);

impl MessengerConfig {
    /// Send-message endpoint without the access token query parameter.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/me/messages",
            self.graph_api_base.trim_end_matches('/'),
            self.graph_api_version
        )
    }
}

// ---------------------------------------------------------------------------
// NLU backend
// ---------------------------------------------------------------------------

fn default_nlu_version() -> String {
    "20150910".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_nlu_base_url() -> String {
    "https://api.api.ai/v1".to_string()
}

fn default_fallback_reply() -> String {
    DEFAULT_FALLBACK_REPLY.to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct NluConfig {
    #[serde(default, rename = "accessToken")]
    pub access_token: String,
    /// Protocol version sent as the `v` query parameter.
    #[serde(default = "default_nlu_version")]
    pub version: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_nlu_base_url", rename = "baseUrl")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs", rename = "timeoutSecs")]
    pub timeout_secs: u64,
    #[serde(default = "default_fallback_reply", rename = "fallbackReply")]
    pub fallback_reply: String,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            version: default_nlu_version(),
            lang: default_lang(),
            base_url: default_nlu_base_url(),
            timeout_secs: default_timeout_secs(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

redact_debug!(
    NluConfig,
    redact(access_token),
    version,
    lang,
    base_url,
    timeout_secs,
    fallback_reply,
);

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub messenger: MessengerConfig,
    #[serde(default)]
    pub nlu: NluConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), crate::errors::RelayError> {
        self.validate_server()?;
        self.validate_messenger()?;
        self.validate_nlu()?;
        Ok(())
    }

    /// Checks on top of [`Config::validate`] that only matter when the
    /// webhook server is about to start.
    pub fn validate_for_serve(&self) -> Result<(), crate::errors::RelayError> {
        use crate::errors::RelayError;

        self.validate()?;
        if self.messenger.validation_token.is_empty() {
            return Err(RelayError::Config(
                "messenger.validationToken is required to serve the webhook".into(),
            ));
        }
        if self.messenger.page_access_token.is_empty() {
            return Err(RelayError::Config(
                "messenger.pageAccessToken is required to send replies".into(),
            ));
        }
        self.validate_nlu_credentials()
    }

    /// The NLU token is the only credential a one-shot query needs.
    pub fn validate_nlu_credentials(&self) -> Result<(), crate::errors::RelayError> {
        if self.nlu.access_token.is_empty() {
            return Err(crate::errors::RelayError::Config(
                "nlu.accessToken is required to query the NLU backend".into(),
            ));
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), crate::errors::RelayError> {
        use crate::errors::RelayError;
        let s = &self.server;

        if s.port == 0 {
            return Err(RelayError::Config("server.port must be > 0".into()));
        }
        if s.host.trim().is_empty() {
            return Err(RelayError::Config("server.host must not be empty".into()));
        }
        if !s.webhook_path.starts_with('/') {
            return Err(RelayError::Config(format!(
                "server.webhookPath must start with '/', got '{}'",
                s.webhook_path
            )));
        }
        if s.webhook_path.contains([':', '*', '{', '}']) {
            return Err(RelayError::Config(format!(
                "server.webhookPath must be a literal path without ':', '*', '{{' or '}}', got '{}'",
                s.webhook_path
            )));
        }
        Ok(())
    }

    fn validate_messenger(&self) -> Result<(), crate::errors::RelayError> {
        use crate::errors::RelayError;
        let m = &self.messenger;

        if m.graph_api_version.trim().is_empty() {
            return Err(RelayError::Config(
                "messenger.graphApiVersion must not be empty".into(),
            ));
        }
        validate_base_url("messenger.graphApiBase", &m.graph_api_base)?;
        validate_timeout("messenger.timeoutSecs", m.timeout_secs)
    }

    fn validate_nlu(&self) -> Result<(), crate::errors::RelayError> {
        use crate::errors::RelayError;
        let n = &self.nlu;

        if n.version.trim().is_empty() {
            return Err(RelayError::Config("nlu.version must not be empty".into()));
        }
        if n.lang.trim().is_empty() {
            return Err(RelayError::Config("nlu.lang must not be empty".into()));
        }
        if n.fallback_reply.trim().is_empty() {
            return Err(RelayError::Config(
                "nlu.fallbackReply must not be empty".into(),
            ));
        }
        validate_base_url("nlu.baseUrl", &n.base_url)?;
        validate_timeout("nlu.timeoutSecs", n.timeout_secs)
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<(), crate::errors::RelayError> {
    use crate::errors::RelayError;

    let parsed = url::Url::parse(value)
        .map_err(|e| RelayError::Config(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RelayError::Config(format!(
            "{field} must use http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(())
}

fn validate_timeout(field: &str, secs: u64) -> Result<(), crate::errors::RelayError> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(crate::errors::RelayError::Config(format!(
            "{field} must be between 1 and {MAX_TIMEOUT_SECS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
