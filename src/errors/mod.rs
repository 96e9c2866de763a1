use thiserror::Error;

/// Typed error hierarchy for chatrelay.
///
/// Use at module boundaries (NLU queries, outbound sends, config validation).
/// Internal/leaf functions can continue using `anyhow::Result` — the `Internal` variant
/// allows seamless conversion via the `?` operator.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode body: {0}")]
    Decode(#[source] serde_json::Error),

    /// For `TextResolver` implementations that cannot produce a reply.
    /// The router records it per event and moves on.
    #[error("Resolver error: {0}")]
    Resolve(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using `RelayError`.
pub type RelayResult<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Whether the underlying transport gave up because the client timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Whether a caller could reasonably try the same operation again.
    ///
    /// Nothing in the relay retries; this only feeds log levels.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Config(_)
            | Self::InvalidQuery(_)
            | Self::Encode(_)
            | Self::Decode(_)
            | Self::Resolve(_)
            | Self::Internal(_) => false,
        }
    }
}
