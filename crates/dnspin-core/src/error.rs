//! Error types shared across the dnspin crates.

use thiserror::Error;

/// Result type alias for dnspin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing or malformed settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Public-address lookup errors
    #[error("IP source error: {0}")]
    IpSource(String),

    /// HTTP transport errors from either external service
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON decode errors from provider responses
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential rejected by the provider (401/403)
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Provider asked us to slow down (429)
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Error reported by the provider itself
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-reported error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
