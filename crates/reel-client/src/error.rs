//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the render service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error (connect failure, timeout, broken body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// `detail`/`message` from the error body, or the raw body.
        message: String,
    },

    /// The bearer token was missing, expired, or revoked.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The service returned a 429 Too Many Requests response.
    #[error("rate limited; retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to interpret a response body.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Whether the request timed out before a response arrived.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Whether retrying the same request later could plausibly succeed.
    ///
    /// Transport failures, timeouts, 5xx responses and rate limiting are
    /// transient. Auth failures, other 4xx responses and malformed bodies are
    /// not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder() && !e.is_decode(),
            Self::Api { status, .. } => *status >= 500,
            Self::RateLimited { .. } => true,
            Self::Unauthorized(_) | Self::Parse(_) => false,
        }
    }
}
