//! # reel-client
//!
//! HTTP client for the reel render service.
//!
//! Covers the three task operations the tracker depends on plus the
//! paginated history listing:
//! - `POST /api/manimGeneration/` (submit)
//! - `GET /api/manimGeneration/result/{taskId}` (status)
//! - `POST /api/manimGeneration/cancel` (revoke)
//! - `GET /api/user/userHistory?page&limit` (sessions)
//!
//! Every request carries `Authorization: Bearer <token>` when a token is
//! configured. Status checks and cancels use the short request timeout;
//! submissions use the longer submit timeout.

mod error;
mod history;
mod http;
mod tasks;

pub use error::ClientError;

use reel_config::ApiConfig;
use std::time::Duration;

/// Path prefix of the generation endpoints.
pub const GENERATION_PATH: &str = "/api/manimGeneration";

/// Path of the history listing endpoint.
pub const HISTORY_PATH: &str = "/api/user/userHistory";

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the render service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    request_timeout: Duration,
    submit_timeout: Duration,
}

impl ApiClient {
    /// Create a client from the `[api]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// fails to build (e.g., the TLS backend cannot initialize).
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            access_token: config
                .is_configured()
                .then(|| config.access_token.clone()),
            request_timeout: config.request_timeout(),
            submit_timeout: config.submit_timeout(),
        })
    }

    /// Replace the bearer token, e.g. after the credential store refreshed it.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.access_token = (!token.is_empty()).then_some(token);
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token, if any, and a per-request timeout.
    fn prepare(&self, builder: reqwest::RequestBuilder, timeout: Duration) -> reqwest::RequestBuilder {
        let builder = builder.timeout(timeout);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
