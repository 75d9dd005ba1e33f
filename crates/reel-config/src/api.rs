//! Render service endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

/// Per-request timeout for status checks, cancels, and history fetches.
const fn default_request_timeout_secs() -> u64 {
    10
}

/// Submission can take longer: the server validates and enqueues the job.
const fn default_submit_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("reel/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the render service (e.g., `https://render.example.com`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token issued by the credential service. Empty = unauthenticated.
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            submit_timeout_secs: default_submit_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Whether a bearer token is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }
}
