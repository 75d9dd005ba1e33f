//! Shared HTTP response helpers.
//!
//! Centralizes status-code checks (401 → [`ClientError::Unauthorized`], 429
//! with `Retry-After` parsing, non-success → [`ClientError::Api`]) so the
//! endpoint modules stay focused on request construction and response mapping.

use crate::error::ClientError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **401 Unauthorized** → [`ClientError::Unauthorized`].
/// - **429 Too Many Requests** → [`ClientError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`ClientError::Api`] with status code and the
///   error message extracted from the body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status() == 401 {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Unauthorized(error_message(&body, 401)));
    }
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(ClientError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status,
            message: error_message(&body, status),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// Pull a human-readable message out of an error body.
///
/// The service answers errors with `{"detail": ...}` (FastAPI) or
/// `{"message": ...}`; anything else is returned as-is, and an empty body
/// becomes `HTTP <status>`.
pub(crate) fn error_message(body: &str, status: u16) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        v.get("detail")
            .or_else(|| v.get("message"))
            .and_then(serde_json::Value::as_str)
    });
    match field {
        Some(message) => message.to_string(),
        None if body.trim().is_empty() => format!("HTTP {status}"),
        None => body.trim().to_string(),
    }
}
