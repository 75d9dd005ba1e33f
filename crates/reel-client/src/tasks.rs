//! Generation task endpoints: submit, status, cancel.

use reel_core::ids::TaskId;
use reel_core::wire::{CancelAck, CancelRequest, StatusPayload, SubmitRequest, SubmitResponse};

use crate::{ApiClient, GENERATION_PATH, error::ClientError, http::check_response};

impl ApiClient {
    /// Submit a render job. Returns the server-assigned task id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails, times out, the service
    /// rejects it, or the response carries no task id.
    pub async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, ClientError> {
        let url = self.url(&format!("{GENERATION_PATH}/"));
        tracing::debug!(%url, format = %request.format, quality = %request.quality, "submitting generation");

        let builder = self.prepare(self.http.post(&url).json(request), self.submit_timeout);
        let resp = check_response(builder.send().await?).await?;
        let body = resp.text().await?;
        let submitted = parse_submit(&body)?;

        tracing::info!(task_id = %submitted.task_id, "generation submitted");
        Ok(submitted)
    }

    /// Fetch the current status of a task.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails, times out, the service
    /// returns a non-success status, or the body is not a status payload.
    pub async fn fetch_status(&self, task_id: &TaskId) -> Result<StatusPayload, ClientError> {
        let url = self.status_url(task_id);
        let builder = self.prepare(self.http.get(&url), self.request_timeout);
        let resp = check_response(builder.send().await?).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("status payload for {task_id}: {e}")))
    }

    /// Ask the service to revoke a task.
    ///
    /// Any 2xx response counts as an acknowledgement; the body is optional
    /// and parsed leniently.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails, times out, or the service
    /// returns a non-success status.
    pub async fn cancel(&self, task_id: &TaskId) -> Result<CancelAck, ClientError> {
        let url = self.url(&format!("{GENERATION_PATH}/cancel"));
        let request = CancelRequest {
            task_id: task_id.clone(),
        };
        let builder = self.prepare(self.http.post(&url).json(&request), self.request_timeout);
        let resp = check_response(builder.send().await?).await?;
        let body = resp.text().await.unwrap_or_default();

        tracing::info!(%task_id, "cancellation acknowledged");
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    fn status_url(&self, task_id: &TaskId) -> String {
        self.url(&format!(
            "{GENERATION_PATH}/result/{}",
            urlencoding::encode(task_id.as_str())
        ))
    }
}

fn parse_submit(body: &str) -> Result<SubmitResponse, ClientError> {
    serde_json::from_str(body)
        .map_err(|e| ClientError::Parse(format!("submit response has no task id: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_submit_accepts_both_spellings() {
        let camel = parse_submit(r#"{"taskId": "abc-123", "sessionId": "s1"}"#).unwrap();
        assert_eq!(camel.task_id.as_str(), "abc-123");
        assert_eq!(camel.session_id.as_ref().map(|s| s.as_str()), Some("s1"));

        let snake = parse_submit(r#"{"task_id": "abc-123"}"#).unwrap();
        assert_eq!(snake.task_id.as_str(), "abc-123");
        assert!(snake.session_id.is_none());
    }

    #[test]
    fn parse_submit_without_task_id_is_parse_error() {
        let err = parse_submit(r#"{"message": "queued"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn cancel_ack_tolerates_empty_body() {
        let ack: CancelAck = serde_json::from_str("").unwrap_or_default();
        assert_eq!(ack, CancelAck::default());

        let ack: CancelAck =
            serde_json::from_str(r#"{"message": "Task revoked"}"#).unwrap_or_default();
        assert_eq!(ack.message.as_deref(), Some("Task revoked"));
    }

    #[test]
    fn status_url_encodes_task_id() {
        let config = reel_config::ApiConfig {
            base_url: "https://render.example.com/".to_string(),
            ..reel_config::ApiConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.status_url(&TaskId::from("a b/c")),
            "https://render.example.com/api/manimGeneration/result/a%20b%2Fc"
        );
    }
}
