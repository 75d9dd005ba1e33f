//! Wire types exchanged with the render service.
//!
//! Field names follow the service's camelCase JSON. Aliases accept the
//! snake_case and legacy spellings the backend still emits in places
//! (`task_id`, `historyId`, `current_stage`, `_id`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::enums::TaskStatus;
use crate::errors::CoreError;
use crate::ids::{SessionId, TaskId};

// ── Submit ─────────────────────────────────────────────────────────

/// Body of `POST /api/manimGeneration/`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub query: String,
    pub format: String,
    pub quality: String,
    pub resolution: String,
    /// Session to append the result to. `None` starts a new session.
    pub session_id: Option<SessionId>,
}

/// Response to a submission: the server-assigned task id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(alias = "task_id")]
    pub task_id: TaskId,
    #[serde(default, alias = "session_id", alias = "historyId")]
    pub session_id: Option<SessionId>,
}

// ── Poll ───────────────────────────────────────────────────────────

/// Response of `GET /api/manimGeneration/result/{taskId}`.
///
/// `status` is kept raw; use [`StatusPayload::task_status`] to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default, alias = "current_stage")]
    pub stage: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, alias = "queue_position")]
    pub queue_position: Option<u32>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

impl StatusPayload {
    /// Build a payload for the given status with no optional fields.
    #[must_use]
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
            progress: None,
            stage: None,
            details: None,
            queue_position: None,
            result: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: TaskResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Interpret the raw status string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownStatus`] for strings outside the known
    /// vocabulary.
    pub fn task_status(&self) -> Result<TaskStatus, CoreError> {
        TaskStatus::from_str(&self.status)
    }

    /// Progress as a whole percentage, clamped to `0..=100`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> Option<u8> {
        self.progress
            .filter(|p| p.is_finite())
            .map(|p| p.round().clamp(0.0, 100.0) as u8)
    }

    /// Human-readable stage hint: the stage label, else the queue position.
    #[must_use]
    pub fn stage_hint(&self) -> Option<String> {
        match (&self.stage, self.queue_position) {
            (Some(stage), _) if !stage.trim().is_empty() => Some(stage.clone()),
            (_, Some(position)) => Some(format!("Queued (position {position})")),
            _ => None,
        }
    }
}

/// Result attached to a `completed` task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, alias = "historyId", alias = "session_id")]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "chat_name")]
    pub chat_name: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskResult {
    /// A successful result pointing at a rendered artifact.
    #[must_use]
    pub fn success(link: impl Into<String>) -> Self {
        Self {
            success: true,
            link: Some(link.into()),
            ..Self::default()
        }
    }

    /// A completed-but-unsuccessful result with a reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Server-supplied failure reason: `reason`, falling back to `error`.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        let non_empty = |r: &&str| !r.trim().is_empty();
        self.reason
            .as_deref()
            .filter(non_empty)
            .or_else(|| self.error.as_deref().filter(non_empty))
    }
}

// ── Cancel ─────────────────────────────────────────────────────────

/// Body of `POST /api/manimGeneration/cancel`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub task_id: TaskId,
}

/// Acknowledgement of a revocation. Any 2xx response counts as acknowledged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CancelAck {
    #[serde(default)]
    pub message: Option<String>,
}

// ── History ────────────────────────────────────────────────────────

/// One page of `GET /api/user/userHistory`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HistoryPage {
    #[serde(default)]
    pub data: Vec<SessionSummary>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl HistoryPage {
    /// An empty listing, as returned for users with no sessions.
    #[must_use]
    pub const fn empty(page: u32) -> Self {
        Self {
            data: Vec::new(),
            page,
            pages: 0,
            total: 0,
            limit: None,
        }
    }

    /// `total == 0` means the user has no history at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.pages
    }

    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        if self.has_more() { Some(self.page + 1) } else { None }
    }
}

/// A stored session: a named chat of completed render messages.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: SessionId,
    #[serde(default, alias = "chat_name")]
    pub chat_name: Option<String>,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
    /// Raw server timestamp; the backend does not guarantee an offset.
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

impl SessionSummary {
    /// Most recent message, used for list previews.
    #[must_use]
    pub fn latest_message(&self) -> Option<&HistoryMessage> {
        self.messages.last()
    }
}

/// One completed query/result pair stored in a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    #[serde(alias = "user_query")]
    pub user_query: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_response_accepts_snake_case() {
        let resp: SubmitResponse = serde_json::from_str(r#"{"task_id": "abc"}"#).unwrap();
        assert_eq!(resp.task_id.as_str(), "abc");
        assert!(resp.session_id.is_none());
    }

    #[test]
    fn status_payload_reads_celery_meta() {
        let payload: StatusPayload = serde_json::from_str(
            r#"{"status": "PROGRESS", "progress": 30, "current_stage": "Generating Description"}"#,
        )
        .unwrap();
        assert_eq!(payload.task_status().unwrap(), TaskStatus::Running);
        assert_eq!(payload.progress_percent(), Some(30));
        assert_eq!(payload.stage_hint().as_deref(), Some("Generating Description"));
    }

    #[test]
    fn progress_is_clamped() {
        let payload = StatusPayload::new(TaskStatus::Running).with_progress(140.2);
        assert_eq!(payload.progress_percent(), Some(100));
        let payload = StatusPayload::new(TaskStatus::Running).with_progress(-3.0);
        assert_eq!(payload.progress_percent(), Some(0));
        let payload = StatusPayload::new(TaskStatus::Running).with_progress(f64::NAN);
        assert_eq!(payload.progress_percent(), None);
    }

    #[test]
    fn queue_position_becomes_stage_hint() {
        let mut payload = StatusPayload::new(TaskStatus::Queued);
        payload.queue_position = Some(4);
        assert_eq!(payload.stage_hint().as_deref(), Some("Queued (position 4)"));
    }

    #[test]
    fn result_reads_history_id_alias() {
        let result: TaskResult = serde_json::from_str(
            r#"{"success": true, "link": "a.mp4", "historyId": "66b0", "chat_name": "Circles"}"#,
        )
        .unwrap();
        assert_eq!(result.session_id.as_ref().map(SessionId::as_str), Some("66b0"));
        assert_eq!(result.chat_name.as_deref(), Some("Circles"));
    }

    #[test]
    fn failure_reason_falls_back_to_error() {
        let result: TaskResult =
            serde_json::from_str(r#"{"success": false, "error": "render crashed"}"#).unwrap();
        assert_eq!(result.failure_reason(), Some("render crashed"));
        assert_eq!(TaskResult::default().failure_reason(), None);
    }

    #[test]
    fn blank_reason_defers_to_error() {
        let result: TaskResult = serde_json::from_str(
            r#"{"success": false, "reason": "  ", "error": "render crashed"}"#,
        )
        .unwrap();
        assert_eq!(result.failure_reason(), Some("render crashed"));
    }

    #[test]
    fn history_page_pagination() {
        let page: HistoryPage = serde_json::from_str(
            r#"{"page": 1, "pages": 3, "total": 11, "limit": 5,
                "data": [{"_id": "s1", "chatName": "Sine waves", "messages": [
                    {"userQuery": "draw a sine wave", "link": "s.mp4"}]}]}"#,
        )
        .unwrap();
        assert!(!page.is_empty());
        assert_eq!(page.next_page(), Some(2));
        assert_eq!(page.data[0].id.as_str(), "s1");
        assert_eq!(
            page.data[0].latest_message().and_then(|m| m.link.as_deref()),
            Some("s.mp4")
        );
        assert!(HistoryPage::empty(1).is_empty());
        assert_eq!(HistoryPage::empty(1).next_page(), None);
    }
}
