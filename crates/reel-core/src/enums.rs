//! Status enums, roles, and terminal outcomes for reel.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `TaskStatus` provides `allowed_next_states()` so the tracker can reject
//! regressions reported by the server.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Status of a remote render task.
///
/// ```text
/// queued → running → completed
///                  → failed
///                  → cancelled
/// ```
///
/// `queued` may skip straight to any terminal state. `cancelled` is usually
/// set locally; the server reports it only after honoring a revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Valid next states from the current state. Re-entering the same
    /// non-terminal state is not a transition and is always accepted.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Queued => &[Self::Running, Self::Completed, Self::Failed, Self::Cancelled],
            Self::Running => &[Self::Completed, Self::Failed, Self::Cancelled],
            Self::Completed | Self::Failed | Self::Cancelled => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    /// Parse a server status string.
    ///
    /// Accepts the service's own vocabulary as well as the raw Celery states
    /// the worker queue leaks through (`PENDING`, `PROGRESS`, `SUCCESS`, ...),
    /// case-insensitively.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" | "received" | "retry" => Ok(Self::Queued),
            "running" | "started" | "progress" | "in_progress" => Ok(Self::Running),
            "completed" | "success" => Ok(Self::Completed),
            "failed" | "failure" | "error" => Ok(Self::Failed),
            "cancelled" | "canceled" | "revoked" => Ok(Self::Cancelled),
            _ => Err(CoreError::UnknownStatus(raw.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Author of a conversation log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TerminalOutcome
// ---------------------------------------------------------------------------

/// How a tracked generation ended, from the client's point of view.
///
/// `Rejected` is a `completed` task whose result carries `success: false`
/// (the job ran but produced nothing usable, e.g. an infeasible query);
/// `Failed` is a task the server reports as `failed` outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TerminalOutcome {
    Succeeded,
    Rejected,
    Failed,
    Cancelled,
    CancelledLocally,
    ConnectionLost,
    TrackingStopped,
    SubmitFailed,
}

impl TerminalOutcome {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Whether the outcome was decided by the server rather than by the client.
    #[must_use]
    pub const fn is_server_reported(self) -> bool {
        matches!(self, Self::Succeeded | Self::Rejected | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::CancelledLocally => "cancelled_locally",
            Self::ConnectionLost => "connection_lost",
            Self::TrackingStopped => "tracking_stopped",
            Self::SubmitFailed => "submit_failed",
        }
    }
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
