//! User-facing text written into assistant entries.

use reel_core::enums::TaskStatus;
use reel_core::wire::TaskResult;

pub const PLACEHOLDER: &str = "Generating your animation...";
pub const SUCCEEDED: &str = "Your animation is ready.";
pub const FAILED: &str = "Generation failed.";
pub const CANCELLED: &str = "Generation cancelled.";
pub const CANCELLED_LOCALLY: &str =
    "Stopped tracking locally; the job may still be running on the server.";
pub const CONNECTION_LOST: &str =
    "Connection lost while tracking the generation. Check your network and try again.";

#[must_use]
pub fn tracking_stopped(attempts: u32) -> String {
    format!("Still processing on the server; stopped tracking after {attempts} status checks.")
}

#[must_use]
pub fn submit_failed(error: &str) -> String {
    format!("Could not start the generation: {error}")
}

#[must_use]
pub fn watching(task_id: &str) -> String {
    format!("Tracking generation {task_id}...")
}

/// Content for a successful result: the server's description when present.
#[must_use]
pub fn succeeded(result: Option<&TaskResult>) -> String {
    result
        .and_then(|r| r.description.as_deref())
        .filter(|d| !d.trim().is_empty())
        .map_or_else(|| SUCCEEDED.to_string(), str::to_string)
}

/// Content for a failed or rejected task: the server reason verbatim.
#[must_use]
pub fn failed(result: Option<&TaskResult>) -> String {
    result
        .and_then(TaskResult::failure_reason)
        .map_or_else(|| FAILED.to_string(), str::to_string)
}

/// In-progress line, e.g. `Rendering video (40%)`.
#[must_use]
pub fn progress(status: TaskStatus, stage: Option<&str>, percent: Option<u8>) -> String {
    let label = stage.map_or_else(
        || match status {
            TaskStatus::Queued => "Queued".to_string(),
            _ => "Generating".to_string(),
        },
        str::to_string,
    );
    match percent {
        Some(p) => format!("{label} ({p}%)"),
        None => label,
    }
}
