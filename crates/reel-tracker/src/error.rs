use reel_client::ClientError;
use reel_core::errors::CoreError;
use reel_core::ids::{SessionId, TaskId};

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A second submission while a generation is still being tracked.
    #[error("a generation is already being tracked")]
    Busy,

    /// The caller gave up before the server assigned a task id.
    #[error("submission abandoned before the server answered")]
    Abandoned,

    /// The log already holds an entry for this task.
    #[error("task {0} is already in the log")]
    AlreadyTracked(TaskId),

    #[error("no task is being tracked")]
    NotTracking,

    #[error("session {0} not found in history")]
    SessionNotFound(SessionId),

    /// A confirmation arrived for a submission the log no longer knows about.
    #[error("submission {0} is no longer pending")]
    StaleSubmission(String),
}
