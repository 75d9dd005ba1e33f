//! Cross-cutting error types for reel.
//!
//! Domain-specific errors (`ClientError`, `ConfigError`, `TrackerError`) live
//! in their respective crates. The `reel` binary converges them with `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any reel crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Server returned a status string that maps to no known task state.
    #[error("Unknown task status: {0}")]
    UnknownStatus(String),

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: task {id} from {from} to {to}")]
    InvalidTransition { id: String, from: String, to: String },

    /// Data failed validation (empty identifiers, malformed payloads).
    #[error("Validation error: {0}")]
    Validation(String),
}
