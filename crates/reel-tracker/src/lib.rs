//! # reel-tracker
//!
//! Tracks a remote render job from submission to a terminal state by
//! polling its status.
//!
//! - [`PollingScheduler`] and [`BackoffPolicy`] decide when to check again
//!   and when to give up.
//! - [`TaskStateMachine`] interprets status payloads; terminal is sticky.
//! - [`CancellationController`] records local cancellation before any
//!   network call.
//! - [`MessageLog`] holds the conversation; the entry linked to the active
//!   task is patched in place, one patch per applied status.
//! - [`HistorySynchronizer`] follows the server-side session that
//!   submissions append to.
//!
//! [`TaskEngine`] ties these together synchronously; [`Tracker`] drives it
//! against a [`TaskApi`] on tokio.

mod api;
mod backoff;
mod cancel;
mod engine;
mod error;
mod history;
mod log;
pub mod notices;
mod scheduler;
mod state;
mod tracker;

pub use api::TaskApi;
pub use backoff::BackoffPolicy;
pub use cancel::CancellationController;
pub use engine::{PendingSubmission, PollOutcome, RenderOptions, TaskEngine};
pub use error::TrackerError;
pub use history::{HistoryListing, HistorySynchronizer};
pub use log::{EntryPatch, MessageLog};
pub use scheduler::{PollTicket, PollingScheduler, SchedulerStep};
pub use state::{TaskStateMachine, Transition};
pub use tracker::Tracker;
