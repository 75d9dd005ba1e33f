//! Local cancellation bookkeeping.
//!
//! The cancelled-set is the authority for "the user asked to stop": it is
//! written synchronously before any network call, and every poll response is
//! checked against it before being applied.

use std::collections::HashSet;

use reel_core::ids::TaskId;

#[derive(Debug, Default, Clone)]
pub struct CancellationController {
    cancelled: HashSet<TaskId>,
}

impl CancellationController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a task cancelled. Returns `true` only the first time.
    pub fn cancel_local(&mut self, task_id: &TaskId) -> bool {
        if self.cancelled.contains(task_id) {
            return false;
        }
        tracing::info!(%task_id, "generation cancelled locally");
        self.cancelled.insert(task_id.clone())
    }

    #[must_use]
    pub fn is_cancelled(&self, task_id: &TaskId) -> bool {
        self.cancelled.contains(task_id)
    }

    pub fn clear(&mut self) {
        self.cancelled.clear();
    }
}
