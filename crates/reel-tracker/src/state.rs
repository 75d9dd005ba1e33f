//! Per-task state machine.
//!
//! Interprets status payloads into [`TaskStatus`] transitions. Local
//! cancellation goes through [`TaskStateMachine::cancel`]; progress values
//! never drive a transition. Once terminal, every later observation is
//! ignored.

use reel_core::enums::{TaskStatus, TerminalOutcome};
use reel_core::errors::CoreError;
use reel_core::ids::TaskId;
use reel_core::wire::StatusPayload;

/// Effect of one observed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The task is already terminal, including locally cancelled.
    Ignored,
    /// Still queued or running; the payload carries display hints only.
    Progress,
    /// The task just became terminal.
    Terminal(TerminalOutcome),
}

#[derive(Debug, Clone)]
pub struct TaskStateMachine {
    task_id: TaskId,
    status: TaskStatus,
    outcome: Option<TerminalOutcome>,
}

impl TaskStateMachine {
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: TaskStatus::Queued,
            outcome: None,
        }
    }

    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<TerminalOutcome> {
        self.outcome
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Interpret one status payload.
    ///
    /// A server status that moves backwards (e.g. `running` → `queued`) keeps
    /// the current state and still counts as progress.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownStatus`] when the status string is outside
    /// the known vocabulary. The state is left untouched.
    pub fn observe(&mut self, payload: &StatusPayload) -> Result<Transition, CoreError> {
        if self.is_terminal() {
            return Ok(Transition::Ignored);
        }

        let next = payload.task_status()?;
        let outcome = match next {
            TaskStatus::Queued | TaskStatus::Running => {
                if self.status.can_transition_to(next) {
                    self.status = next;
                }
                return Ok(Transition::Progress);
            }
            TaskStatus::Completed => match &payload.result {
                Some(result) if result.success => TerminalOutcome::Succeeded,
                _ => TerminalOutcome::Rejected,
            },
            TaskStatus::Failed => TerminalOutcome::Failed,
            TaskStatus::Cancelled => TerminalOutcome::Cancelled,
        };

        self.status = next;
        self.outcome = Some(outcome);
        Ok(Transition::Terminal(outcome))
    }

    /// Force the task into `cancelled`. Returns `false` if already terminal.
    pub fn cancel(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Cancelled;
        true
    }

    /// Record a client-side terminal outcome (cancellation wording, retry
    /// exhaustion, attempt ceiling). Write-once.
    pub fn settle(&mut self, outcome: TerminalOutcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        if !self.is_terminal() {
            self.status = match outcome {
                TerminalOutcome::Cancelled | TerminalOutcome::CancelledLocally => {
                    TaskStatus::Cancelled
                }
                _ => TaskStatus::Failed,
            };
        }
        self.outcome = Some(outcome);
        true
    }
}
