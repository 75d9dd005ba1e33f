//! Adaptive polling scheduler.
//!
//! Owns the poll budget for the single active task: at most one status
//! check in flight, a consecutive-error budget, and a hard attempt ceiling.
//! The scheduler never performs I/O; it hands out [`PollTicket`]s and turns
//! their completions into the next step.

use std::time::Duration;

use reel_config::PollingConfig;
use reel_core::enums::TerminalOutcome;
use reel_core::ids::TaskId;

use crate::backoff::BackoffPolicy;

/// Permission to issue one status check.
///
/// Tickets carry the generation of the `start` call that issued them, so a
/// response belonging to an earlier tracking run is recognized as stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTicket {
    task_id: TaskId,
    attempt: u32,
    generation: u64,
}

impl PollTicket {
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// 1-based attempt number.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStep {
    /// Poll again after this delay.
    Continue(Duration),
    /// A budget ran out; tracking is over.
    Exhausted(TerminalOutcome),
}

#[derive(Debug)]
pub struct PollingScheduler {
    task_id: Option<TaskId>,
    consecutive_errors: u32,
    attempts: u32,
    active: bool,
    in_flight: bool,
    generation: u64,
    max_consecutive_errors: u32,
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl PollingScheduler {
    #[must_use]
    pub fn new(config: &PollingConfig) -> Self {
        Self::with_backoff(config, BackoffPolicy::from_config(config))
    }

    #[must_use]
    pub fn with_backoff(config: &PollingConfig, backoff: BackoffPolicy) -> Self {
        Self {
            task_id: None,
            consecutive_errors: 0,
            attempts: 0,
            active: false,
            in_flight: false,
            generation: 0,
            max_consecutive_errors: config.max_consecutive_errors,
            max_attempts: config.max_attempts,
            backoff,
        }
    }

    /// Begin tracking `task_id` with fresh counters.
    pub fn start(&mut self, task_id: TaskId) {
        tracing::debug!(%task_id, "polling started");
        self.task_id = Some(task_id);
        self.consecutive_errors = 0;
        self.attempts = 0;
        self.in_flight = false;
        self.active = true;
        self.generation += 1;
    }

    /// Stop tracking. Idempotent; returns `true` if the scheduler was active.
    pub fn stop(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.in_flight = false;
        if was_active {
            tracing::debug!(
                task_id = ?self.task_id.as_ref().map(TaskId::as_str),
                attempts = self.attempts,
                "polling stopped"
            );
        }
        was_active
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub const fn task_id(&self) -> Option<&TaskId> {
        self.task_id.as_ref()
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Issue a ticket for the next status check.
    ///
    /// Returns `None` while inactive, while another check is in flight, or
    /// once the attempt ceiling has been spent.
    pub fn begin_poll(&mut self) -> Option<PollTicket> {
        if !self.active || self.in_flight || self.attempts >= self.max_attempts {
            return None;
        }
        let task_id = self.task_id.clone()?;
        self.in_flight = true;
        self.attempts += 1;
        Some(PollTicket {
            task_id,
            attempt: self.attempts,
            generation: self.generation,
        })
    }

    /// Whether a response for `ticket` may still be applied.
    #[must_use]
    pub fn accepts(&self, ticket: &PollTicket) -> bool {
        self.active
            && self.in_flight
            && ticket.generation == self.generation
            && self.task_id.as_ref() == Some(&ticket.task_id)
    }

    /// Record the end of a status check and decide what happens next.
    ///
    /// `ok` is whether the check produced a usable payload. Returns `None`
    /// when the ticket is stale and the response must be discarded.
    pub fn complete(&mut self, ticket: &PollTicket, ok: bool) -> Option<SchedulerStep> {
        if !self.accepts(ticket) {
            return None;
        }
        self.in_flight = false;

        if ok {
            self.consecutive_errors = 0;
        } else {
            self.consecutive_errors += 1;
            if self.consecutive_errors >= self.max_consecutive_errors {
                self.active = false;
                return Some(SchedulerStep::Exhausted(TerminalOutcome::ConnectionLost));
            }
        }

        if self.attempts >= self.max_attempts {
            self.active = false;
            return Some(SchedulerStep::Exhausted(TerminalOutcome::TrackingStopped));
        }

        let delay = self.backoff.interval(self.consecutive_errors);
        Some(SchedulerStep::Continue(delay))
    }
}
