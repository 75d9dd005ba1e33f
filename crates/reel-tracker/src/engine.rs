//! Synchronous tracking core.
//!
//! [`TaskEngine`] owns every piece of mutable tracking state and applies
//! events to it under `&mut self`. The async [`crate::Tracker`] performs the
//! network calls and feeds their results back in. Each event is checked
//! against the scheduler's active flag, the cancelled-set and the sticky
//! terminal state before anything is applied.

use std::time::Duration;

use reel_client::ClientError;
use reel_config::{PollingConfig, RenderConfig};
use reel_core::entities::{MessageEntry, TerminalFields};
use reel_core::enums::{TaskStatus, TerminalOutcome};
use reel_core::errors::CoreError;
use reel_core::ids::{CorrelationToken, SessionId, TaskId};
use reel_core::wire::{SessionSummary, StatusPayload, SubmitRequest, SubmitResponse, TaskResult};

use crate::cancel::CancellationController;
use crate::error::TrackerError;
use crate::history::HistorySynchronizer;
use crate::log::{EntryPatch, MessageLog};
use crate::notices;
use crate::scheduler::{PollTicket, PollingScheduler, SchedulerStep};
use crate::state::{TaskStateMachine, Transition};

/// Render options sent with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: String,
    pub quality: String,
    pub resolution: String,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            format: config.format.clone(),
            quality: config.quality.clone(),
            resolution: config.resolution.clone(),
        }
    }
}

/// A submission whose placeholder entry exists but whose task id is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub correlation: CorrelationToken,
    pub request: SubmitRequest,
}

/// What the tracker should do after a status check was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The response arrived after tracking stopped; nothing changed.
    Discarded,
    /// Poll again after the delay.
    Continue(Duration),
    /// The task reached a terminal state; the linked entry is frozen.
    Finished(TerminalOutcome),
}

#[derive(Debug)]
pub struct TaskEngine {
    log: MessageLog,
    machine: Option<TaskStateMachine>,
    scheduler: PollingScheduler,
    cancellation: CancellationController,
    history: HistorySynchronizer,
    pending: Option<CorrelationToken>,
    submitted_session: Option<SessionId>,
}

impl TaskEngine {
    #[must_use]
    pub fn new(config: &PollingConfig) -> Self {
        Self::with_scheduler(PollingScheduler::new(config))
    }

    #[must_use]
    pub fn with_scheduler(scheduler: PollingScheduler) -> Self {
        Self {
            log: MessageLog::new(),
            machine: None,
            scheduler,
            cancellation: CancellationController::new(),
            history: HistorySynchronizer::new(),
            pending: None,
            submitted_session: None,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    #[must_use]
    pub const fn log(&self) -> &MessageLog {
        &self.log
    }

    #[must_use]
    pub const fn scheduler(&self) -> &PollingScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn active_session(&self) -> Option<&SessionId> {
        self.history.active_session()
    }

    /// Task currently or most recently tracked.
    #[must_use]
    pub fn task_id(&self) -> Option<&TaskId> {
        self.machine.as_ref().map(TaskStateMachine::task_id)
    }

    #[must_use]
    pub fn status(&self) -> Option<TaskStatus> {
        self.machine.as_ref().map(TaskStateMachine::status)
    }

    #[must_use]
    pub fn outcome(&self) -> Option<TerminalOutcome> {
        self.machine.as_ref().and_then(TaskStateMachine::outcome)
    }

    /// The assistant entry linked to the tracked task.
    #[must_use]
    pub fn linked_entry(&self) -> Option<&MessageEntry> {
        self.task_id().and_then(|id| self.log.find_by_task_id(id))
    }

    #[must_use]
    pub fn is_cancelled(&self, task_id: &TaskId) -> bool {
        self.cancellation.is_cancelled(task_id)
    }

    /// Whether a submission or a non-terminal task is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.machine.as_ref().is_some_and(|m| !m.is_terminal())
    }

    // ── Submission ─────────────────────────────────────────────────

    /// Append the user entry and a placeholder, and build the request.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Busy`] while another generation is outstanding, and
    /// [`CoreError::Validation`] for a blank query.
    pub fn open_submission(
        &mut self,
        query: &str,
        options: &RenderOptions,
    ) -> Result<PendingSubmission, TrackerError> {
        if self.is_busy() {
            return Err(TrackerError::Busy);
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::Validation("query must not be empty".into()).into());
        }

        self.log.append_user(query);
        let correlation = self.log.append_placeholder(notices::PLACEHOLDER);
        self.pending = Some(correlation);

        Ok(PendingSubmission {
            correlation,
            request: SubmitRequest {
                query: query.to_string(),
                format: options.format.clone(),
                quality: options.quality.clone(),
                resolution: options.resolution.clone(),
                session_id: self.history.active_session().cloned(),
            },
        })
    }

    /// Link the placeholder to the server task id and start polling.
    ///
    /// # Errors
    ///
    /// [`TrackerError::StaleSubmission`] if the submission was abandoned or
    /// the log was reset while the request was in flight.
    pub fn confirm_submission(
        &mut self,
        correlation: CorrelationToken,
        response: SubmitResponse,
    ) -> Result<TaskId, TrackerError> {
        if self.pending != Some(correlation) {
            return Err(TrackerError::StaleSubmission(correlation.to_string()));
        }
        self.pending = None;
        if !self.log.link_task(correlation, &response.task_id) {
            return Err(TrackerError::StaleSubmission(correlation.to_string()));
        }
        self.begin_tracking(response.task_id.clone(), response.session_id);
        Ok(response.task_id)
    }

    /// Freeze the placeholder with the submission error. No polling starts.
    pub fn reject_submission(&mut self, correlation: CorrelationToken, error: &str) -> bool {
        if self.pending == Some(correlation) {
            self.pending = None;
        }
        tracing::warn!(%correlation, error, "submission failed");
        self.log.update_by_correlation(
            correlation,
            EntryPatch::Finalize {
                terminal: TerminalFields::bare(TerminalOutcome::SubmitFailed).with_reason(error),
                content: notices::submit_failed(error),
            },
        )
    }

    /// Give up on a submission before the server answered.
    ///
    /// The job may still be created server-side, so the wording is the
    /// local-only cancellation notice.
    pub fn abandon_submission(&mut self, correlation: CorrelationToken) -> bool {
        if self.pending != Some(correlation) {
            return false;
        }
        self.pending = None;
        tracing::info!(%correlation, "submission abandoned");
        self.log.update_by_correlation(
            correlation,
            EntryPatch::Finalize {
                terminal: TerminalFields::bare(TerminalOutcome::CancelledLocally),
                content: notices::CANCELLED_LOCALLY.to_string(),
            },
        )
    }

    /// Start tracking a task submitted elsewhere.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Busy`] while another generation is outstanding, and
    /// [`TrackerError::AlreadyTracked`] if the log already has an entry for
    /// `task_id`. Neither case touches the log.
    pub fn track_existing(&mut self, task_id: TaskId) -> Result<(), TrackerError> {
        if self.is_busy() {
            return Err(TrackerError::Busy);
        }
        if self.log.find_by_task_id(&task_id).is_some() {
            return Err(TrackerError::AlreadyTracked(task_id));
        }
        let correlation = self.log.append_placeholder(notices::watching(task_id.as_str()));
        if !self.log.link_task(correlation, &task_id) {
            return Err(TrackerError::StaleSubmission(correlation.to_string()));
        }
        self.begin_tracking(task_id, None);
        Ok(())
    }

    fn begin_tracking(&mut self, task_id: TaskId, session: Option<SessionId>) {
        tracing::info!(%task_id, "tracking generation");
        self.machine = Some(TaskStateMachine::new(task_id.clone()));
        self.submitted_session = session;
        self.scheduler.start(task_id);
    }

    // ── Polling ────────────────────────────────────────────────────

    /// Ticket for the next status check, or `None` if tracking is over or a
    /// check is already in flight.
    pub fn begin_poll(&mut self) -> Option<PollTicket> {
        let machine = self.machine.as_ref()?;
        if machine.is_terminal() || self.cancellation.is_cancelled(machine.task_id()) {
            return None;
        }
        let ticket = self.scheduler.begin_poll()?;
        tracing::debug!(
            task_id = %ticket.task_id(),
            attempt = ticket.attempt(),
            "polling status"
        );
        Some(ticket)
    }

    /// Apply the result of the status check issued under `ticket`.
    ///
    /// A successful non-terminal check produces exactly one progress patch.
    /// A failed check within the retry budget changes nothing in the log.
    /// Terminal results and exhausted budgets produce exactly one final patch.
    pub fn apply_poll(
        &mut self,
        ticket: &PollTicket,
        result: Result<StatusPayload, ClientError>,
    ) -> PollOutcome {
        let task_id = ticket.task_id().clone();
        if !self.scheduler.accepts(ticket) {
            tracing::debug!(%task_id, attempt = ticket.attempt(), "discarding late status");
            return PollOutcome::Discarded;
        }
        if self.cancellation.is_cancelled(&task_id) {
            self.scheduler.stop();
            return PollOutcome::Discarded;
        }
        let Some(machine) = self.machine.as_mut().filter(|m| m.task_id() == &task_id) else {
            self.scheduler.stop();
            return PollOutcome::Discarded;
        };

        let observed = result.map_err(TrackerError::from).and_then(|payload| {
            let transition = machine.observe(&payload)?;
            Ok((payload, transition, machine.status()))
        });

        match observed {
            Ok((payload, Transition::Terminal(outcome), _)) => {
                self.scheduler.stop();
                self.finish_from_server(&task_id, outcome, payload.result.as_ref());
                PollOutcome::Finished(outcome)
            }
            Ok((payload, _, status)) => match self.scheduler.complete(ticket, true) {
                None => PollOutcome::Discarded,
                Some(SchedulerStep::Exhausted(outcome)) => self.exhaust(&task_id, outcome),
                Some(SchedulerStep::Continue(delay)) => {
                    let progress = payload.progress_percent();
                    let stage = payload.stage_hint();
                    let content = notices::progress(status, stage.as_deref(), progress);
                    self.log.update_by_task_id(
                        &task_id,
                        EntryPatch::Progress {
                            progress,
                            stage,
                            content: Some(content),
                        },
                    );
                    tracing::debug!(
                        %task_id,
                        %status,
                        progress = ?progress,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "status applied"
                    );
                    PollOutcome::Continue(delay)
                }
            },
            Err(error) => match self.scheduler.complete(ticket, false) {
                None => PollOutcome::Discarded,
                Some(SchedulerStep::Exhausted(outcome)) => {
                    tracing::warn!(%task_id, %error, "status check failed; giving up");
                    self.exhaust(&task_id, outcome)
                }
                Some(SchedulerStep::Continue(delay)) => {
                    tracing::warn!(
                        %task_id,
                        %error,
                        transient = matches!(&error, TrackerError::Client(e) if e.is_transient()),
                        consecutive_errors = self.scheduler.consecutive_errors(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "status check failed; retrying"
                    );
                    PollOutcome::Continue(delay)
                }
            },
        }
    }

    fn finish_from_server(
        &mut self,
        task_id: &TaskId,
        outcome: TerminalOutcome,
        result: Option<&TaskResult>,
    ) {
        let content = match outcome {
            TerminalOutcome::Succeeded => notices::succeeded(result),
            TerminalOutcome::Cancelled => notices::CANCELLED.to_string(),
            _ => notices::failed(result),
        };
        let terminal = result.map_or_else(
            || TerminalFields::bare(outcome),
            |r| TerminalFields::from_result(outcome, r),
        );
        self.log
            .update_by_task_id(task_id, EntryPatch::Finalize { terminal, content });
        tracing::info!(%task_id, %outcome, "generation finished");

        if outcome.is_success() {
            let session = result
                .and_then(|r| r.session_id.clone())
                .or_else(|| self.submitted_session.take());
            self.history.record_completion(session.as_ref());
        }
    }

    fn exhaust(&mut self, task_id: &TaskId, outcome: TerminalOutcome) -> PollOutcome {
        let content = match outcome {
            TerminalOutcome::ConnectionLost => notices::CONNECTION_LOST.to_string(),
            _ => notices::tracking_stopped(self.scheduler.attempts()),
        };
        self.settle(task_id, outcome, content);
        PollOutcome::Finished(outcome)
    }

    fn settle(&mut self, task_id: &TaskId, outcome: TerminalOutcome, content: String) {
        if let Some(machine) = self.machine.as_mut().filter(|m| m.task_id() == task_id) {
            machine.settle(outcome);
        }
        self.log.update_by_task_id(
            task_id,
            EntryPatch::Finalize {
                terminal: TerminalFields::bare(outcome),
                content,
            },
        );
        tracing::info!(%task_id, %outcome, "stopped tracking");
    }

    // ── Cancellation ───────────────────────────────────────────────

    /// Mark the tracked task cancelled and stop polling.
    ///
    /// Returns the task id the remote cancel should target, or `None` when
    /// there is nothing to cancel (no task, already terminal, already
    /// cancelled).
    pub fn cancel_local(&mut self) -> Option<TaskId> {
        let machine = self.machine.as_mut()?;
        if machine.is_terminal() {
            return None;
        }
        let task_id = machine.task_id().clone();
        self.cancellation.cancel_local(&task_id);
        machine.cancel();
        self.scheduler.stop();
        Some(task_id)
    }

    /// Freeze the linked entry once the remote cancel settled.
    pub fn finish_cancel(&mut self, task_id: &TaskId, acknowledged: bool) -> TerminalOutcome {
        let (outcome, content) = if acknowledged {
            (TerminalOutcome::Cancelled, notices::CANCELLED)
        } else {
            (TerminalOutcome::CancelledLocally, notices::CANCELLED_LOCALLY)
        };
        self.settle(task_id, outcome, content.to_string());
        outcome
    }

    // ── Sessions ───────────────────────────────────────────────────

    /// Append subsequent submissions to an existing session.
    pub fn continue_session(&mut self, session_id: SessionId) {
        self.history.select(session_id);
    }

    /// Replace the log with a stored session and continue it.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Busy`] while a generation is outstanding.
    pub fn select_session(&mut self, session: &SessionSummary) -> Result<(), TrackerError> {
        if self.is_busy() {
            return Err(TrackerError::Busy);
        }
        self.machine = None;
        self.submitted_session = None;
        self.log.replace_with_session(session);
        self.history.select(session.id.clone());
        Ok(())
    }

    /// Start over: empty log, no session, no task. Any in-flight response is
    /// discarded when it arrives.
    pub fn reset(&mut self) {
        self.scheduler.stop();
        self.log.reset();
        self.machine = None;
        self.pending = None;
        self.submitted_session = None;
        self.cancellation.clear();
        self.history.clear();
    }
}
