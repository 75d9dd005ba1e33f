//! Async driver around [`TaskEngine`].
//!
//! The tracker only awaits network calls and sleeps; all state changes go
//! through the engine. A [`CancellationToken`] is raced against both the
//! in-flight request and the backoff sleep, so a cancel never waits for a
//! slow status check.

use reel_config::ReelConfig;
use reel_core::entities::MessageEntry;
use reel_core::enums::TerminalOutcome;
use reel_core::ids::{SessionId, TaskId};
use reel_core::wire::SessionSummary;
use tokio_util::sync::CancellationToken;

use crate::api::TaskApi;
use crate::engine::{PollOutcome, RenderOptions, TaskEngine};
use crate::error::TrackerError;
use crate::history::HistoryListing;
use crate::log::MessageLog;

pub struct Tracker<A> {
    api: A,
    engine: TaskEngine,
    options: RenderOptions,
    page_size: u32,
}

impl<A: TaskApi> Tracker<A> {
    #[must_use]
    pub fn new(api: A, config: &ReelConfig) -> Self {
        Self::with_engine(
            api,
            TaskEngine::new(&config.polling),
            RenderOptions::from(&config.render),
            config.history.effective_page_size(),
        )
    }

    #[must_use]
    pub fn with_engine(
        api: A,
        engine: TaskEngine,
        options: RenderOptions,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            engine,
            options,
            page_size,
        }
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn engine(&self) -> &TaskEngine {
        &self.engine
    }

    #[must_use]
    pub const fn log(&self) -> &MessageLog {
        self.engine.log()
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    pub fn continue_session(&mut self, session_id: SessionId) {
        self.engine.continue_session(session_id);
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Submit a query and start tracking the resulting task.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Client`] if the submission failed (the placeholder is
    /// frozen with the error), [`TrackerError::Abandoned`] if `cancel` fired
    /// first, plus the engine's [`TrackerError::Busy`] and validation errors.
    pub async fn submit(
        &mut self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<TaskId, TrackerError> {
        let pending = self.engine.open_submission(query, &self.options)?;

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = self.api.submit(&pending.request) => Some(result),
        };

        match response {
            None => {
                self.engine.abandon_submission(pending.correlation);
                Err(TrackerError::Abandoned)
            }
            Some(Err(error)) => {
                self.engine
                    .reject_submission(pending.correlation, &error.to_string());
                Err(error.into())
            }
            Some(Ok(submitted)) => self.engine.confirm_submission(pending.correlation, submitted),
        }
    }

    /// Track a task that was submitted elsewhere.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Busy`] while another generation is outstanding.
    pub fn watch(&mut self, task_id: TaskId) -> Result<(), TrackerError> {
        self.engine.track_existing(task_id)
    }

    /// Poll until the tracked task is terminal, a budget runs out, or
    /// `cancel` fires.
    ///
    /// The first status check runs immediately. `on_update` sees the linked
    /// entry after every applied patch.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NotTracking`] if nothing was submitted or watched.
    pub async fn run<F>(
        &mut self,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> Result<TerminalOutcome, TrackerError>
    where
        F: FnMut(&MessageEntry),
    {
        loop {
            let Some(ticket) = self.engine.begin_poll() else {
                return self.engine.outcome().ok_or(TrackerError::NotTracking);
            };
            let revision = self.engine.linked_entry().map(MessageEntry::revision);

            let polled = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                result = self.api.fetch_status(ticket.task_id()) => Some(result),
            };
            let Some(result) = polled else {
                return self.cancel().await;
            };

            let outcome = self.engine.apply_poll(&ticket, result);
            if let Some(entry) = self.engine.linked_entry() {
                if Some(entry.revision()) != revision {
                    on_update(entry);
                }
            }

            match outcome {
                PollOutcome::Finished(outcome) => return Ok(outcome),
                PollOutcome::Discarded => {
                    return self.engine.outcome().ok_or(TrackerError::NotTracking);
                }
                PollOutcome::Continue(delay) => {
                    let interrupted = tokio::select! {
                        biased;
                        () = cancel.cancelled() => true,
                        () = tokio::time::sleep(delay) => false,
                    };
                    if interrupted {
                        return self.cancel().await;
                    }
                }
            }
        }
    }

    /// Cancel the tracked task: stop locally first, then ask the server.
    ///
    /// The linked entry is frozen as cancelled whatever the server says; the
    /// wording tells the user whether the server acknowledged. Cancelling a
    /// finished task is a no-op that returns its outcome.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NotTracking`] if no task was ever tracked.
    pub async fn cancel(&mut self) -> Result<TerminalOutcome, TrackerError> {
        let Some(task_id) = self.engine.cancel_local() else {
            return self.engine.outcome().ok_or(TrackerError::NotTracking);
        };

        let acknowledged = match self.api.cancel(&task_id).await {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(%task_id, %error, "remote cancel failed");
                false
            }
        };
        Ok(self.engine.finish_cancel(&task_id, acknowledged))
    }

    /// Fetch one page of history.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Client`] on transport or service errors. An empty
    /// history is [`HistoryListing::Empty`], not an error.
    pub async fn load_history(&self, page: u32) -> Result<HistoryListing, TrackerError> {
        let page = self.api.fetch_history(page, self.page_size).await?;
        Ok(HistoryListing::classify(page))
    }

    /// Find a stored session, starting at `start_page`, and rebuild the log
    /// from it. Later submissions continue that session.
    ///
    /// # Errors
    ///
    /// [`TrackerError::SessionNotFound`] once the listing runs out,
    /// [`TrackerError::Busy`] while a generation is outstanding, and
    /// [`TrackerError::Client`] on fetch errors.
    pub async fn open_session(
        &mut self,
        session_id: &SessionId,
        start_page: u32,
    ) -> Result<SessionSummary, TrackerError> {
        let mut page = start_page.max(1);
        loop {
            let listing = self.api.fetch_history(page, self.page_size).await?;
            if let Some(session) = listing.data.iter().find(|s| &s.id == session_id) {
                self.engine.select_session(session)?;
                return Ok(session.clone());
            }
            match listing.next_page() {
                Some(next) if next > page => page = next,
                _ => return Err(TrackerError::SessionNotFound(session_id.clone())),
            }
        }
    }
}
