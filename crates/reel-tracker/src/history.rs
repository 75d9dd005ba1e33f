//! Session continuity.
//!
//! Tracks which server-side session new submissions append to, and
//! classifies history listings.

use reel_core::ids::SessionId;
use reel_core::wire::HistoryPage;

/// A classified history page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryListing {
    /// The user has no stored sessions (`204` or `total == 0`).
    Empty,
    Populated(HistoryPage),
}

impl HistoryListing {
    #[must_use]
    pub fn classify(page: HistoryPage) -> Self {
        if page.is_empty() {
            Self::Empty
        } else {
            Self::Populated(page)
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct HistorySynchronizer {
    active_session: Option<SessionId>,
}

impl HistorySynchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session the next submission continues, if any.
    #[must_use]
    pub const fn active_session(&self) -> Option<&SessionId> {
        self.active_session.as_ref()
    }

    /// Continue an existing session (`--session` or a selected history entry).
    pub fn select(&mut self, session_id: SessionId) {
        tracing::debug!(%session_id, "session selected");
        self.active_session = Some(session_id);
    }

    /// Record the session a successful generation was stored in.
    ///
    /// Returns `true` when the active session changed.
    pub fn record_completion(&mut self, session_id: Option<&SessionId>) -> bool {
        match session_id {
            Some(id) if self.active_session.as_ref() != Some(id) => {
                tracing::info!(session_id = %id, "generation stored in session");
                self.active_session = Some(id.clone());
                true
            }
            _ => false,
        }
    }

    /// Forget the active session; the next submission starts a new one.
    pub fn clear(&mut self) {
        self.active_session = None;
    }
}
