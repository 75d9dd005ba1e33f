use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Role, TerminalOutcome};
use crate::ids::{CorrelationToken, EntryId, SessionId, TaskId};
use crate::wire::TaskResult;

/// Fields fixed at the moment a linked task reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TerminalFields {
    pub outcome: TerminalOutcome,
    pub link: Option<String>,
    pub code: Option<String>,
    pub filename: Option<String>,
    pub reason: Option<String>,
    pub session_id: Option<SessionId>,
    pub description: Option<String>,
}

impl TerminalFields {
    /// Terminal fields carrying only an outcome.
    #[must_use]
    pub const fn bare(outcome: TerminalOutcome) -> Self {
        Self {
            outcome,
            link: None,
            code: None,
            filename: None,
            reason: None,
            session_id: None,
            description: None,
        }
    }

    /// Terminal fields copied from a server result.
    #[must_use]
    pub fn from_result(outcome: TerminalOutcome, result: &TaskResult) -> Self {
        Self {
            outcome,
            link: result.link.clone(),
            code: result.code.clone(),
            filename: result.filename.clone(),
            reason: result.failure_reason().map(str::to_string),
            session_id: result.session_id.clone(),
            description: result.description.clone(),
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// One line of the conversation log.
///
/// Only assistant entries linked to a task are mutable, and only until they
/// become terminal. The mutators return `false` instead of changing a frozen
/// entry, so callers can tell an applied patch from a discarded one.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MessageEntry {
    id: EntryId,
    role: Role,
    content: String,
    correlation: Option<CorrelationToken>,
    task_id: Option<TaskId>,
    progress: Option<u8>,
    stage: Option<String>,
    terminal: Option<TerminalFields>,
    revision: u32,
    created_at: DateTime<Utc>,
}

impl MessageEntry {
    /// A user query. User entries are immutable.
    #[must_use]
    pub fn user(id: EntryId, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content.into(), None)
    }

    /// Placeholder assistant entry created synchronously at submission time.
    #[must_use]
    pub fn placeholder(
        id: EntryId,
        correlation: CorrelationToken,
        content: impl Into<String>,
    ) -> Self {
        Self::new(id, Role::Assistant, content.into(), Some(correlation))
    }

    /// Assistant entry reconstructed from history: terminal from birth.
    #[must_use]
    pub fn historical(id: EntryId, content: impl Into<String>, terminal: TerminalFields) -> Self {
        let mut entry = Self::new(id, Role::Assistant, content.into(), None);
        entry.terminal = Some(terminal);
        entry.progress = Some(100);
        entry
    }

    fn new(
        id: EntryId,
        role: Role,
        content: String,
        correlation: Option<CorrelationToken>,
    ) -> Self {
        Self {
            id,
            role,
            content,
            correlation,
            task_id: None,
            progress: None,
            stage: None,
            terminal: None,
            revision: 0,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &EntryId {
        &self.id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn correlation(&self) -> Option<CorrelationToken> {
        self.correlation
    }

    #[must_use]
    pub const fn task_id(&self) -> Option<&TaskId> {
        self.task_id.as_ref()
    }

    #[must_use]
    pub const fn progress(&self) -> Option<u8> {
        self.progress
    }

    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    #[must_use]
    pub const fn terminal(&self) -> Option<&TerminalFields> {
        self.terminal.as_ref()
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Number of patches applied since creation.
    #[must_use]
    pub const fn revision(&self) -> u32 {
        self.revision
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    const fn is_mutable(&self) -> bool {
        matches!(self.role, Role::Assistant) && self.terminal.is_none()
    }

    /// Attach the server task id. Succeeds once per entry.
    pub fn link_task(&mut self, task_id: TaskId) -> bool {
        if !self.is_mutable() || self.task_id.is_some() {
            return false;
        }
        self.task_id = Some(task_id);
        self.revision += 1;
        true
    }

    /// Record an in-progress update. `None` fields keep their previous value.
    pub fn apply_progress(
        &mut self,
        progress: Option<u8>,
        stage: Option<String>,
        content: Option<String>,
    ) -> bool {
        if !self.is_mutable() {
            return false;
        }
        if progress.is_some() {
            self.progress = progress;
        }
        if stage.is_some() {
            self.stage = stage;
        }
        if let Some(content) = content {
            self.content = content;
        }
        self.revision += 1;
        true
    }

    /// Freeze the entry with its terminal fields. Write-once.
    pub fn finalize(&mut self, terminal: TerminalFields, content: impl Into<String>) -> bool {
        if !self.is_mutable() {
            return false;
        }
        if terminal.outcome.is_success() {
            self.progress = Some(100);
        }
        self.terminal = Some(terminal);
        self.content = content.into();
        self.revision += 1;
        true
    }
}
