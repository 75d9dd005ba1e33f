//! Ordered conversation log.
//!
//! Entries are only ever appended; updates target a single entry by task id
//! (or by correlation token before the task id is known) and never move it.
//! Index maps keep both lookups O(1).

use std::collections::HashMap;

use reel_core::entities::{MessageEntry, TerminalFields};
use reel_core::enums::TerminalOutcome;
use reel_core::ids::{CorrelationToken, EntryId, TaskId};
use reel_core::wire::SessionSummary;

use crate::notices;

/// A change to the assistant entry linked to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPatch {
    Progress {
        progress: Option<u8>,
        stage: Option<String>,
        content: Option<String>,
    },
    Finalize {
        terminal: TerminalFields,
        content: String,
    },
}

impl EntryPatch {
    fn apply(self, entry: &mut MessageEntry) -> bool {
        match self {
            Self::Progress {
                progress,
                stage,
                content,
            } => entry.apply_progress(progress, stage, content),
            Self::Finalize { terminal, content } => entry.finalize(terminal, content),
        }
    }
}

#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Vec<MessageEntry>,
    by_task: HashMap<TaskId, usize>,
    by_correlation: HashMap<CorrelationToken, usize>,
    next_entry: u64,
    next_correlation: u64,
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&MessageEntry> {
        self.entries.last()
    }

    /// Allocate the id for the next entry.
    pub fn next_entry_id(&mut self) -> EntryId {
        self.next_entry += 1;
        EntryId::from_seq(self.next_entry)
    }

    pub fn append(&mut self, entry: MessageEntry) {
        let index = self.entries.len();
        if let Some(token) = entry.correlation() {
            self.by_correlation.insert(token, index);
        }
        if let Some(task_id) = entry.task_id() {
            self.by_task.entry(task_id.clone()).or_insert(index);
        }
        self.entries.push(entry);
    }

    pub fn append_user(&mut self, content: impl Into<String>) -> EntryId {
        let id = self.next_entry_id();
        self.append(MessageEntry::user(id.clone(), content));
        id
    }

    /// Append a placeholder assistant entry and return its correlation token.
    pub fn append_placeholder(&mut self, content: impl Into<String>) -> CorrelationToken {
        self.next_correlation += 1;
        let token = CorrelationToken::from_seq(self.next_correlation);
        let id = self.next_entry_id();
        self.append(MessageEntry::placeholder(id, token, content));
        token
    }

    /// Attach the server task id to the placeholder issued with `token`.
    ///
    /// Returns `false` if the token is unknown, the entry was already linked,
    /// or another entry already owns `task_id`.
    pub fn link_task(&mut self, token: CorrelationToken, task_id: &TaskId) -> bool {
        let Some(&index) = self.by_correlation.get(&token) else {
            return false;
        };
        if self.by_task.contains_key(task_id) {
            return false;
        }
        if !self.entries[index].link_task(task_id.clone()) {
            return false;
        }
        self.by_task.insert(task_id.clone(), index);
        true
    }

    #[must_use]
    pub fn find_by_task_id(&self, task_id: &TaskId) -> Option<&MessageEntry> {
        self.by_task.get(task_id).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn find_by_correlation(&self, token: CorrelationToken) -> Option<&MessageEntry> {
        self.by_correlation.get(&token).map(|&i| &self.entries[i])
    }

    /// Merge a patch into the entry linked to `task_id`.
    ///
    /// No-op (returns `false`) when no entry is linked or it is terminal.
    pub fn update_by_task_id(&mut self, task_id: &TaskId, patch: EntryPatch) -> bool {
        match self.by_task.get(task_id) {
            Some(&index) => patch.apply(&mut self.entries[index]),
            None => false,
        }
    }

    /// Merge a patch into the placeholder issued with `token`.
    pub fn update_by_correlation(&mut self, token: CorrelationToken, patch: EntryPatch) -> bool {
        match self.by_correlation.get(&token) {
            Some(&index) => patch.apply(&mut self.entries[index]),
            None => false,
        }
    }

    /// Drop every entry and its indexes. Entry ids and correlation tokens
    /// keep counting, so a token issued before the reset never matches again.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.by_task.clear();
        self.by_correlation.clear();
    }

    /// Rebuild the log from a stored session: one user/assistant pair per
    /// stored message, in order, every assistant entry terminal and successful.
    pub fn replace_with_session(&mut self, session: &SessionSummary) {
        self.reset();
        for message in &session.messages {
            self.append_user(message.user_query.clone());

            let terminal = TerminalFields {
                link: message.link.clone(),
                code: message.code.clone(),
                filename: message.filename.clone(),
                session_id: Some(session.id.clone()),
                description: message.description.clone(),
                ..TerminalFields::bare(TerminalOutcome::Succeeded)
            };
            let content = message
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| notices::SUCCEEDED.to_string());
            let id = self.next_entry_id();
            self.append(MessageEntry::historical(id, content, terminal));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reel_core::enums::Role;
    use reel_core::ids::SessionId;
    use reel_core::wire::HistoryMessage;

    fn progress(p: u8) -> EntryPatch {
        EntryPatch::Progress {
            progress: Some(p),
            stage: None,
            content: None,
        }
    }

    fn finalize(outcome: TerminalOutcome, content: &str) -> EntryPatch {
        EntryPatch::Finalize {
            terminal: TerminalFields::bare(outcome),
            content: content.to_string(),
        }
    }

    #[test]
    fn placeholder_links_once() {
        let mut log = MessageLog::new();
        log.append_user("draw a circle");
        let token = log.append_placeholder(notices::PLACEHOLDER);
        let id = TaskId::from("t1");

        assert!(log.link_task(token, &id));
        assert!(!log.link_task(token, &TaskId::from("t2")));
        assert_eq!(log.len(), 2);
        assert_eq!(log.find_by_task_id(&id).unwrap().correlation(), Some(token));
    }

    #[test]
    fn task_id_cannot_be_claimed_twice() {
        let mut log = MessageLog::new();
        let first = log.append_placeholder("a");
        let second = log.append_placeholder("b");
        let id = TaskId::from("t1");
        assert!(log.link_task(first, &id));
        assert!(!log.link_task(second, &id));
        assert!(log.find_by_correlation(second).unwrap().task_id().is_none());
    }

    #[test]
    fn updates_never_reorder_or_duplicate() {
        let mut log = MessageLog::new();
        log.append_user("q");
        let token = log.append_placeholder(notices::PLACEHOLDER);
        let id = TaskId::from("t1");
        log.link_task(token, &id);

        for p in [10, 20, 30] {
            assert!(log.update_by_task_id(&id, progress(p)));
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].progress(), Some(30));
        assert_eq!(log.entries()[1].revision(), 4);
    }

    #[test]
    fn terminal_entries_ignore_patches() {
        let mut log = MessageLog::new();
        let token = log.append_placeholder(notices::PLACEHOLDER);
        let id = TaskId::from("t1");
        log.link_task(token, &id);

        assert!(log.update_by_task_id(&id, finalize(TerminalOutcome::Cancelled, notices::CANCELLED)));
        assert!(!log.update_by_task_id(&id, progress(50)));
        assert!(!log.update_by_task_id(&id, finalize(TerminalOutcome::Succeeded, "late")));

        let entry = log.find_by_task_id(&id).unwrap();
        assert_eq!(entry.content(), notices::CANCELLED);
        assert_eq!(entry.terminal().unwrap().outcome, TerminalOutcome::Cancelled);
    }

    #[test]
    fn missing_task_is_noop() {
        let mut log = MessageLog::new();
        assert!(!log.update_by_task_id(&TaskId::from("nope"), progress(1)));
        assert!(log.is_empty());
    }

    #[test]
    fn reset_clears_bookkeeping() {
        let mut log = MessageLog::new();
        let token = log.append_placeholder("a");
        let id = TaskId::from("t1");
        log.link_task(token, &id);
        log.reset();

        assert!(log.is_empty());
        assert!(log.find_by_task_id(&id).is_none());
        assert!(!log.update_by_task_id(&id, progress(1)));
    }

    #[test]
    fn tokens_keep_increasing_across_reset() {
        let mut log = MessageLog::new();
        let before = log.append_placeholder("a");
        log.reset();
        let after = log.append_placeholder("b");

        assert_ne!(before, after);
        assert!(log.find_by_correlation(before).is_none());
        assert!(!log.link_task(before, &TaskId::from("t1")));
        assert_eq!(log.entries()[0].id(), &EntryId::from_seq(2));
    }

    #[test]
    fn replace_with_session_builds_terminal_pairs() {
        let mut log = MessageLog::new();
        log.append_user("stale");

        let session = SessionSummary {
            id: SessionId::from("s1"),
            chat_name: Some("Shapes".into()),
            messages: vec![
                HistoryMessage {
                    user_query: "a circle".into(),
                    link: Some("https://cdn/1.mp4".into()),
                    ..HistoryMessage::default()
                },
                HistoryMessage {
                    user_query: "now a square".into(),
                    description: Some("A square spins".into()),
                    link: Some("https://cdn/2.mp4".into()),
                    ..HistoryMessage::default()
                },
            ],
            created_at: None,
        };
        log.replace_with_session(&session);

        let roles: Vec<_> = log.entries().iter().map(MessageEntry::role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(log.entries()[0].content(), "a circle");
        assert_eq!(log.entries()[1].content(), notices::SUCCEEDED);
        assert_eq!(log.entries()[3].content(), "A square spins");

        let terminal = log.entries()[3].terminal().unwrap();
        assert_eq!(terminal.outcome, TerminalOutcome::Succeeded);
        assert_eq!(terminal.session_id, Some(SessionId::from("s1")));
        assert_eq!(terminal.link.as_deref(), Some("https://cdn/2.mp4"));
        assert!(log.entries().iter().all(|e| e.role() == Role::User || e.is_terminal()));
    }
}
