use std::fmt::Write as _;

use reel_core::entities::MessageEntry;
use reel_core::enums::{Role, TerminalOutcome};
use reel_core::wire::SessionSummary;
use reel_tracker::HistoryListing;
use serde::Serialize;

use super::TextView;

// ── Job ────────────────────────────────────────────────────────────

/// Final state of a tracked generation.
#[derive(Debug, Serialize)]
pub struct JobReport {
    pub task_id: Option<String>,
    pub outcome: TerminalOutcome,
    pub message: String,
    pub link: Option<String>,
    pub filename: Option<String>,
    pub session_id: Option<String>,
    pub reason: Option<String>,
    pub code: Option<String>,
}

impl JobReport {
    #[must_use]
    pub fn from_entry(entry: &MessageEntry, outcome: TerminalOutcome) -> Self {
        let terminal = entry.terminal();
        Self {
            task_id: entry.task_id().map(ToString::to_string),
            outcome,
            message: entry.content().to_string(),
            link: terminal.and_then(|t| t.link.clone()),
            filename: terminal.and_then(|t| t.filename.clone()),
            session_id: terminal.and_then(|t| t.session_id.as_ref().map(ToString::to_string)),
            reason: terminal.and_then(|t| t.reason.clone()),
            code: terminal.and_then(|t| t.code.clone()),
        }
    }
}

impl TextView for JobReport {
    fn to_text(&self) -> String {
        let mut text = self.message.clone();
        if let Some(link) = &self.link {
            let _ = write!(text, "\nVideo:   {link}");
        }
        if let Some(session) = &self.session_id {
            let _ = write!(text, "\nSession: {session}");
        }
        if let (Some(task), false) = (&self.task_id, self.outcome.is_success()) {
            let _ = write!(text, "\nTask:    {task} ({})", self.outcome);
        }
        text
    }
}

// ── Cancel ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CancelReport {
    pub task_id: String,
    pub acknowledged: bool,
    pub message: Option<String>,
}

impl TextView for CancelReport {
    fn to_text(&self) -> String {
        match &self.message {
            Some(message) => format!("Cancellation requested for {}: {message}", self.task_id),
            None => format!("Cancellation requested for {}.", self.task_id),
        }
    }
}

// ── History ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub sessions: Vec<SessionSummary>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
    pub next_page: Option<u32>,
}

impl HistoryView {
    #[must_use]
    pub fn new(listing: HistoryListing, requested_page: u32) -> Self {
        match listing {
            HistoryListing::Empty => Self {
                sessions: Vec::new(),
                page: requested_page,
                pages: 0,
                total: 0,
                next_page: None,
            },
            HistoryListing::Populated(page) => Self {
                next_page: page.next_page(),
                sessions: page.data,
                page: page.page,
                pages: page.pages,
                total: page.total,
            },
        }
    }
}

impl TextView for HistoryView {
    fn to_text(&self) -> String {
        if self.total == 0 {
            return "No history yet.".to_string();
        }
        let mut text = String::new();
        for session in &self.sessions {
            let name = session.chat_name.as_deref().unwrap_or("(untitled)");
            let latest = session
                .latest_message()
                .map_or("", |m| m.user_query.as_str());
            let _ = writeln!(
                text,
                "{}  {name}  [{} renders]  {latest}",
                session.id,
                session.messages.len()
            );
        }
        let _ = write!(
            text,
            "Page {}/{} ({} sessions)",
            self.page, self.pages, self.total
        );
        text
    }
}

// ── Conversation ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ConversationView {
    pub session_id: String,
    pub chat_name: Option<String>,
    pub entries: Vec<MessageEntry>,
}

impl TextView for ConversationView {
    fn to_text(&self) -> String {
        let mut text = String::new();
        if let Some(name) = &self.chat_name {
            let _ = writeln!(text, "# {name}");
        }
        for entry in &self.entries {
            match entry.role() {
                Role::User => {
                    let _ = writeln!(text, "you>  {}", entry.content());
                }
                Role::Assistant => {
                    let _ = writeln!(text, "reel> {}", entry.content());
                    if let Some(link) = entry.terminal().and_then(|t| t.link.as_deref()) {
                        let _ = writeln!(text, "      {link}");
                    }
                }
            }
        }
        text.trim_end().to_string()
    }
}
