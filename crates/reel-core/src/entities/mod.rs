//! Entities owned by the tracking core.
//!
//! Sessions are server-owned and appear only as wire types
//! ([`crate::wire::SessionSummary`]); the conversation log entries below are
//! created and mutated exclusively on the client.

mod message;

pub use message::{MessageEntry, TerminalFields};
