//! Identifier newtypes.
//!
//! Server-assigned identifiers (`TaskId`, `SessionId`) are opaque strings.
//! Locally generated identifiers (`EntryId`, `CorrelationToken`) are
//! prefixed counters, e.g. `msg-7` or `sub-3`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

/// Prefix for locally generated message entry ids.
pub const ENTRY_PREFIX: &str = "msg";

/// Prefix for submission correlation tokens.
pub const CORRELATION_PREFIX: &str = "sub";

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $label:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a server-assigned identifier, rejecting blank values.
            ///
            /// # Errors
            ///
            /// Returns [`CoreError::Validation`] if `raw` is empty or whitespace.
            pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(CoreError::Validation(format!("{} must not be empty", $label)));
                }
                Ok(Self(raw))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }
    };
}

opaque_id!(
    /// Server-assigned identifier of one remote render job.
    TaskId,
    "task id"
);

opaque_id!(
    /// Server-assigned identifier of a history session (a chat of completed renders).
    SessionId,
    "session id"
);

/// Locally generated identifier of one conversation log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    #[must_use]
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("{ENTRY_PREFIX}-{seq}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token issued synchronously at submission time.
///
/// Links the placeholder assistant entry to its submission until the server
/// assigns a [`TaskId`]; reconciled with that id in a single log update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CorrelationToken(u64);

impl CorrelationToken {
    #[must_use]
    pub const fn from_seq(seq: u64) -> Self {
        Self(seq)
    }

    #[must_use]
    pub const fn seq(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CORRELATION_PREFIX}-{}", self.0)
    }
}
