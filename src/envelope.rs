//! Result envelopes and error normalization.
//!
//! Every tool handler ends in an [`Envelope`]. Faults never cross the
//! handler boundary: [`normalize`] turns them into
//! `"<kind>: <fault-type>: <message>"` strings.

use crate::error::{BridgeError, BridgeResult};

/// What a tool handler hands back to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Plain text result.
    Text(String),
    /// Structured data returned by Neovim.
    Structured(serde_json::Value),
    /// A normalized fault.
    Failure(String),
}

impl Envelope {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Which label a tool's faults carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Faults from code the caller asked Neovim to run.
    Script,
    /// Faults while dispatching structured editor-intelligence calls.
    Internal,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Script => "Error",
            Self::Internal => "INTERNAL ERROR",
        }
    }
}

/// Format a fault as the caller-visible error string.
pub fn format_fault(kind: ErrorKind, err: &BridgeError) -> String {
    format!("{}: {}: {err}", kind.label(), err.type_tag())
}

/// Pass a successful envelope through, or turn the fault into a [`Envelope::Failure`].
pub fn normalize(kind: ErrorKind, result: BridgeResult<Envelope>) -> Envelope {
    match result {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::debug!(kind = kind.label(), error = %err, "normalizing tool fault");
            Envelope::Failure(format_fault(kind, &err))
        }
    }
}
