//! Errors raised by action nodes and the sequencer.
//!
//! Every failed `perform`/`skip` leaves the node tree untouched, so all
//! runtime errors are recoverable: the caller reports them and waits for the
//! next request. Configuration errors are programming mistakes in the domain
//! layer and should never reach a running turn.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::kind::ActionKind;

/// Severity of an error, used by callers to pick a recovery strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Illegal request (client desync, illegal replay). State is unchanged.
    Recoverable,

    /// The domain layer built an invalid obligation. Fix the caller.
    Programming,
}

impl ErrorSeverity {
    /// Returns a short description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Programming => "programming",
        }
    }

    /// Returns true if the request can be retried with a different action.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the sequencing automaton.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SequenceError {
    /// The requested kind is not legal right now.
    #[error("cannot perform {kind}")]
    CannotPerformAction { kind: ActionKind },

    /// Skip attempted on a mandatory node, an unmet minimum, or nothing pending.
    #[error("cannot skip action")]
    CannotSkipAction,

    /// An obligation was constructed with invalid parameters.
    #[error("illegal configuration: {reason}")]
    IllegalConfiguration { reason: String },
}

impl SequenceError {
    pub(crate) fn cannot_perform(kind: ActionKind) -> Self {
        Self::CannotPerformAction { kind }
    }

    pub(crate) fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalConfiguration { reason: reason.into() }
    }

    /// Classify this error.
    #[must_use]
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CannotPerformAction { .. } | Self::CannotSkipAction => ErrorSeverity::Recoverable,
            Self::IllegalConfiguration { .. } => ErrorSeverity::Programming,
        }
    }
}
