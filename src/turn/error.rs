//! Turn controller errors.

use thiserror::Error;

use crate::core::{ActionKind, ErrorSeverity, SequenceError};

use super::snapshot::SnapshotError;

/// Errors returned by the [`TurnController`](super::TurnController).
#[derive(Debug, Error)]
pub enum TurnError {
    /// The sequencer refused the request.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// The domain effect refused the request (bad parameters, ...).
    #[error("{kind} rejected: {reason}")]
    Rejected { kind: ActionKind, reason: String },

    /// No more turns are played.
    #[error("the game is over")]
    GameOver,

    /// No snapshot is left in the current turn.
    #[error("nothing to undo")]
    NothingToUndo,

    /// Saving or resuming failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl TurnError {
    /// Build a domain rejection.
    pub fn rejected(kind: ActionKind, reason: impl Into<String>) -> Self {
        Self::Rejected {
            kind,
            reason: reason.into(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Sequence(err) => err.severity(),
            Self::Rejected { .. } | Self::GameOver | Self::NothingToUndo => ErrorSeverity::Recoverable,
            Self::Snapshot(_) => ErrorSeverity::Programming,
        }
    }
}
