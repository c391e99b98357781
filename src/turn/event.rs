//! Turn event log.
//!
//! Every committed request is recorded with its player, turn, and sequence
//! number. The log is part of the turn position, so undo rewinds it too.
//!
//! Used for:
//! - Replay/debugging
//! - Feeding a presentation layer's game log

use serde::{Deserialize, Serialize};

use crate::core::{ActionKind, PlayerId};

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEventKind {
    /// The player's turn started.
    BeginTurn,

    /// An action was performed.
    Performed(ActionKind),

    /// The front obligation was skipped.
    Skipped,

    /// The turn ended. `forced` when obligations were discarded.
    EndTurn { forced: bool },

    /// The game ended after this player's turn.
    GameOver,
}

/// A recorded event with metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// The active player.
    pub player: PlayerId,

    /// Turn number when the event happened.
    pub turn: u32,

    /// Sequence number within the turn (for ordering).
    pub sequence: u32,

    /// The event itself.
    pub kind: TurnEventKind,
}

impl TurnEvent {
    /// Create a new event record.
    #[must_use]
    pub fn new(player: PlayerId, turn: u32, sequence: u32, kind: TurnEventKind) -> Self {
        Self {
            player,
            turn,
            sequence,
            kind,
        }
    }
}
