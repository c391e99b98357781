//! Turn positions and their persistence.
//!
//! A [`TurnSnapshot`] is everything needed to continue a game mid-turn: the
//! domain state, the pending obligations, whose turn it is, and the event
//! log. The controller keeps one as its live position and clones it for undo.

use im::Vector;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{PlayerId, SequenceError};
use crate::sequencer::ActionSequencer;

use super::event::TurnEvent;

/// Errors from saving or resuming a turn.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] bincode::Error),

    /// The bytes decoded into a structurally invalid position.
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] SequenceError),
}

/// A complete turn position.
///
/// Cloning is cheap as long as `S` is: the sequencer and the event log are
/// persistent collections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot<S> {
    pub(crate) state: S,
    pub(crate) sequencer: ActionSequencer,
    pub(crate) player: PlayerId,
    pub(crate) turn: u32,
    pub(crate) sequence: u32,
    /// Grows until the host drains it.
    pub(crate) events: Vector<TurnEvent>,
    pub(crate) game_over: bool,
}

impl<S> TurnSnapshot<S> {
    pub(crate) fn new(state: S, player: PlayerId) -> Self {
        Self {
            state,
            sequencer: ActionSequencer::new(),
            player,
            turn: 1,
            sequence: 0,
            events: Vector::new(),
            game_over: false,
        }
    }

    /// Domain game state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Pending obligations.
    pub fn sequencer(&self) -> &ActionSequencer {
        &self.sequencer
    }

    /// The active player.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Turn number (starts at 1).
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Events recorded so far.
    pub fn events(&self) -> &Vector<TurnEvent> {
        &self.events
    }

    /// Check if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Re-check the pending obligations.
    pub fn validate(&self) -> Result<(), SequenceError> {
        self.sequencer.validate()
    }
}

impl<S: Serialize> TurnSnapshot<S> {
    /// Encode with bincode.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(SnapshotError::Encode)
    }
}

impl<S: DeserializeOwned> TurnSnapshot<S> {
    /// Decode bytes produced by [`encode`](Self::encode), then validate.
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes).map_err(SnapshotError::Decode)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
