//! Turn controller configuration.
//!
//! Games configure the controller at startup. The configuration is plain
//! data and deserializes from JSON (or any serde format), so a host can keep
//! it next to its other game settings.

use serde::{Deserialize, Serialize};

use super::error::SequenceError;
use super::player::PlayerId;

/// Configuration for a [`TurnController`](crate::turn::TurnController).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Player who takes the first turn.
    pub first_player: PlayerId,

    /// Maximum number of undo snapshots kept within one turn.
    /// `None` for unlimited, `Some(0)` disables undo.
    pub max_undo_depth: Option<usize>,

    /// Record `TurnEvent`s in the controller's event log.
    pub log_events: bool,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            first_player: PlayerId::new(0),
            max_undo_depth: None,
            log_events: true,
        }
    }
}

impl TurnConfig {
    /// Create a configuration for `player_count` players.
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Set the starting player.
    #[must_use]
    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        self.first_player = player;
        self
    }

    /// Cap the undo history.
    #[must_use]
    pub fn with_max_undo_depth(mut self, depth: usize) -> Self {
        self.max_undo_depth = Some(depth);
        self
    }

    /// Disable the event log.
    #[must_use]
    pub fn without_event_log(mut self) -> Self {
        self.log_events = false;
        self
    }

    /// Check the configuration before a controller is built from it.
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.player_count == 0 {
            return Err(SequenceError::illegal("must have at least 1 player"));
        }
        if self.player_count > 255 {
            return Err(SequenceError::illegal("at most 255 players supported"));
        }
        if self.first_player.index() >= self.player_count {
            return Err(SequenceError::illegal(format!(
                "{} is not seated in a {}-player game",
                self.first_player, self.player_count
            )));
        }
        Ok(())
    }
}
