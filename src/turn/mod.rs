//! Turn control on top of the sequencer.
//!
//! The domain layer implements [`TurnRules`]; the [`TurnController`] owns the
//! game state and the sequencer, runs effects, keeps the event log and the
//! undo history, and rotates players.
//!
//! ## Example
//!
//! ```
//! use turn_sequencer::actions::ActionNode;
//! use turn_sequencer::core::{ActionKind, PlayerId, TurnConfig};
//! use turn_sequencer::turn::{EffectContext, FollowUps, TurnController, TurnError, TurnRules, TurnStatus};
//!
//! const MOVE: ActionKind = ActionKind::new(0);
//!
//! struct Race;
//!
//! impl TurnRules for Race {
//!     type State = [u32; 2];
//!     type Payload = u32;
//!
//!     fn begin_turn(&self, _state: &mut [u32; 2], _player: PlayerId) -> FollowUps {
//!         FollowUps::of(ActionNode::mandatory(MOVE))
//!     }
//!
//!     fn execute(
//!         &self,
//!         ctx: EffectContext<'_, [u32; 2]>,
//!         _kind: ActionKind,
//!         steps: &u32,
//!     ) -> Result<FollowUps, TurnError> {
//!         ctx.state[ctx.player.index()] += steps;
//!         Ok(FollowUps::none())
//!     }
//!
//!     fn is_game_over(&self, state: &[u32; 2]) -> bool {
//!         state.iter().any(|&position| position >= 5)
//!     }
//! }
//!
//! let mut game = TurnController::new(Race, TurnConfig::default(), [0, 0]).unwrap();
//! game.perform(MOVE, &3).unwrap();
//! assert_eq!(game.active_player(), PlayerId::new(1));
//! assert_eq!(game.perform(MOVE, &5).unwrap(), TurnStatus::GameOver);
//! ```

mod controller;
mod error;
mod event;
mod rules;
mod snapshot;

pub use controller::{TurnController, TurnStatus};
pub use error::TurnError;
pub use event::{TurnEvent, TurnEventKind};
pub use rules::{EffectContext, FollowUps, TurnRules};
pub use snapshot::{SnapshotError, TurnSnapshot};
