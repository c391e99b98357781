//! The turn state machine.
//!
//! `TurnController` drives one game: it routes requests through the
//! sequencer, runs domain effects, and rotates players when a turn has
//! nothing left to do.
//!
//! ## Request flow
//!
//! 1. Check legality (sequencer or deferred option)
//! 2. Snapshot the position
//! 3. Execute the domain effect (restore the snapshot on error)
//! 4. Consume the kind, push follow-ups
//! 5. Record the event and keep the snapshot for undo
//! 6. End the turn if nothing is left

use std::collections::VecDeque;

use im::Vector;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::actions::KindSet;
use crate::core::{ActionKind, PlayerId, SequenceError, TurnConfig};
use crate::sequencer::ActionSequencer;

use super::error::TurnError;
use super::event::{TurnEvent, TurnEventKind};
use super::rules::{EffectContext, TurnRules};
use super::snapshot::TurnSnapshot;

/// Where the game stands after a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStatus {
    /// The active player still has something to do.
    WaitingForAction,

    /// The turn ended and `next` is now active.
    TurnEnded { ended: PlayerId, next: PlayerId },

    /// The game ended with the last turn.
    GameOver,
}

/// Drives turns for a game described by `R`.
pub struct TurnController<R: TurnRules> {
    rules: R,
    config: TurnConfig,

    /// Live position.
    position: TurnSnapshot<R::State>,

    /// Positions before each request of the current turn (back = latest).
    history: VecDeque<TurnSnapshot<R::State>>,
}

impl<R: TurnRules> TurnController<R> {
    /// Start a game: the first player's turn begins immediately.
    pub fn new(rules: R, config: TurnConfig, state: R::State) -> Result<Self, TurnError> {
        config.validate()?;

        let mut controller = Self {
            position: TurnSnapshot::new(state, config.first_player),
            history: VecDeque::new(),
            rules,
            config,
        };
        controller.begin_turn();
        if controller.turn_is_exhausted() {
            controller.pass_empty_turns(controller.position.player);
        }
        Ok(controller)
    }

    // === Queries ===

    /// The game rules.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Controller configuration.
    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    /// Domain game state.
    pub fn state(&self) -> &R::State {
        &self.position.state
    }

    /// Pending obligations of the active player.
    pub fn sequencer(&self) -> &ActionSequencer {
        &self.position.sequencer
    }

    /// The active player.
    pub fn active_player(&self) -> PlayerId {
        self.position.player
    }

    /// Turn number (starts at 1).
    pub fn turn(&self) -> u32 {
        self.position.turn
    }

    /// Recorded events (empty when the event log is disabled).
    ///
    /// The log spans the whole game until drained and is part of every save.
    pub fn events(&self) -> &Vector<TurnEvent> {
        &self.position.events
    }

    /// Take the recorded events, leaving the log empty.
    ///
    /// Undo snapshots lose their copies too, so drained events never come
    /// back.
    pub fn drain_events(&mut self) -> Vector<TurnEvent> {
        for snapshot in &mut self.history {
            snapshot.events.clear();
        }
        std::mem::take(&mut self.position.events)
    }

    /// Check if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.position.game_over
    }

    /// Current status.
    pub fn status(&self) -> TurnStatus {
        if self.position.game_over {
            TurnStatus::GameOver
        } else {
            TurnStatus::WaitingForAction
        }
    }

    /// Kinds the active player may request now.
    pub fn possible_kinds(&self) -> KindSet {
        if self.position.game_over {
            return KindSet::new();
        }
        self.position.sequencer.possible_kinds().union(self.deferred_options())
    }

    /// Check if `kind` may be requested now.
    pub fn can_perform(&self, kind: ActionKind) -> bool {
        !self.position.game_over
            && (self.position.sequencer.can_perform(kind) || self.deferred_options().contains(&kind))
    }

    /// Check if a request of this turn can be taken back.
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Number of requests that can be taken back.
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// A copy of the live position.
    pub fn snapshot(&self) -> TurnSnapshot<R::State> {
        self.position.clone()
    }

    // === Requests ===

    /// Perform `kind` with its domain parameters.
    ///
    /// Nothing changes when the request is illegal or the effect fails.
    pub fn perform(&mut self, kind: ActionKind, payload: &R::Payload) -> Result<TurnStatus, TurnError> {
        self.ensure_running()?;

        let from_sequencer = self.position.sequencer.can_perform(kind);
        if !from_sequencer && !self.deferred_options().contains(&kind) {
            debug!(player = %self.position.player, %kind, "illegal action requested");
            return Err(SequenceError::cannot_perform(kind).into());
        }

        let before = self.position.clone();
        let position = &mut self.position;
        let ctx = EffectContext {
            state: &mut position.state,
            player: position.player,
            turn: position.turn,
            sequencer: &position.sequencer,
        };

        let follow_ups = match self.rules.execute(ctx, kind, payload) {
            Ok(follow_ups) => follow_ups,
            Err(err) => {
                warn!(player = %before.player, %kind, error = %err, "action rejected");
                self.position = before;
                return Err(err);
            }
        };

        if from_sequencer {
            if let Err(err) = self.position.sequencer.perform(kind) {
                self.position = before;
                return Err(err.into());
            }
        }
        follow_ups.apply_to(&mut self.position.sequencer);

        debug!(
            player = %self.position.player,
            %kind,
            turn = self.position.turn,
            deferred = !from_sequencer,
            "performed action"
        );
        self.record(TurnEventKind::Performed(kind));
        self.remember(before);
        Ok(self.end_turn_if_exhausted())
    }

    /// Skip the front obligation.
    pub fn skip(&mut self) -> Result<TurnStatus, TurnError> {
        self.ensure_running()?;

        let before = self.position.clone();
        self.position.sequencer.skip()?;

        debug!(player = %self.position.player, turn = self.position.turn, "skipped obligation");
        self.record(TurnEventKind::Skipped);
        self.remember(before);
        Ok(self.end_turn_if_exhausted())
    }

    /// End the turn, skipping every remaining obligation.
    ///
    /// Fails, changing nothing, while a mandatory obligation remains.
    pub fn end_turn(&mut self) -> Result<TurnStatus, TurnError> {
        self.ensure_running()?;
        self.position.sequencer.skip_all()?;
        Ok(self.finish_turn(false))
    }

    /// End the turn whatever is pending (timeouts, a player leaving).
    pub fn force_end_turn(&mut self) -> Result<TurnStatus, TurnError> {
        self.ensure_running()?;

        if !self.position.sequencer.is_empty() {
            warn!(
                player = %self.position.player,
                discarded = self.position.sequencer.len(),
                "forcing end of turn"
            );
        }
        self.position.sequencer.clear();
        Ok(self.finish_turn(true))
    }

    /// Take back the latest request of the current turn.
    pub fn undo(&mut self) -> Result<(), TurnError> {
        let previous = self.history.pop_back().ok_or(TurnError::NothingToUndo)?;
        self.position = previous;

        debug!(
            player = %self.position.player,
            remaining = self.history.len(),
            "undid last request"
        );
        Ok(())
    }

    // === Persistence ===

    /// Encode the live position. Undo history is not saved.
    pub fn save(&self) -> Result<Vec<u8>, TurnError>
    where
        R::State: Serialize,
    {
        Ok(self.position.encode()?)
    }

    /// Continue a game from bytes produced by [`save`](Self::save).
    pub fn resume(rules: R, config: TurnConfig, bytes: &[u8]) -> Result<Self, TurnError>
    where
        R::State: DeserializeOwned,
    {
        config.validate()?;
        let position = TurnSnapshot::decode(bytes)?;

        if position.player.index() >= config.player_count {
            return Err(SequenceError::illegal("saved active player is out of range").into());
        }

        debug!(player = %position.player, turn = position.turn, "resumed game");
        Ok(Self {
            rules,
            config,
            position,
            history: VecDeque::new(),
        })
    }

    // === Internals ===

    fn ensure_running(&self) -> Result<(), TurnError> {
        if self.position.game_over {
            return Err(TurnError::GameOver);
        }
        Ok(())
    }

    fn deferred_options(&self) -> KindSet {
        self.rules
            .deferred_options(&self.position.state, self.position.player, &self.position.sequencer)
    }

    fn turn_is_exhausted(&self) -> bool {
        self.position.sequencer.is_empty() && self.deferred_options().is_empty()
    }

    fn end_turn_if_exhausted(&mut self) -> TurnStatus {
        if self.turn_is_exhausted() {
            self.finish_turn(false)
        } else {
            TurnStatus::WaitingForAction
        }
    }

    fn finish_turn(&mut self, forced: bool) -> TurnStatus {
        let ended = self.position.player;
        self.history.clear();
        if !self.close_turn(forced) {
            return TurnStatus::GameOver;
        }
        if self.turn_is_exhausted() {
            return self.pass_empty_turns(ended);
        }

        let next = self.position.player;
        debug!(%ended, %next, turn = self.position.turn, "turn ended");
        TurnStatus::TurnEnded { ended, next }
    }

    /// Pass turns that begin with nothing to do. Stops after one full round
    /// so that a game where nobody can act waits for the host.
    fn pass_empty_turns(&mut self, ended: PlayerId) -> TurnStatus {
        for _ in 0..self.config.player_count {
            if !self.turn_is_exhausted() {
                break;
            }
            debug!(player = %self.position.player, turn = self.position.turn, "nothing to do, passing");
            if !self.close_turn(false) {
                return TurnStatus::GameOver;
            }
        }

        let next = self.position.player;
        debug!(%ended, %next, turn = self.position.turn, "turn ended");
        TurnStatus::TurnEnded { ended, next }
    }

    /// End the active player's turn and begin the next one. Returns `false`
    /// when the game is over instead.
    fn close_turn(&mut self, forced: bool) -> bool {
        let player = self.position.player;
        self.rules.end_turn(&mut self.position.state, player);
        self.record(TurnEventKind::EndTurn { forced });

        if self.rules.is_game_over(&self.position.state) {
            self.position.game_over = true;
            self.record(TurnEventKind::GameOver);
            debug!(%player, turn = self.position.turn, "game over");
            return false;
        }

        self.position.player = player.next(self.config.player_count);
        self.position.turn += 1;
        self.position.sequence = 0;
        self.begin_turn();
        true
    }

    fn begin_turn(&mut self) {
        let player = self.position.player;
        let follow_ups = self.rules.begin_turn(&mut self.position.state, player);
        follow_ups.apply_to(&mut self.position.sequencer);
        self.record(TurnEventKind::BeginTurn);
    }

    fn record(&mut self, kind: TurnEventKind) {
        let position = &mut self.position;
        if self.config.log_events {
            position
                .events
                .push_back(TurnEvent::new(position.player, position.turn, position.sequence, kind));
        }
        position.sequence += 1;
    }

    fn remember(&mut self, before: TurnSnapshot<R::State>) {
        if self.config.max_undo_depth == Some(0) {
            return;
        }

        self.history.push_back(before);
        if let Some(limit) = self.config.max_undo_depth {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }
}

impl<R> std::fmt::Debug for TurnController<R>
where
    R: TurnRules,
    R::State: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnController")
            .field("config", &self.config)
            .field("position", &self.position)
            .field("undo_depth", &self.history.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionNode;
    use crate::turn::rules::FollowUps;

    const MOVE: ActionKind = ActionKind::new(0);
    const HIRE: ActionKind = ActionKind::new(1);
    const BONUS: ActionKind = ActionKind::new(2);

    /// Each turn: one mandatory move. Moving with a payload of 0 is refused.
    /// A payload of 2 grants an optional hire.
    struct Counter;

    impl TurnRules for Counter {
        type State = u32;
        type Payload = u32;

        fn begin_turn(&self, _state: &mut u32, _player: PlayerId) -> FollowUps {
            FollowUps::of(ActionNode::mandatory(MOVE))
        }

        fn execute(
            &self,
            ctx: EffectContext<'_, u32>,
            kind: ActionKind,
            payload: &u32,
        ) -> Result<FollowUps, TurnError> {
            *ctx.state += payload;
            if kind == MOVE && *payload == 0 {
                return Err(TurnError::rejected(kind, "must move at least one step"));
            }
            if kind == MOVE && *payload == 2 {
                return Ok(FollowUps::of(ActionNode::optional(HIRE)).with_anytime(BONUS));
            }
            Ok(FollowUps::none())
        }

        fn is_game_over(&self, state: &u32) -> bool {
            *state >= 10
        }
    }

    fn controller() -> TurnController<Counter> {
        TurnController::new(Counter, TurnConfig::default(), 0).unwrap()
    }

    #[test]
    fn test_turn_rotates_when_exhausted() {
        let mut game = controller();
        assert_eq!(game.active_player(), PlayerId::new(0));

        let status = game.perform(MOVE, &1).unwrap();
        assert_eq!(
            status,
            TurnStatus::TurnEnded {
                ended: PlayerId::new(0),
                next: PlayerId::new(1)
            }
        );
        assert_eq!(game.turn(), 2);
        assert!(game.can_perform(MOVE));
        assert!(!game.can_undo());
    }

    #[test]
    fn test_rejected_effect_restores_state() {
        let mut game = controller();
        let before = game.snapshot();

        let err = game.perform(MOVE, &0).unwrap_err();
        assert!(matches!(err, TurnError::Rejected { kind: MOVE, .. }));
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_follow_ups_keep_turn_open() {
        let mut game = controller();

        assert_eq!(game.perform(MOVE, &2).unwrap(), TurnStatus::WaitingForAction);
        assert_eq!(game.possible_kinds(), KindSet::from(vec![HIRE, BONUS]));

        game.skip().unwrap();
        assert_eq!(game.perform(BONUS, &0).unwrap(), TurnStatus::TurnEnded {
            ended: PlayerId::new(0),
            next: PlayerId::new(1)
        });
    }

    #[test]
    fn test_undo_within_turn() {
        let mut game = controller();
        game.perform(MOVE, &2).unwrap();
        game.skip().unwrap();
        assert_eq!(game.undo_depth(), 2);

        game.undo().unwrap();
        assert!(game.can_perform(HIRE));
        game.undo().unwrap();
        assert_eq!(*game.state(), 0);
        assert!(matches!(game.undo(), Err(TurnError::NothingToUndo)));
    }

    #[test]
    fn test_end_turn_requires_mandatory_done() {
        let mut game = controller();
        assert!(matches!(
            game.end_turn(),
            Err(TurnError::Sequence(SequenceError::CannotSkipAction))
        ));

        game.force_end_turn().unwrap();
        assert_eq!(game.active_player(), PlayerId::new(1));
        assert_eq!(
            game.events().iter().map(|event| event.kind).collect::<Vec<_>>(),
            vec![
                TurnEventKind::BeginTurn,
                TurnEventKind::EndTurn { forced: true },
                TurnEventKind::BeginTurn,
            ]
        );
    }

    #[test]
    fn test_game_over_blocks_requests() {
        let mut game = controller();
        assert_eq!(game.perform(MOVE, &10).unwrap(), TurnStatus::GameOver);

        assert!(game.is_game_over());
        assert!(game.possible_kinds().is_empty());
        assert!(matches!(game.perform(MOVE, &1), Err(TurnError::GameOver)));
        assert!(matches!(game.skip(), Err(TurnError::GameOver)));
    }

    #[test]
    fn test_undo_depth_is_capped() {
        let config = TurnConfig::default().with_max_undo_depth(1);
        let mut game = TurnController::new(Counter, config, 0).unwrap();

        game.perform(MOVE, &2).unwrap();
        game.skip().unwrap();
        assert_eq!(game.undo_depth(), 1);
    }

    #[test]
    fn test_save_and_resume() {
        let mut game = controller();
        game.perform(MOVE, &2).unwrap();

        let bytes = game.save().unwrap();
        let resumed = TurnController::resume(Counter, TurnConfig::default(), &bytes).unwrap();

        assert_eq!(resumed.snapshot(), game.snapshot());
        assert!(!resumed.can_undo());
    }

    /// Seats listed in the state must move; the others have nothing to do.
    struct Seats;

    impl TurnRules for Seats {
        type State = Vec<PlayerId>;
        type Payload = ();

        fn begin_turn(&self, active: &mut Vec<PlayerId>, player: PlayerId) -> FollowUps {
            if active.contains(&player) {
                FollowUps::of(ActionNode::mandatory(MOVE))
            } else {
                FollowUps::none()
            }
        }

        fn execute(
            &self,
            _ctx: EffectContext<'_, Vec<PlayerId>>,
            _kind: ActionKind,
            _payload: &(),
        ) -> Result<FollowUps, TurnError> {
            Ok(FollowUps::none())
        }
    }

    #[test]
    fn test_idle_seat_is_passed() {
        let active = vec![PlayerId::new(0), PlayerId::new(2)];
        let mut game = TurnController::new(Seats, TurnConfig::new(3), active).unwrap();

        let status = game.perform(MOVE, &()).unwrap();
        assert_eq!(
            status,
            TurnStatus::TurnEnded {
                ended: PlayerId::new(0),
                next: PlayerId::new(2)
            }
        );
        assert_eq!(game.turn(), 3);
        assert!(game.can_perform(MOVE));

        let kinds: Vec<_> = game.events().iter().map(|event| (event.player.index(), event.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, TurnEventKind::BeginTurn),
                (0, TurnEventKind::Performed(MOVE)),
                (0, TurnEventKind::EndTurn { forced: false }),
                (1, TurnEventKind::BeginTurn),
                (1, TurnEventKind::EndTurn { forced: false }),
                (2, TurnEventKind::BeginTurn),
            ]
        );
    }

    #[test]
    fn test_idle_first_seat_is_passed() {
        let game = TurnController::new(Seats, TurnConfig::default(), vec![PlayerId::new(1)]).unwrap();

        assert_eq!(game.active_player(), PlayerId::new(1));
        assert_eq!(game.turn(), 2);
        assert!(game.can_perform(MOVE));
    }

    #[test]
    fn test_passing_stops_after_one_round() {
        let mut game = TurnController::new(Seats, TurnConfig::default(), Vec::new()).unwrap();

        assert_eq!(game.active_player(), PlayerId::new(0));
        assert_eq!(game.turn(), 3);
        assert!(game.possible_kinds().is_empty());
        assert_eq!(game.status(), TurnStatus::WaitingForAction);

        assert!(matches!(game.end_turn(), Ok(TurnStatus::TurnEnded { .. })));
        assert_eq!(game.turn(), 6);
    }

    #[test]
    fn test_resume_rejects_unknown_player() {
        let config = TurnConfig::new(3).with_first_player(PlayerId::new(2));
        let game = TurnController::new(Counter, config, 0).unwrap();
        let bytes = game.save().unwrap();

        let result = TurnController::resume(Counter, TurnConfig::default(), &bytes);
        assert!(matches!(result, Err(TurnError::Sequence(_))));
    }
}
