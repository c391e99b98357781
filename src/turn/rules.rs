//! Rules trait for game implementations.
//!
//! Games implement `TurnRules` to plug their domain effects into the turn
//! controller:
//! - Which obligations a player starts the turn with
//! - What an action does, and which follow-ups it declares
//! - Which options stay open outside the sequencer
//! - When the game is over
//!
//! The controller calls into `TurnRules` but never interprets what a kind
//! means. All mutable game data lives in `State`, so undo snapshots cover it.

use smallvec::SmallVec;

use crate::actions::{ActionNode, KindSet};
use crate::core::{ActionKind, PlayerId};
use crate::sequencer::ActionSequencer;

use super::error::TurnError;

/// Everything an effect may look at or change.
///
/// Passed explicitly to [`TurnRules::execute`] instead of being captured, so
/// the effect can only touch the game state it is handed.
pub struct EffectContext<'a, S> {
    /// Domain game state (mutable).
    pub state: &'a mut S,

    /// Player performing the action.
    pub player: PlayerId,

    /// Turn number (starts at 1).
    pub turn: u32,

    /// Pending obligations, before this action is consumed.
    pub sequencer: &'a ActionSequencer,
}

/// Obligations declared by one effect.
///
/// Nodes are pushed ahead of every pending obligation, keeping their order
/// here. Anytime kinds become performable once at any point of the turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FollowUps {
    nodes: SmallVec<[ActionNode; 2]>,
    anytime: SmallVec<[ActionKind; 2]>,
}

impl FollowUps {
    /// No follow-ups.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single follow-up obligation.
    pub fn of(node: ActionNode) -> Self {
        Self::none().then(node)
    }

    /// Add an obligation after the ones already declared.
    #[must_use]
    pub fn then(mut self, node: ActionNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Grant a kind performable at any time this turn.
    #[must_use]
    pub fn with_anytime(mut self, kind: ActionKind) -> Self {
        self.anytime.push(kind);
        self
    }

    /// Declared obligations, in order.
    #[must_use]
    pub fn nodes(&self) -> &[ActionNode] {
        &self.nodes
    }

    /// Declared anytime kinds.
    #[must_use]
    pub fn anytime(&self) -> &[ActionKind] {
        &self.anytime
    }

    /// Check if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.anytime.is_empty()
    }

    pub(crate) fn apply_to(self, sequencer: &mut ActionSequencer) {
        sequencer.push_front(self.nodes);
        for kind in self.anytime {
            sequencer.add_anytime(kind);
        }
    }
}

impl From<ActionNode> for FollowUps {
    fn from(node: ActionNode) -> Self {
        Self::of(node)
    }
}

/// Rules trait.
///
/// ## Implementation Notes
///
/// - `execute` must leave `state` untouched when it returns an error; the
///   controller restores its snapshot anyway, so partial writes are harmless.
/// - Keep every mutable value in `State`: rules are borrowed immutably so
///   undo can restore the whole position.
/// - `deferred_options` is consulted on every end-of-turn check; keep it cheap.
pub trait TurnRules {
    /// Domain game state. Cloned for every undo snapshot; persistent
    /// collections keep that cheap.
    type State: Clone;

    /// Parameters of a request (targets, amounts, ...).
    type Payload;

    /// Obligations for `player` at the start of their turn.
    ///
    /// A turn that begins with no obligations and no deferred option is
    /// passed on to the next player.
    fn begin_turn(&self, state: &mut Self::State, player: PlayerId) -> FollowUps;

    /// Run the domain effect of `kind` and declare its follow-ups.
    fn execute(
        &self,
        ctx: EffectContext<'_, Self::State>,
        kind: ActionKind,
        payload: &Self::Payload,
    ) -> Result<FollowUps, TurnError>;

    /// Kinds the player may still perform outside the sequencer.
    ///
    /// While any remain, the turn does not end on its own, even with an
    /// empty sequencer.
    fn deferred_options(
        &self,
        _state: &Self::State,
        _player: PlayerId,
        _sequencer: &ActionSequencer,
    ) -> KindSet {
        KindSet::new()
    }

    /// Domain cleanup when `player`'s turn ends (refill hands, ...).
    fn end_turn(&self, _state: &mut Self::State, _player: PlayerId) {}

    /// Check if the game has ended. Consulted after every turn.
    fn is_game_over(&self, _state: &Self::State) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ActionKind = ActionKind::new(0);
    const B: ActionKind = ActionKind::new(1);
    const C: ActionKind = ActionKind::new(2);

    #[test]
    fn test_follow_ups_builder() {
        let follow_ups = FollowUps::of(ActionNode::mandatory(A))
            .then(ActionNode::optional(B))
            .with_anytime(C);

        assert_eq!(follow_ups.nodes().len(), 2);
        assert_eq!(follow_ups.anytime(), &[C]);
        assert!(!follow_ups.is_empty());
        assert!(FollowUps::none().is_empty());
    }

    #[test]
    fn test_follow_ups_interrupt_pending() {
        let mut sequencer = ActionSequencer::with_roots([ActionNode::mandatory(C)]);

        FollowUps::of(ActionNode::mandatory(A))
            .then(ActionNode::mandatory(B))
            .apply_to(&mut sequencer);

        assert!(sequencer.can_perform(A));
        sequencer.perform(A).unwrap();
        assert!(sequencer.can_perform(B));
        sequencer.perform(B).unwrap();
        assert!(sequencer.can_perform(C));
    }
}
