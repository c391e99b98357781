//! Sequencer integration tests.
//!
//! These tests verify ordering between root obligations, follow-up
//! interruption, anytime kinds, and that failed requests never mutate.

use proptest::prelude::*;

use turn_sequencer::actions::ActionNode;
use turn_sequencer::core::{ActionKind, SequenceError};
use turn_sequencer::sequencer::ActionSequencer;
use turn_sequencer::KindSet;

const A: ActionKind = ActionKind::new(0);
const B: ActionKind = ActionKind::new(1);
const C: ActionKind = ActionKind::new(2);
const D: ActionKind = ActionKind::new(3);
const X: ActionKind = ActionKind::new(4);
const Y: ActionKind = ActionKind::new(5);

/// A turn mixing every node variant.
fn mixed_turn() -> ActionSequencer {
    let mut sequencer = ActionSequencer::new();
    sequencer.push_back(ActionNode::mandatory(A));
    sequencer.push_back(
        ActionNode::any([
            ActionNode::choice([B, C]).unwrap(),
            ActionNode::optional(D),
            ActionNode::repeat(0, 2, ActionNode::optional(A)).unwrap(),
        ])
        .unwrap(),
    );
    sequencer.push_back(
        ActionNode::when_then(ActionNode::optional(X), ActionNode::mandatory(Y), 0, 2).unwrap(),
    );
    sequencer.add_anytime(D);
    sequencer
}

// =============================================================================
// Ordering
// =============================================================================

/// Performing the only mandatory obligation empties the sequencer.
#[test]
fn test_single_mandatory_root() {
    let mut sequencer = ActionSequencer::with_roots([ActionNode::mandatory(A)]);

    sequencer.perform(A).unwrap();
    assert!(sequencer.is_empty());
}

/// Roots are resolved front to back.
#[test]
fn test_roots_resolve_in_order() {
    let mut sequencer = ActionSequencer::with_roots([
        ActionNode::mandatory(A),
        ActionNode::optional(B),
        ActionNode::mandatory(C),
    ]);

    assert_eq!(sequencer.possible_kinds(), KindSet::unit(A));
    sequencer.perform(A).unwrap();
    assert_eq!(sequencer.possible_kinds(), KindSet::unit(B));
    sequencer.skip().unwrap();
    assert_eq!(sequencer.possible_kinds(), KindSet::unit(C));
    sequencer.perform(C).unwrap();
    assert!(sequencer.is_empty());
}

/// Follow-ups interrupt a root that is still in progress.
#[test]
fn test_follow_ups_interrupt_in_progress_root() {
    let mut sequencer =
        ActionSequencer::with_roots([ActionNode::repeat(2, 2, ActionNode::mandatory(A)).unwrap()]);

    sequencer.perform(A).unwrap();
    sequencer.push_front([ActionNode::mandatory(B)]);

    assert!(!sequencer.can_perform(A));
    sequencer.perform(B).unwrap();

    // Back to the interrupted repeat, one round left.
    sequencer.perform(A).unwrap();
    assert!(sequencer.is_empty());
}

/// Completed nodes are never queued.
#[test]
fn test_completed_nodes_are_dropped() {
    let mut done = ActionNode::optional(A);
    done.skip().unwrap();

    let mut sequencer = ActionSequencer::new();
    sequencer.push_back(done.clone());
    sequencer.push_front([done]);
    assert!(sequencer.is_empty());
}

// =============================================================================
// Anytime kinds
// =============================================================================

/// Anytime kinds keep the turn open and take precedence over the front root.
#[test]
fn test_anytime_precedence() {
    let mut sequencer = ActionSequencer::with_roots([ActionNode::optional(A)]);
    sequencer.add_anytime(A);

    sequencer.perform(A).unwrap();
    // The anytime grant was consumed; the root is still pending.
    assert_eq!(sequencer.len(), 1);
    assert!(sequencer.anytime().is_empty());

    sequencer.perform(A).unwrap();
    assert!(sequencer.is_empty());
}

/// Anytime kinds are included in the possible kinds.
#[test]
fn test_possible_kinds_include_anytime() {
    let sequencer = mixed_turn();
    assert_eq!(sequencer.possible_kinds(), KindSet::from(vec![A, D]));
}

// =============================================================================
// Ending the turn
// =============================================================================

/// skip_all refuses while the front is mandatory.
#[test]
fn test_skip_all_blocked_by_mandatory() {
    let mut sequencer = mixed_turn();
    let before = sequencer.clone();

    assert_eq!(sequencer.skip_all(), Err(SequenceError::CannotSkipAction));
    assert_eq!(sequencer, before);

    sequencer.perform(A).unwrap();
    sequencer.skip_all().unwrap();
    assert!(sequencer.is_empty());
}

/// skip_all refuses while a when/then pair is open, wherever it is queued.
#[test]
fn test_skip_all_blocked_by_unpaired_when() {
    let mut sequencer = ActionSequencer::with_roots([
        ActionNode::when_then(ActionNode::optional(X), ActionNode::mandatory(Y), 0, 2).unwrap(),
        ActionNode::optional(A),
    ]);
    sequencer.perform(X).unwrap();
    let before = sequencer.clone();

    assert!(sequencer.skip_all().is_err());
    assert_eq!(sequencer, before);
}

/// Persisted sequencers keep working where they left off.
#[test]
fn test_json_round_trip_mid_turn() {
    let mut sequencer = mixed_turn();
    sequencer.perform(A).unwrap();
    sequencer.perform(A).unwrap();

    let json = serde_json::to_string(&sequencer).unwrap();
    let mut back: ActionSequencer = serde_json::from_str(&json).unwrap();
    back.validate().unwrap();
    assert_eq!(back, sequencer);

    back.perform(A).unwrap();
    sequencer.perform(A).unwrap();
    assert_eq!(back, sequencer);
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Clone, Debug)]
enum Request {
    Perform(ActionKind),
    Skip,
}

fn request() -> impl Strategy<Value = Request> {
    prop_oneof![
        4 => (0u16..6).prop_map(|raw| Request::Perform(ActionKind::new(raw))),
        1 => Just(Request::Skip),
    ]
}

fn apply(sequencer: &mut ActionSequencer, request: &Request) -> Result<(), SequenceError> {
    match request {
        Request::Perform(kind) => sequencer.perform(*kind),
        Request::Skip => sequencer.skip(),
    }
}

proptest! {
    /// Failed requests leave the sequencer untouched.
    #[test]
    fn prop_failed_requests_do_not_mutate(requests in prop::collection::vec(request(), 0..40)) {
        let mut sequencer = mixed_turn();

        for request in &requests {
            let before = sequencer.clone();
            let possible = sequencer.possible_kinds();
            if apply(&mut sequencer, request).is_err() {
                prop_assert_eq!(&sequencer, &before);
                prop_assert_eq!(sequencer.possible_kinds(), possible);
            }
        }
    }

    /// A clone replaying the same requests ends in the same state, and the
    /// original is untouched by the clone's requests.
    #[test]
    fn prop_clone_replays_identically(requests in prop::collection::vec(request(), 0..40)) {
        let original = mixed_turn();
        let mut left = original.clone();
        let mut right = original.clone();

        for request in &requests {
            let left_result = apply(&mut left, request);
            let right_result = apply(&mut right, request);
            prop_assert_eq!(left_result, right_result);
        }

        prop_assert_eq!(&left, &right);
        prop_assert_eq!(original, mixed_turn());
    }

    /// Possible kinds predict which performs succeed.
    #[test]
    fn prop_possible_kinds_match_can_perform(requests in prop::collection::vec(request(), 0..40)) {
        let mut sequencer = mixed_turn();

        for request in &requests {
            let possible = sequencer.possible_kinds();
            for raw in 0u16..6 {
                let kind = ActionKind::new(raw);
                prop_assert_eq!(possible.contains(&kind), sequencer.can_perform(kind));
            }
            let _ = apply(&mut sequencer, request);
        }
    }
}
