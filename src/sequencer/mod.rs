//! The per-turn obligation queue.
//!
//! An [`ActionSequencer`] holds the root obligations of the current turn in
//! order, plus a set of *anytime* kinds.
//!
//! ## Ordering
//!
//! - Only the front root is reachable. Independently pushed obligations are
//!   therefore resolved one after the other, never interleaved.
//! - Follow-ups are pushed to the front: they interrupt whatever was pending
//!   and must be resolved first.
//! - Anytime kinds are legal regardless of the front root and are consumed
//!   once performed.
//!
//! The sequencer is empty (no roots, no anytime kinds) exactly when the turn
//! has no obligations left.
//!
//! ## Example
//!
//! ```
//! use turn_sequencer::actions::ActionNode;
//! use turn_sequencer::core::ActionKind;
//! use turn_sequencer::sequencer::ActionSequencer;
//!
//! let (build, hire, bonus) = (ActionKind::new(0), ActionKind::new(1), ActionKind::new(2));
//!
//! let mut sequencer = ActionSequencer::new();
//! sequencer.push_back(ActionNode::mandatory(build));
//!
//! sequencer.perform(build).unwrap();
//! // The building grants a hire, which comes before anything else.
//! sequencer.push_front([ActionNode::optional(hire)]);
//! sequencer.add_anytime(bonus);
//!
//! assert!(sequencer.can_perform(hire));
//! assert!(sequencer.can_perform(bonus));
//!
//! sequencer.skip().unwrap();
//! sequencer.perform(bonus).unwrap();
//! assert!(sequencer.is_empty());
//! ```

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actions::{ActionNode, KindSet};
use crate::core::{ActionKind, SequenceError};

/// Ordered root obligations plus anytime kinds.
///
/// Backed by persistent `im` collections: cloning is O(1) and the clone is
/// fully independent, which makes snapshots for undo cheap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSequencer {
    /// Root obligations (front = active).
    roots: Vector<ActionNode>,

    /// Kinds performable regardless of the front root.
    anytime: KindSet,
}

impl ActionSequencer {
    /// Create an empty sequencer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequencer with the given roots, front first.
    pub fn with_roots(roots: impl IntoIterator<Item = ActionNode>) -> Self {
        let mut sequencer = Self::new();
        for node in roots {
            sequencer.push_back(node);
        }
        sequencer
    }

    // === Queries ===

    /// The active obligation.
    #[must_use]
    pub fn front(&self) -> Option<&ActionNode> {
        self.roots.front()
    }

    /// All root obligations, front first.
    pub fn roots(&self) -> impl Iterator<Item = &ActionNode> {
        self.roots.iter()
    }

    /// Kinds currently performable at any time.
    #[must_use]
    pub fn anytime(&self) -> &KindSet {
        &self.anytime
    }

    /// Number of root obligations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// No obligations and no anytime kinds: the turn is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.anytime.is_empty()
    }

    /// Check if `kind` is legal right now.
    #[must_use]
    pub fn can_perform(&self, kind: ActionKind) -> bool {
        self.anytime.contains(&kind) || self.front().is_some_and(|front| front.can_perform(kind))
    }

    /// Anytime kinds plus whatever the front root allows.
    #[must_use]
    pub fn possible_kinds(&self) -> KindSet {
        let mut kinds = self.anytime.clone();
        if let Some(front) = self.front() {
            front.collect_kinds(&mut kinds);
        }
        kinds
    }

    // === Mutation ===

    /// Perform `kind`.
    ///
    /// An anytime kind is consumed without touching any node. Otherwise the
    /// front root performs it and is removed once completed.
    pub fn perform(&mut self, kind: ActionKind) -> Result<(), SequenceError> {
        if self.anytime.remove(&kind).is_some() {
            trace!(%kind, "consumed anytime action");
            return Ok(());
        }

        let front = self
            .roots
            .front_mut()
            .ok_or(SequenceError::CannotPerformAction { kind })?;
        front.perform(kind)?;

        if front.is_completed() {
            self.roots.pop_front();
            trace!(%kind, remaining = self.roots.len(), "obligation completed");
        }
        Ok(())
    }

    /// Skip the front root.
    ///
    /// Propagates `CannotSkipAction` unchanged; also fails when nothing is
    /// pending.
    pub fn skip(&mut self) -> Result<(), SequenceError> {
        let front = self.roots.front_mut().ok_or(SequenceError::CannotSkipAction)?;
        front.skip()?;

        if front.is_completed() {
            self.roots.pop_front();
            trace!(remaining = self.roots.len(), "obligation skipped");
        }
        Ok(())
    }

    /// Skip every root and drop all anytime kinds.
    ///
    /// All or nothing: if some root refuses to be skipped, the sequencer is
    /// left exactly as it was.
    pub fn skip_all(&mut self) -> Result<(), SequenceError> {
        let mut scratch = self.roots.clone();
        while let Some(front) = scratch.front_mut() {
            front.skip()?;
            if front.is_completed() {
                scratch.pop_front();
            }
        }

        self.roots = scratch;
        self.anytime.clear();
        Ok(())
    }

    /// Push follow-ups ahead of every pending obligation.
    ///
    /// The given order is kept: the first node becomes the new front.
    /// Nodes that are already completed are dropped.
    pub fn push_front(&mut self, nodes: impl IntoIterator<Item = ActionNode>) {
        let nodes: Vec<ActionNode> = nodes.into_iter().filter(|node| !node.is_completed()).collect();
        if nodes.is_empty() {
            return;
        }

        trace!(count = nodes.len(), "pushing follow-ups");
        for node in nodes.into_iter().rev() {
            self.roots.push_front(node);
        }
    }

    /// Queue an obligation behind every pending one.
    pub fn push_back(&mut self, node: ActionNode) {
        if !node.is_completed() {
            self.roots.push_back(node);
        }
    }

    /// Allow `kind` once, at any point of the turn.
    pub fn add_anytime(&mut self, kind: ActionKind) {
        self.anytime.insert(kind);
    }

    /// Drop every obligation unconditionally.
    pub fn clear(&mut self) {
        self.roots.clear();
        self.anytime.clear();
    }

    /// Re-check every root, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.roots.iter().any(ActionNode::is_completed) {
            return Err(SequenceError::illegal("completed obligation left in sequencer"));
        }
        self.roots.iter().try_for_each(ActionNode::validate)
    }
}
