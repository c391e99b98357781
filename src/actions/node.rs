//! The obligation tree.

use serde::{Deserialize, Serialize};

use crate::core::{ActionKind, SequenceError};

use super::{Any, Choice, KindSet, Repeat, Single, WhenThen};

/// One obligation, or a combinator of obligations.
///
/// Nodes are built by the domain layer as the follow-ups of a performed
/// action, mutated in place by `perform`/`skip`, and dropped once completed.
///
/// Every `perform`/`skip` is atomic: the whole subtree is checked first and
/// only then mutated, so a failed call leaves the node exactly as it was.
///
/// `Clone` is a deep, independent copy (children live in persistent `im`
/// collections or boxes), which is what templates and undo snapshots rely on.
///
/// ## Example
///
/// ```
/// use turn_sequencer::actions::ActionNode;
/// use turn_sequencer::core::ActionKind;
///
/// let (a, b) = (ActionKind::new(0), ActionKind::new(1));
///
/// // Pick exactly one of A or B.
/// let mut node = ActionNode::choice([a, b]).unwrap();
/// node.perform(b).unwrap();
/// assert!(node.is_completed());
/// assert!(node.perform(a).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionNode {
    Single(Single),
    Choice(Choice),
    Any(Any),
    Repeat(Repeat),
    WhenThen(WhenThen),
}

impl ActionNode {
    // === Construction ===

    /// The player MUST perform `kind`.
    #[must_use]
    pub fn mandatory(kind: ActionKind) -> Self {
        Self::Single(Single::new(kind, true))
    }

    /// The player MAY perform `kind` or skip it.
    #[must_use]
    pub fn optional(kind: ActionKind) -> Self {
        Self::Single(Single::new(kind, false))
    }

    /// The player MUST perform EXACTLY ONE of `kinds` (at least 2 distinct).
    pub fn choice(kinds: impl IntoIterator<Item = ActionKind>) -> Result<Self, SequenceError> {
        Choice::new(kinds).map(Self::Choice)
    }

    /// The player MAY resolve none, some, or all of `children`, in any order.
    pub fn any(children: impl IntoIterator<Item = ActionNode>) -> Result<Self, SequenceError> {
        Any::new(children).map(Self::Any)
    }

    /// `any` over optional singles.
    pub fn any_of(kinds: impl IntoIterator<Item = ActionKind>) -> Result<Self, SequenceError> {
        Self::any(kinds.into_iter().map(Self::optional))
    }

    /// Make a whole subtree optional: it can be abandoned before it starts.
    pub fn optional_node(node: ActionNode) -> Result<Self, SequenceError> {
        Any::from_single_child(node).map(Self::Any)
    }

    /// Resolve `template` between `at_least` and `at_most` times.
    pub fn repeat(at_least: u32, at_most: u32, template: ActionNode) -> Result<Self, SequenceError> {
        Repeat::new(at_least, at_most, template).map(Self::Repeat)
    }

    /// Up to `at_most` rounds of `when`, each earning one `then`.
    pub fn when_then(
        when: ActionNode,
        then: ActionNode,
        at_least: u32,
        at_most: u32,
    ) -> Result<Self, SequenceError> {
        WhenThen::new(when, then, at_least, at_most).map(Self::WhenThen)
    }

    // === Queries ===

    /// Check if `kind` can be performed right now.
    #[must_use]
    pub fn can_perform(&self, kind: ActionKind) -> bool {
        match self {
            Self::Single(node) => node.can_perform(kind),
            Self::Choice(node) => node.can_perform(kind),
            Self::Any(node) => node.can_perform(kind),
            Self::Repeat(node) => node.can_perform(kind),
            Self::WhenThen(node) => node.can_perform(kind),
        }
    }

    /// Check if `skip` would succeed.
    #[must_use]
    pub fn can_skip(&self) -> bool {
        match self {
            Self::Single(node) => node.can_skip(),
            Self::Choice(node) => node.can_skip(),
            Self::Any(node) => node.can_skip(),
            Self::Repeat(node) => node.can_skip(),
            Self::WhenThen(node) => node.can_skip(),
        }
    }

    /// Check if nothing is left to resolve.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        match self {
            Self::Single(node) => node.is_completed(),
            Self::Choice(node) => node.is_completed(),
            Self::Any(node) => node.is_completed(),
            Self::Repeat(node) => node.is_completed(),
            Self::WhenThen(node) => node.is_completed(),
        }
    }

    /// All kinds that can be performed next.
    #[must_use]
    pub fn possible_kinds(&self) -> KindSet {
        let mut kinds = KindSet::new();
        self.collect_kinds(&mut kinds);
        kinds
    }

    // === Mutation ===

    /// Perform `kind`.
    ///
    /// Fails with `CannotPerformAction` (and changes nothing) if `kind` is
    /// not legal at this node.
    pub fn perform(&mut self, kind: ActionKind) -> Result<(), SequenceError> {
        if !self.can_perform(kind) {
            return Err(SequenceError::cannot_perform(kind));
        }
        self.apply_perform(kind);
        Ok(())
    }

    /// Skip whatever is pending here.
    ///
    /// Fails with `CannotSkipAction` (and changes nothing) for mandatory
    /// obligations and unmet minimums.
    pub fn skip(&mut self) -> Result<(), SequenceError> {
        if !self.can_skip() {
            return Err(SequenceError::CannotSkipAction);
        }
        self.apply_skip();
        Ok(())
    }

    /// Re-check the construction rules over the whole tree.
    ///
    /// Constructors already enforce them; call this on trees that were
    /// deserialized.
    pub fn validate(&self) -> Result<(), SequenceError> {
        match self {
            Self::Single(_) => Ok(()),
            Self::Choice(node) => node.validate(),
            Self::Any(node) => node.validate(),
            Self::Repeat(node) => node.validate(),
            Self::WhenThen(node) => node.validate(),
        }
    }

    // === Internal, precondition-checked by the callers above ===

    pub(crate) fn apply_perform(&mut self, kind: ActionKind) {
        match self {
            Self::Single(node) => node.apply_perform(kind),
            Self::Choice(node) => node.apply_perform(kind),
            Self::Any(node) => node.apply_perform(kind),
            Self::Repeat(node) => node.apply_perform(kind),
            Self::WhenThen(node) => node.apply_perform(kind),
        }
    }

    pub(crate) fn apply_skip(&mut self) {
        match self {
            Self::Single(node) => node.apply_skip(),
            // A choice is never skippable; callers check `can_skip` first.
            Self::Choice(_) => {}
            Self::Any(node) => node.apply_skip(),
            Self::Repeat(node) => node.apply_skip(),
            Self::WhenThen(node) => node.apply_skip(),
        }
    }

    pub(crate) fn collect_kinds(&self, out: &mut KindSet) {
        match self {
            Self::Single(node) => node.collect_kinds(out),
            Self::Choice(node) => node.collect_kinds(out),
            Self::Any(node) => node.collect_kinds(out),
            Self::Repeat(node) => node.collect_kinds(out),
            Self::WhenThen(node) => node.collect_kinds(out),
        }
    }
}

impl From<Single> for ActionNode {
    fn from(node: Single) -> Self {
        Self::Single(node)
    }
}

impl From<Choice> for ActionNode {
    fn from(node: Choice) -> Self {
        Self::Choice(node)
    }
}

impl From<Any> for ActionNode {
    fn from(node: Any) -> Self {
        Self::Any(node)
    }
}

impl From<Repeat> for ActionNode {
    fn from(node: Repeat) -> Self {
        Self::Repeat(node)
    }
}

impl From<WhenThen> for ActionNode {
    fn from(node: WhenThen) -> Self {
        Self::WhenThen(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ActionKind = ActionKind::new(0);
    const B: ActionKind = ActionKind::new(1);
    const C: ActionKind = ActionKind::new(2);

    #[test]
    fn test_failed_perform_changes_nothing() {
        let mut node = ActionNode::repeat(1, 2, ActionNode::any_of([A, B]).unwrap()).unwrap();
        node.perform(A).unwrap();
        let before = node.clone();

        assert_eq!(node.perform(A), Err(SequenceError::CannotPerformAction { kind: A }));
        assert_eq!(node, before);
    }

    #[test]
    fn test_failed_skip_changes_nothing() {
        // The current repetition has an unmet minimum, so it cannot be skipped.
        let template = ActionNode::repeat(2, 2, ActionNode::mandatory(A)).unwrap();
        let mut node = ActionNode::repeat(0, 2, template).unwrap();
        node.perform(A).unwrap();
        let before = node.clone();

        assert_eq!(node.skip(), Err(SequenceError::CannotSkipAction));
        assert_eq!(node, before);
    }

    #[test]
    fn test_optional_node_can_be_dropped_unstarted() {
        let mut node = ActionNode::optional_node(ActionNode::mandatory(C)).unwrap();
        assert!(node.can_skip());
        node.skip().unwrap();
        assert!(node.is_completed());
    }

    #[test]
    fn test_possible_kinds_nested() {
        let node = ActionNode::any([
            ActionNode::choice([A, B]).unwrap(),
            ActionNode::optional(C),
        ])
        .unwrap();

        let kinds: Vec<_> = node.possible_kinds().into_iter().collect();
        assert_eq!(kinds, vec![A, B, C]);
    }

    #[test]
    fn test_serialization_is_tagged() {
        let node = ActionNode::mandatory(A);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "single": { "kind": 0, "mandatory": true, "completed": false } })
        );
    }
}
