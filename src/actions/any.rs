//! None, some, or all of a set of obligations, in any order.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{ActionKind, SequenceError};

use super::repeat::check_open;
use super::{ActionNode, KindSet};

/// The player may resolve the children in any order.
///
/// Once a child has been started it stays *current* until it completes (or
/// is skipped): only the current child is reachable in the meantime.
/// Completed children are removed; the node completes when none are left.
///
/// Skipping while a child is current abandons only that child. Skipping with
/// no child in progress abandons every remaining child at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Any {
    children: Vector<ActionNode>,
    current: Option<usize>,
}

impl Any {
    pub(crate) fn new(children: impl IntoIterator<Item = ActionNode>) -> Result<Self, SequenceError> {
        let children: Vector<ActionNode> = children.into_iter().collect();
        if children.is_empty() {
            return Err(SequenceError::illegal("any needs at least 1 child"));
        }
        children.iter().try_for_each(|child| check_open(child, "any child"))?;
        Ok(Self {
            children,
            current: None,
        })
    }

    pub(crate) fn from_single_child(child: ActionNode) -> Result<Self, SequenceError> {
        check_open(&child, "optional node")?;
        Ok(Self {
            children: Vector::unit(child),
            current: None,
        })
    }

    /// Children not yet resolved.
    pub fn children(&self) -> impl Iterator<Item = &ActionNode> {
        self.children.iter()
    }

    /// The child in progress, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ActionNode> {
        self.current.and_then(|index| self.children.get(index))
    }

    pub(crate) fn can_perform(&self, kind: ActionKind) -> bool {
        match self.current() {
            Some(child) => child.can_perform(kind),
            None => self.children.iter().any(|child| child.can_perform(kind)),
        }
    }

    pub(crate) fn can_skip(&self) -> bool {
        self.current().map_or(true, ActionNode::can_skip)
    }

    pub(crate) fn apply_perform(&mut self, kind: ActionKind) {
        let Some(index) = self
            .current
            .or_else(|| self.children.iter().position(|child| child.can_perform(kind)))
        else {
            debug_assert!(false, "apply_perform called without can_perform");
            return;
        };

        let child = &mut self.children[index];
        child.apply_perform(kind);

        if child.is_completed() {
            self.children.remove(index);
            self.current = None;
        } else {
            self.current = Some(index);
        }
    }

    pub(crate) fn apply_skip(&mut self) {
        match self.current.take() {
            Some(index) => {
                if let Some(child) = self.children.get_mut(index) {
                    child.apply_skip();
                }
                self.children.remove(index);
            }
            None => self.children.clear(),
        }
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn collect_kinds(&self, out: &mut KindSet) {
        match self.current() {
            Some(child) => child.collect_kinds(out),
            None => self.children.iter().for_each(|child| child.collect_kinds(out)),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), SequenceError> {
        if let Some(index) = self.current {
            if index >= self.children.len() {
                return Err(SequenceError::illegal("any points past its children"));
            }
        }
        self.children.iter().try_for_each(|child| {
            check_open(child, "any child")?;
            child.validate()
        })
    }
}
