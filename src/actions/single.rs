//! A single obligation: one kind, performed once.

use serde::{Deserialize, Serialize};

use crate::core::ActionKind;

use super::KindSet;

/// One action kind that may (or must) be performed once.
///
/// A mandatory single can only be completed by performing it; an optional
/// one can also be skipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Single {
    kind: ActionKind,
    mandatory: bool,
    completed: bool,
}

impl Single {
    pub(crate) fn new(kind: ActionKind, mandatory: bool) -> Self {
        Self {
            kind,
            mandatory,
            completed: false,
        }
    }

    /// The kind this obligation waits for.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Whether `skip` is refused.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub(crate) fn can_perform(&self, kind: ActionKind) -> bool {
        !self.completed && self.kind == kind
    }

    pub(crate) fn can_skip(&self) -> bool {
        !self.mandatory
    }

    pub(crate) fn apply_perform(&mut self, kind: ActionKind) {
        debug_assert!(self.can_perform(kind));
        self.completed = true;
    }

    pub(crate) fn apply_skip(&mut self) {
        debug_assert!(self.can_skip());
        self.completed = true;
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn collect_kinds(&self, out: &mut KindSet) {
        if !self.completed {
            out.insert(self.kind);
        }
    }
}
