//! Paired obligations: every `when` earns one `then`.

use serde::{Deserialize, Serialize};

use crate::core::{ActionKind, SequenceError};

use super::repeat::{check_bounds, check_open};
use super::{ActionNode, KindSet};

/// Which half of a [`WhenThen`] the in-progress child belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    When,
    Then,
}

/// The child of a [`WhenThen`] currently being resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenThenStep {
    pub branch: Branch,
    pub node: Box<ActionNode>,
}

/// Up to `at_most` rounds of `when`, each unlocking one `then`.
///
/// Invariant: `thens <= whens <= at_most`. A `then` can only start while
/// `thens < whens`. When both halves could start, a pending `then` is
/// preferred. Skipping requires at least `at_least` whens and every earned
/// then to be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenThen {
    when: Box<ActionNode>,
    then: Box<ActionNode>,
    at_least: u32,
    at_most: u32,
    whens: u32,
    thens: u32,
    current: Option<WhenThenStep>,
    /// Closed early by a successful skip.
    skipped: bool,
}

impl WhenThen {
    pub(crate) fn new(
        when: ActionNode,
        then: ActionNode,
        at_least: u32,
        at_most: u32,
    ) -> Result<Self, SequenceError> {
        check_bounds(at_least, at_most)?;
        check_open(&when, "when")?;
        check_open(&then, "then")?;
        Ok(Self {
            when: Box::new(when),
            then: Box::new(then),
            at_least,
            at_most,
            whens: 0,
            thens: 0,
            current: None,
            skipped: false,
        })
    }

    /// Completed `when` rounds.
    #[must_use]
    pub fn whens(&self) -> u32 {
        self.whens
    }

    /// Completed `then` rounds.
    #[must_use]
    pub fn thens(&self) -> u32 {
        self.thens
    }

    /// The child in progress, if any.
    #[must_use]
    pub fn current(&self) -> Option<&WhenThenStep> {
        self.current.as_ref()
    }

    fn can_start_then(&self, kind: ActionKind) -> bool {
        self.thens < self.whens && self.then.can_perform(kind)
    }

    fn can_start_when(&self, kind: ActionKind) -> bool {
        self.whens < self.at_most && self.when.can_perform(kind)
    }

    /// Counters as they would be once the in-progress child is finished.
    fn settled_counts(&self) -> (u32, u32) {
        match self.current.as_ref().map(|step| step.branch) {
            Some(Branch::When) => (self.whens + 1, self.thens),
            Some(Branch::Then) => (self.whens, self.thens + 1),
            None => (self.whens, self.thens),
        }
    }

    pub(crate) fn can_perform(&self, kind: ActionKind) -> bool {
        if self.skipped {
            return false;
        }
        match &self.current {
            Some(step) => step.node.can_perform(kind),
            None => self.can_start_then(kind) || self.can_start_when(kind),
        }
    }

    pub(crate) fn can_skip(&self) -> bool {
        if let Some(step) = &self.current {
            if !step.node.can_skip() {
                return false;
            }
        }
        let (whens, thens) = self.settled_counts();
        whens >= self.at_least && thens == whens
    }

    pub(crate) fn apply_perform(&mut self, kind: ActionKind) {
        if self.current.is_none() {
            let step = if self.can_start_then(kind) {
                WhenThenStep {
                    branch: Branch::Then,
                    node: self.then.clone(),
                }
            } else {
                WhenThenStep {
                    branch: Branch::When,
                    node: self.when.clone(),
                }
            };
            self.current = Some(step);
        }

        let Some(step) = self.current.as_mut() else {
            return;
        };
        step.node.apply_perform(kind);

        if step.node.is_completed() {
            self.finish_current();
        }
    }

    pub(crate) fn apply_skip(&mut self) {
        if let Some(step) = self.current.as_mut() {
            step.node.apply_skip();
        }
        self.finish_current();
        self.skipped = true;
    }

    fn finish_current(&mut self) {
        (self.whens, self.thens) = self.settled_counts();
        self.current = None;
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.skipped || (self.current.is_none() && self.whens == self.at_most && self.thens == self.whens)
    }

    pub(crate) fn collect_kinds(&self, out: &mut KindSet) {
        if self.skipped {
            return;
        }
        if let Some(step) = &self.current {
            step.node.collect_kinds(out);
            return;
        }
        if self.thens < self.whens {
            self.then.collect_kinds(out);
        }
        if self.whens < self.at_most {
            self.when.collect_kinds(out);
        }
    }

    pub(crate) fn validate(&self) -> Result<(), SequenceError> {
        check_bounds(self.at_least, self.at_most)?;
        if self.thens > self.whens || self.whens > self.at_most {
            return Err(SequenceError::illegal("when/then counters out of range"));
        }
        if let Some(step) = &self.current {
            let startable = match step.branch {
                Branch::When => self.whens < self.at_most,
                Branch::Then => self.thens < self.whens,
            };
            if !startable {
                return Err(SequenceError::illegal("when/then step cannot be in progress"));
            }
            check_open(&step.node, "when/then step in progress")?;
            step.node.validate()?;
        }
        check_open(&self.when, "when")?;
        check_open(&self.then, "then")?;
        self.when.validate()?;
        self.then.validate()
    }
}
