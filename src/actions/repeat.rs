//! The same obligation, several times.

use serde::{Deserialize, Serialize};

use crate::core::{ActionKind, SequenceError};

use super::{ActionNode, KindSet};

/// Resolve `template` between `at_least` and `at_most` times.
///
/// Each repetition works on a fresh clone of the template. The node completes
/// on its own after `at_most` repetitions; skipping (allowed once `at_least`
/// repetitions are done) abandons the remaining ones as a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repeat {
    at_least: u32,
    at_most: u32,
    template: Box<ActionNode>,
    current: Option<Box<ActionNode>>,
    count: u32,
}

impl Repeat {
    pub(crate) fn new(at_least: u32, at_most: u32, template: ActionNode) -> Result<Self, SequenceError> {
        check_bounds(at_least, at_most)?;
        check_open(&template, "repeat template")?;
        Ok(Self {
            at_least,
            at_most,
            template: Box::new(template),
            current: None,
            count: 0,
        })
    }

    /// Minimum number of repetitions before skipping is allowed.
    #[must_use]
    pub fn at_least(&self) -> u32 {
        self.at_least
    }

    /// Maximum number of repetitions.
    #[must_use]
    pub fn at_most(&self) -> u32 {
        self.at_most
    }

    /// Completed repetitions.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The repetition in progress, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ActionNode> {
        self.current.as_deref()
    }

    pub(crate) fn can_perform(&self, kind: ActionKind) -> bool {
        if self.count >= self.at_most {
            return false;
        }
        match &self.current {
            Some(current) => current.can_perform(kind),
            None => self.template.can_perform(kind),
        }
    }

    pub(crate) fn can_skip(&self) -> bool {
        self.count >= self.at_least && self.current.as_deref().map_or(true, ActionNode::can_skip)
    }

    pub(crate) fn apply_perform(&mut self, kind: ActionKind) {
        let template = &self.template;
        let current = self.current.get_or_insert_with(|| template.clone());
        current.apply_perform(kind);

        if current.is_completed() {
            self.current = None;
            self.count += 1;
        }
    }

    pub(crate) fn apply_skip(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.apply_skip();
        }
        self.count = self.at_most;
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.count >= self.at_most
    }

    pub(crate) fn collect_kinds(&self, out: &mut KindSet) {
        if self.is_completed() {
            return;
        }
        match &self.current {
            Some(current) => current.collect_kinds(out),
            None => self.template.collect_kinds(out),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), SequenceError> {
        check_bounds(self.at_least, self.at_most)?;
        if self.count > self.at_most {
            return Err(SequenceError::illegal("repeat count exceeds at_most"));
        }
        check_open(&self.template, "repeat template")?;
        self.template.validate()?;
        match &self.current {
            Some(current) => {
                check_open(current, "repeat round in progress")?;
                current.validate()
            }
            None => Ok(()),
        }
    }
}

/// A completed node offers nothing to perform or skip; wrapping one would
/// leave its parent stuck.
pub(super) fn check_open(node: &ActionNode, what: &str) -> Result<(), SequenceError> {
    if node.is_completed() {
        return Err(SequenceError::illegal(format!("{what} is already completed")));
    }
    Ok(())
}

pub(super) fn check_bounds(at_least: u32, at_most: u32) -> Result<(), SequenceError> {
    if at_most == 0 {
        return Err(SequenceError::illegal("at_most must be positive"));
    }
    if at_least > at_most {
        return Err(SequenceError::illegal(format!(
            "at_least ({at_least}) exceeds at_most ({at_most})"
        )));
    }
    Ok(())
}
