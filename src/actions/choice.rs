//! Exactly one of several kinds.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ActionKind, SequenceError};

use super::KindSet;

/// The player must perform exactly one of the listed kinds.
///
/// Picking is atomic: the first member performed completes the whole node,
/// and the remaining members are discarded with it. A choice can never be
/// skipped as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Open members, sorted and de-duplicated. Empty once the choice is made.
    /// SmallVec keeps typical 2-4 way choices off the heap.
    kinds: SmallVec<[ActionKind; 4]>,
}

impl Choice {
    pub(crate) fn new(kinds: impl IntoIterator<Item = ActionKind>) -> Result<Self, SequenceError> {
        let mut kinds: SmallVec<[ActionKind; 4]> = kinds.into_iter().collect();
        kinds.sort_unstable();
        kinds.dedup();

        if kinds.len() < 2 {
            return Err(SequenceError::illegal("a choice needs at least 2 distinct kinds"));
        }

        Ok(Self { kinds })
    }

    /// The members still open.
    #[must_use]
    pub fn kinds(&self) -> &[ActionKind] {
        &self.kinds
    }

    pub(crate) fn can_perform(&self, kind: ActionKind) -> bool {
        self.kinds.binary_search(&kind).is_ok()
    }

    pub(crate) fn can_skip(&self) -> bool {
        false
    }

    pub(crate) fn apply_perform(&mut self, kind: ActionKind) {
        debug_assert!(self.can_perform(kind));
        self.kinds.clear();
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.kinds.is_empty()
    }

    pub(crate) fn collect_kinds(&self, out: &mut KindSet) {
        out.extend(self.kinds.iter().copied());
    }

    pub(crate) fn validate(&self) -> Result<(), SequenceError> {
        // Deserialized input may not be sorted; lookups rely on it.
        if !self.kinds.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(SequenceError::illegal("choice kinds must be sorted and distinct"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ActionKind = ActionKind::new(0);
    const B: ActionKind = ActionKind::new(1);
    const C: ActionKind = ActionKind::new(2);

    #[test]
    fn test_choice_normalizes_members() {
        let choice = Choice::new([C, A, C, B]).unwrap();
        assert_eq!(choice.kinds(), &[A, B, C]);
    }

    #[test]
    fn test_choice_needs_two_kinds() {
        assert!(Choice::new(Vec::<ActionKind>::new()).is_err());
        assert!(Choice::new([A]).is_err());
        assert!(Choice::new([A, A]).is_err());
    }

    #[test]
    fn test_pick_consumes_whole_choice() {
        let mut choice = Choice::new([A, B]).unwrap();
        choice.apply_perform(B);

        assert!(choice.is_completed());
        assert!(!choice.can_perform(A));
        assert!(!choice.can_perform(B));
    }

    #[test]
    fn test_validate_detects_unsorted() {
        let choice: Choice = serde_json::from_str(r#"{ "kinds": [2, 1] }"#).unwrap();
        assert!(choice.validate().is_err());
    }
}
