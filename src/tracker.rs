use crate::error::{QuizError, Result};
use crate::question::OptionKey;

/// Per-slot attempt state. Once a slot is attempted it stays attempted for
/// the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionStatus {
    #[default]
    Unattempted,
    Attempted { selected: OptionKey, correct: bool },
}

impl QuestionStatus {
    pub fn is_attempted(&self) -> bool {
        matches!(self, QuestionStatus::Attempted { .. })
    }

    pub fn selected(&self) -> Option<OptionKey> {
        match self {
            QuestionStatus::Attempted { selected, .. } => Some(*selected),
            QuestionStatus::Unattempted => None,
        }
    }

    /// `None` while unattempted, otherwise whether the answer was right.
    pub fn correctness(&self) -> Option<bool> {
        match self {
            QuestionStatus::Attempted { correct, .. } => Some(*correct),
            QuestionStatus::Unattempted => None,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.correctness() == Some(true)
    }
}

/// Result of a submission against the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Recorded { correct: bool },
    AlreadyAttempted,
}

/// Index-aligned attempt statuses for one quiz session.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptTracker {
    statuses: Vec<QuestionStatus>,
}

impl AttemptTracker {
    pub fn new(len: usize) -> Self {
        Self {
            statuses: vec![QuestionStatus::Unattempted; len],
        }
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn status_of(&self, index: usize) -> Result<QuestionStatus> {
        self.statuses
            .get(index)
            .copied()
            .ok_or(QuizError::InvalidSlot(index))
    }

    pub fn is_attempted(&self, index: usize) -> bool {
        self.statuses
            .get(index)
            .is_some_and(QuestionStatus::is_attempted)
    }

    /// Scores `option` for the slot. A second submission on the same slot is
    /// a no-op.
    pub fn submit(
        &mut self,
        index: usize,
        option: OptionKey,
        correct_option: OptionKey,
    ) -> Result<Submission> {
        let slot = self
            .statuses
            .get_mut(index)
            .ok_or(QuizError::InvalidSlot(index))?;

        if slot.is_attempted() {
            return Ok(Submission::AlreadyAttempted);
        }

        let correct = option == correct_option;
        *slot = QuestionStatus::Attempted {
            selected: option,
            correct,
        };
        Ok(Submission::Recorded { correct })
    }

    pub fn statuses(&self) -> &[QuestionStatus] {
        &self.statuses
    }

    pub fn attempted_count(&self) -> usize {
        self.statuses.iter().filter(|s| s.is_attempted()).count()
    }

    pub fn correct_count(&self) -> usize {
        self.statuses.iter().filter(|s| s.is_correct()).count()
    }

    pub fn incorrect_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| s.correctness() == Some(false))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn starts_unattempted() {
        let tracker = AttemptTracker::new(3);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.attempted_count(), 0);
        for i in 0..3 {
            let status = tracker.status_of(i).unwrap();
            assert_eq!(status, QuestionStatus::Unattempted);
            assert_eq!(status.selected(), None);
            assert_eq!(status.correctness(), None);
        }
    }

    #[test]
    fn submit_records_correctness() {
        let mut tracker = AttemptTracker::new(2);

        let first = tracker.submit(0, OptionKey::B, OptionKey::B).unwrap();
        let second = tracker.submit(1, OptionKey::A, OptionKey::C).unwrap();

        assert_eq!(first, Submission::Recorded { correct: true });
        assert_eq!(second, Submission::Recorded { correct: false });
        assert_eq!(tracker.attempted_count(), 2);
        assert_eq!(tracker.correct_count(), 1);
        assert_eq!(tracker.incorrect_count(), 1);
        assert_eq!(tracker.status_of(1).unwrap().selected(), Some(OptionKey::A));
    }

    #[test]
    fn second_submit_is_a_noop() {
        let mut once = AttemptTracker::new(1);
        once.submit(0, OptionKey::A, OptionKey::A).unwrap();

        let mut twice = AttemptTracker::new(1);
        twice.submit(0, OptionKey::A, OptionKey::A).unwrap();
        let again = twice.submit(0, OptionKey::D, OptionKey::A).unwrap();

        assert_eq!(again, Submission::AlreadyAttempted);
        assert_eq!(once, twice);
        assert_eq!(
            twice.status_of(0).unwrap(),
            QuestionStatus::Attempted {
                selected: OptionKey::A,
                correct: true
            }
        );
    }

    #[test]
    fn out_of_range_slot() {
        let mut tracker = AttemptTracker::new(1);
        assert_matches!(
            tracker.submit(4, OptionKey::A, OptionKey::A),
            Err(QuizError::InvalidSlot(4))
        );
        assert_matches!(tracker.status_of(1), Err(QuizError::InvalidSlot(1)));
        assert!(!tracker.is_attempted(9));
    }
}
