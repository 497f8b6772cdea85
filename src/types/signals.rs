//! Signal structures for the capability assessment
//!
//! One boolean outcome per assessment step, recorded exactly once and
//! never reset mid-run. The score is derived, not independently mutable.

use serde::{Deserialize, Serialize};

use crate::types::AssessmentError;
use crate::ASSESSMENT_STEPS;

/// The four assessment steps, in the order they are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStep {
    /// Drag a highlighted box left or right
    Swipe,
    /// Tap a button accurately
    Tap,
    /// Move to the next screen via a labelled button
    Navigate,
    /// Take or upload a photo
    Capture,
}

impl SignalStep {
    /// Position of this step in the assessment sequence
    pub fn index(&self) -> usize {
        match self {
            SignalStep::Swipe => 0,
            SignalStep::Tap => 1,
            SignalStep::Navigate => 2,
            SignalStep::Capture => 3,
        }
    }

    /// Step at a given cursor position, if in range
    pub fn from_index(index: usize) -> Option<SignalStep> {
        match index {
            0 => Some(SignalStep::Swipe),
            1 => Some(SignalStep::Tap),
            2 => Some(SignalStep::Navigate),
            3 => Some(SignalStep::Capture),
            _ => None,
        }
    }

    /// All steps in sequence order
    pub fn all() -> [SignalStep; ASSESSMENT_STEPS as usize] {
        [
            SignalStep::Swipe,
            SignalStep::Tap,
            SignalStep::Navigate,
            SignalStep::Capture,
        ]
    }

    /// Instruction shown (and spoken) to the user for this step
    pub fn prompt(&self) -> &'static str {
        match self {
            SignalStep::Swipe => "Swipe left to continue",
            SignalStep::Tap => "Tap the button",
            SignalStep::Navigate => "Navigate to next",
            SignalStep::Capture => "Take a photo",
        }
    }
}

impl std::fmt::Display for SignalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalStep::Swipe => "swipe",
            SignalStep::Tap => "tap",
            SignalStep::Navigate => "navigate",
            SignalStep::Capture => "capture",
        };
        write!(f, "{}", name)
    }
}

/// Assessment score: count of passed steps, in `[0, ASSESSMENT_STEPS]`
pub type Score = u8;

/// Fixed-length record of per-step pass/fail outcomes.
///
/// Each slot starts unset and is written exactly once when its step
/// completes. Only the state machine writes slots, strictly in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalVector {
    slots: [Option<bool>; ASSESSMENT_STEPS as usize],
}

impl SignalVector {
    /// Create an empty vector (all slots unset)
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for one step. Slots are write-once: a second
    /// write to the same slot is a sequencing bug in the caller.
    pub fn record(&mut self, step: SignalStep, outcome: bool) -> Result<(), AssessmentError> {
        let slot = &mut self.slots[step.index()];
        if slot.is_some() {
            return Err(AssessmentError::OutOfOrderStep {
                expected: self.first_unset().map(|s| s.index()).unwrap_or(ASSESSMENT_STEPS as usize),
                got: step.index(),
            });
        }
        *slot = Some(outcome);
        Ok(())
    }

    /// Outcome recorded for a step, if any
    pub fn outcome(&self, step: SignalStep) -> Option<bool> {
        self.slots[step.index()]
    }

    /// First step whose slot is still unset
    pub fn first_unset(&self) -> Option<SignalStep> {
        self.slots
            .iter()
            .position(|s| s.is_none())
            .and_then(SignalStep::from_index)
    }

    /// Whether all slots are set
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// Number of slots already set
    pub fn recorded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Reduce the vector to a score: the count of passed steps.
    ///
    /// Defined only for a fully-populated vector; the state machine
    /// never calls this early.
    pub fn score(&self) -> Result<Score, AssessmentError> {
        if !self.is_complete() {
            return Err(AssessmentError::IncompleteVector {
                recorded: self.recorded_count(),
            });
        }
        Ok(self.slots.iter().filter(|s| **s == Some(true)).count() as Score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_index_roundtrip() {
        for step in SignalStep::all() {
            assert_eq!(SignalStep::from_index(step.index()), Some(step));
        }
        assert_eq!(SignalStep::from_index(4), None);
    }

    #[test]
    fn test_empty_vector_has_no_score() {
        let vector = SignalVector::new();
        assert!(matches!(
            vector.score(),
            Err(AssessmentError::IncompleteVector { recorded: 0 })
        ));
    }

    #[test]
    fn test_partial_vector_has_no_score() {
        let mut vector = SignalVector::new();
        vector.record(SignalStep::Swipe, true).unwrap();
        vector.record(SignalStep::Tap, false).unwrap();
        assert!(matches!(
            vector.score(),
            Err(AssessmentError::IncompleteVector { recorded: 2 })
        ));
    }

    #[test]
    fn test_score_counts_passes() {
        let mut vector = SignalVector::new();
        vector.record(SignalStep::Swipe, true).unwrap();
        vector.record(SignalStep::Tap, false).unwrap();
        vector.record(SignalStep::Navigate, true).unwrap();
        vector.record(SignalStep::Capture, true).unwrap();
        assert_eq!(vector.score().unwrap(), 3);
    }

    #[test]
    fn test_slots_are_write_once() {
        let mut vector = SignalVector::new();
        vector.record(SignalStep::Tap, true).unwrap();
        assert!(vector.record(SignalStep::Tap, false).is_err());
        // Original outcome untouched
        assert_eq!(vector.outcome(SignalStep::Tap), Some(true));
    }

    #[test]
    fn test_first_unset_tracks_progress() {
        let mut vector = SignalVector::new();
        assert_eq!(vector.first_unset(), Some(SignalStep::Swipe));
        vector.record(SignalStep::Swipe, false).unwrap();
        assert_eq!(vector.first_unset(), Some(SignalStep::Tap));
    }

    #[test]
    fn test_all_fail_scores_zero() {
        let mut vector = SignalVector::new();
        for step in SignalStep::all() {
            vector.record(step, false).unwrap();
        }
        assert_eq!(vector.score().unwrap(), 0);
    }
}
