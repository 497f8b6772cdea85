//! Session and identity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Score, SignalStep, Tier};

/// User identity. The surrounding app keys users by phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to one assessment session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh session id
    pub fn generate() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self(format!("assess_{:x}", nanos as u64))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// BCP 47-ish language tag, lowercased ("en", "ta", "hi")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of an assessment session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    /// Waiting for the step at `step_index`
    Pending { step_index: usize },
    /// All steps recorded and scored, but the tier store write failed;
    /// the commit can be retried without re-running the steps
    AwaitingCommit { score: Score, tier: Tier },
    /// Tier committed to the store; terminal
    Completed { score: Score, tier: Tier },
}

/// Cursor position reported by `current_step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepCursor {
    /// Next step the caller must submit
    Pending { step_index: usize },
    /// Steps done; a commit retry is outstanding
    AwaitingCommit,
}

/// Result of one accepted step submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutput {
    /// Timestamp of the submission
    pub timestamp: DateTime<Utc>,
    /// Step that was recorded
    pub step: SignalStep,
    /// Outcome that was recorded
    pub outcome: bool,
    /// Next pending step, if the assessment is still running
    pub next_step: Option<SignalStep>,
    /// Final score, present once all steps are recorded
    pub score: Option<Score>,
    /// Classified tier, present once all steps are recorded
    pub tier: Option<Tier>,
    /// Whether the tier was durably committed to the store
    pub committed: bool,
}

impl SubmitOutput {
    /// Output for a mid-assessment step
    pub fn progressed(step: SignalStep, outcome: bool, next_step: SignalStep) -> Self {
        Self {
            timestamp: Utc::now(),
            step,
            outcome,
            next_step: Some(next_step),
            score: None,
            tier: None,
            committed: false,
        }
    }

    /// Output for the final step, after a successful commit
    pub fn completed(step: SignalStep, outcome: bool, score: Score, tier: Tier) -> Self {
        Self {
            timestamp: Utc::now(),
            step,
            outcome,
            next_step: None,
            score: Some(score),
            tier: Some(tier),
            committed: true,
        }
    }

    /// Is the assessment finished (score and tier known)?
    pub fn is_final(&self) -> bool {
        self.score.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_language_code_normalizes() {
        assert_eq!(LanguageCode::new(" EN ").as_str(), "en");
        assert_eq!(LanguageCode::new("Ta"), LanguageCode::new("ta"));
    }

    #[test]
    fn test_submit_output_finality() {
        let mid = SubmitOutput::progressed(SignalStep::Swipe, true, SignalStep::Tap);
        assert!(!mid.is_final());
        assert!(!mid.committed);

        let done = SubmitOutput::completed(SignalStep::Capture, true, 3, Tier::Medium);
        assert!(done.is_final());
        assert!(done.committed);
        assert_eq!(done.next_step, None);
    }
}
