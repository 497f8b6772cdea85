//! Assessment state machine
//!
//! Sequences the four capability steps for a session, collects signals,
//! and invokes scoring + classification exactly once at completion.
//!
//! Lifecycle:
//! - `Pending(0)` → ... → `Pending(N-1)` via strictly-ordered submissions
//! - last submission: score, classify, single tier-store write → `Completed`
//! - store write failure → `AwaitingCommit` (result kept, commit retryable)
//! - `abandon` discards a non-terminal session with no persisted trace

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::core::classifier::ThresholdTable;
use crate::core::store::TierStore;
use crate::types::{
    AssessmentError, Score, SessionId, SessionPhase, SignalStep, SignalVector, StepCursor,
    SubmitOutput, Tier, UserId,
};
use crate::ASSESSMENT_STEPS;

/// One user's in-flight assessment: a signal vector, a cursor, a phase
#[derive(Debug)]
pub struct AssessmentSession {
    user: UserId,
    vector: SignalVector,
    phase: SessionPhase,
    started: DateTime<Utc>,
}

impl AssessmentSession {
    fn new(user: UserId) -> Self {
        Self {
            user,
            vector: SignalVector::new(),
            phase: SessionPhase::Pending { step_index: 0 },
            started: Utc::now(),
        }
    }

    /// Owning user
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// When the session was created
    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }
}

/// What a session-level submission decided; the engine settles the
/// commit against the store
enum StepAdvance {
    Progressed(SubmitOutput),
    ReadyToCommit { step: SignalStep, outcome: bool, score: Score, tier: Tier },
    RetryCommit { step: SignalStep, outcome: bool, score: Score, tier: Tier },
}

impl AssessmentSession {
    /// Record one step outcome, enforcing strict sequencing.
    fn submit(
        &mut self,
        step_index: usize,
        outcome: bool,
        thresholds: &ThresholdTable,
    ) -> Result<StepAdvance, AssessmentError> {
        let final_index = ASSESSMENT_STEPS as usize - 1;
        match self.phase {
            SessionPhase::Completed { .. } => Err(AssessmentError::SessionCompleted),

            // Steps are all recorded; only a commit retry is accepted,
            // addressed at the final step. Nothing is re-recorded.
            SessionPhase::AwaitingCommit { score, tier } => {
                if step_index != final_index {
                    return Err(AssessmentError::OutOfOrderStep {
                        expected: final_index,
                        got: step_index,
                    });
                }
                let step = SignalStep::from_index(final_index)
                    .ok_or(AssessmentError::SessionCompleted)?;
                let recorded = self.vector.outcome(step).unwrap_or(outcome);
                Ok(StepAdvance::RetryCommit { step, outcome: recorded, score, tier })
            }

            SessionPhase::Pending { step_index: cursor } => {
                if step_index != cursor {
                    return Err(AssessmentError::OutOfOrderStep {
                        expected: cursor,
                        got: step_index,
                    });
                }
                let step = SignalStep::from_index(step_index)
                    .ok_or(AssessmentError::OutOfOrderStep { expected: cursor, got: step_index })?;
                self.vector.record(step, outcome)?;

                let next = cursor + 1;
                if next < ASSESSMENT_STEPS as usize {
                    self.phase = SessionPhase::Pending { step_index: next };
                    let next_step = SignalStep::from_index(next).expect("next index in range");
                    return Ok(StepAdvance::Progressed(SubmitOutput::progressed(
                        step, outcome, next_step,
                    )));
                }

                // Cursor reached N: score and classify exactly once
                let score = self.vector.score()?;
                let tier = thresholds.classify(score);
                Ok(StepAdvance::ReadyToCommit { step, outcome, score, tier })
            }
        }
    }
}

/// Session registry plus the classification rules and the tier store.
///
/// Sessions live behind one `RwLock`; step submissions take the write
/// lock, so calls against the same session are serialized and the cursor
/// invariant cannot be corrupted by interleaving. Sessions of different
/// users are otherwise independent.
pub struct AssessmentEngine {
    sessions: RwLock<HashMap<SessionId, AssessmentSession>>,
    thresholds: ThresholdTable,
    store: Arc<dyn TierStore>,
}

impl AssessmentEngine {
    pub fn new(thresholds: ThresholdTable, store: Arc<dyn TierStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            thresholds,
            store,
        }
    }

    /// Start a new assessment for a user, returning its handle.
    pub async fn begin(&self, user: UserId) -> SessionId {
        let id = SessionId::generate();
        let session = AssessmentSession::new(user.clone());
        self.sessions.write().await.insert(id.clone(), session);
        info!(session = %id, user = %user, "assessment started");
        id
    }

    /// Submit the outcome for one step.
    ///
    /// Fails with `OutOfOrderStep` unless `step_index` matches the
    /// session cursor. On the final step the tier is committed to the
    /// store before the session is considered complete; a failed write
    /// surfaces `StoreWriteFailed` and leaves the session retryable.
    pub async fn submit_signal(
        &self,
        id: &SessionId,
        step_index: usize,
        outcome: bool,
    ) -> Result<SubmitOutput, AssessmentError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or(AssessmentError::SessionNotFound)?;

        let advance = session.submit(step_index, outcome, &self.thresholds)?;
        match advance {
            StepAdvance::Progressed(output) => {
                debug!(
                    session = %id,
                    step = %output.step,
                    outcome,
                    "signal recorded"
                );
                Ok(output)
            }
            StepAdvance::ReadyToCommit { step, outcome, score, tier }
            | StepAdvance::RetryCommit { step, outcome, score, tier } => {
                let user = session.user.clone();
                match self.store.set(&user, tier).await {
                    Ok(()) => {
                        session.phase = SessionPhase::Completed { score, tier };
                        info!(session = %id, user = %user, score, tier = %tier, "tier committed");
                        Ok(SubmitOutput::completed(step, outcome, score, tier))
                    }
                    Err(err) => {
                        session.phase = SessionPhase::AwaitingCommit { score, tier };
                        warn!(session = %id, user = %user, error = %err, "tier commit failed");
                        Err(AssessmentError::StoreWriteFailed(err))
                    }
                }
            }
        }
    }

    /// Pending step index for a session, or where it stands.
    pub async fn current_step(&self, id: &SessionId) -> Result<StepCursor, AssessmentError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(id).ok_or(AssessmentError::SessionNotFound)?;
        match session.phase {
            SessionPhase::Pending { step_index } => Ok(StepCursor::Pending { step_index }),
            SessionPhase::AwaitingCommit { .. } => Ok(StepCursor::AwaitingCommit),
            SessionPhase::Completed { .. } => Err(AssessmentError::SessionCompleted),
        }
    }

    /// Discard a session. Idempotent: unknown or already-terminal
    /// sessions are a no-op, never an error. A discarded session leaves
    /// no persisted trace.
    pub async fn abandon(&self, id: &SessionId) {
        let mut sessions = self.sessions.write().await;
        match sessions.get(id).map(|s| s.phase) {
            Some(SessionPhase::Completed { .. }) | None => {}
            Some(_) => {
                sessions.remove(id);
                debug!(session = %id, "assessment abandoned");
            }
        }
    }

    /// Phase of a session, if it exists (for status views)
    pub async fn phase(&self, id: &SessionId) -> Option<SessionPhase> {
        self.sessions.read().await.get(id).map(|s| s.phase)
    }

    /// Owning user of a session, if it exists
    pub async fn session_user(&self, id: &SessionId) -> Option<UserId> {
        self.sessions.read().await.get(id).map(|s| s.user.clone())
    }

    /// Number of live sessions (terminal records included)
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryTierStore;

    fn engine() -> (AssessmentEngine, Arc<MemoryTierStore>) {
        let store = Arc::new(MemoryTierStore::new());
        (
            AssessmentEngine::new(ThresholdTable::default(), store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn test_initial_cursor_is_zero() {
        let (engine, _) = engine();
        let id = engine.begin(UserId::new("9876500001")).await;
        assert_eq!(
            engine.current_step(&id).await.unwrap(),
            StepCursor::Pending { step_index: 0 }
        );
    }

    #[tokio::test]
    async fn test_out_of_order_step_rejected() {
        let (engine, store) = engine();
        let id = engine.begin(UserId::new("9876500002")).await;

        let err = engine.submit_signal(&id, 2, true).await.unwrap_err();
        assert!(matches!(err, AssessmentError::OutOfOrderStep { expected: 0, got: 2 }));

        // Cursor untouched, nothing persisted
        assert_eq!(
            engine.current_step(&id).await.unwrap(),
            StepCursor::Pending { step_index: 0 }
        );
        assert_eq!(store.set_calls(), 0);
    }

    #[tokio::test]
    async fn test_replay_of_recorded_step_rejected() {
        let (engine, _) = engine();
        let id = engine.begin(UserId::new("9876500003")).await;

        engine.submit_signal(&id, 0, true).await.unwrap();
        let err = engine.submit_signal(&id, 0, false).await.unwrap_err();
        assert!(matches!(err, AssessmentError::OutOfOrderStep { expected: 1, got: 0 }));
    }

    #[tokio::test]
    async fn test_full_run_commits_once() {
        let (engine, store) = engine();
        let user = UserId::new("9876500004");
        let id = engine.begin(user.clone()).await;

        engine.submit_signal(&id, 0, true).await.unwrap();
        engine.submit_signal(&id, 1, false).await.unwrap();
        engine.submit_signal(&id, 2, true).await.unwrap();
        let output = engine.submit_signal(&id, 3, true).await.unwrap();

        assert_eq!(output.score, Some(3));
        assert_eq!(output.tier, Some(Tier::Medium));
        assert!(output.committed);
        assert_eq!(store.set_calls(), 1);
        assert_eq!(store.get(&user).await.unwrap(), Some(Tier::Medium));
    }

    #[tokio::test]
    async fn test_completed_session_rejects_further_submissions() {
        let (engine, store) = engine();
        let id = engine.begin(UserId::new("9876500005")).await;

        for step in 0..4 {
            engine.submit_signal(&id, step, true).await.unwrap();
        }
        let err = engine.submit_signal(&id, 3, true).await.unwrap_err();
        assert!(matches!(err, AssessmentError::SessionCompleted));
        assert_eq!(store.set_calls(), 1, "store must not be written twice");

        let err = engine.current_step(&id).await.unwrap_err();
        assert!(matches!(err, AssessmentError::SessionCompleted));
    }

    #[tokio::test]
    async fn test_abandon_is_idempotent() {
        let (engine, store) = engine();
        let id = engine.begin(UserId::new("9876500006")).await;
        engine.submit_signal(&id, 0, true).await.unwrap();

        engine.abandon(&id).await;
        engine.abandon(&id).await; // second call: no-op
        engine.abandon(&SessionId("assess_nope".to_string())).await; // unknown: no-op

        assert!(matches!(
            engine.current_step(&id).await.unwrap_err(),
            AssessmentError::SessionNotFound
        ));
        assert_eq!(store.set_calls(), 0, "partial session must leave no trace");
    }

    #[tokio::test]
    async fn test_abandon_keeps_completed_record() {
        let (engine, _) = engine();
        let id = engine.begin(UserId::new("9876500007")).await;
        for step in 0..4 {
            engine.submit_signal(&id, step, false).await.unwrap();
        }

        engine.abandon(&id).await;
        // Terminal record survives: stale handles stay distinguishable
        assert!(matches!(
            engine.current_step(&id).await.unwrap_err(),
            AssessmentError::SessionCompleted
        ));
    }

    #[tokio::test]
    async fn test_unknown_session_not_found() {
        let (engine, _) = engine();
        let err = engine
            .submit_signal(&SessionId("assess_missing".to_string()), 0, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let (engine, store) = engine();
        let id_a = engine.begin(UserId::new("9876500008")).await;
        let id_b = engine.begin(UserId::new("9876500009")).await;

        engine.submit_signal(&id_a, 0, true).await.unwrap();
        // B still expects step 0
        assert_eq!(
            engine.current_step(&id_b).await.unwrap(),
            StepCursor::Pending { step_index: 0 }
        );

        for step in 0..4 {
            engine.submit_signal(&id_b, step, true).await.unwrap();
        }
        assert_eq!(
            store.get(&UserId::new("9876500009")).await.unwrap(),
            Some(Tier::High)
        );
        assert_eq!(store.get(&UserId::new("9876500008")).await.unwrap(), None);
    }
}
