//! Adaptive service façade
//!
//! Owns the validated configuration, the session registry, the tier
//! store handle, and the audio cache, and exposes the surface screens
//! consume: begin/submit/abandon an assessment, resolve a policy, and
//! fetch spoken guidance. Explicit construction and teardown; no
//! ambient globals.

use std::sync::Arc;

use tracing::debug;

use crate::core::assessment::AssessmentEngine;
use crate::core::audio::{AudioCache, AudioRef, SpeechOutcome};
use crate::core::backends::{
    ImageBackend, RecognitionOutcome, SpeechBackend, UnavailableImageBackend,
};
use crate::core::config::EngineConfig;
use crate::core::policy::PolicyResolver;
use crate::core::store::TierStore;
use crate::types::{
    AssessmentError, AudioError, LanguageCode, RecognitionError, SessionId, SessionPhase,
    SpeechError, StepCursor, StoreError, SubmitOutput, Tier, UIPolicy, UserId,
};

/// One per process. Screens hold an `Arc<Adaptive>` and call through.
pub struct Adaptive {
    engine: AssessmentEngine,
    resolver: PolicyResolver,
    store: Arc<dyn TierStore>,
    audio: AudioCache,
    image: Arc<dyn ImageBackend>,
}

impl Adaptive {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn TierStore>,
        speech: Arc<dyn SpeechBackend>,
    ) -> Self {
        Self {
            engine: AssessmentEngine::new(config.thresholds, store.clone()),
            resolver: PolicyResolver::new(config.policies),
            store,
            audio: AudioCache::new(speech),
            image: Arc::new(UnavailableImageBackend),
        }
    }

    /// Swap in a recognition model, for deployments that configure one.
    pub fn with_image_backend(mut self, image: Arc<dyn ImageBackend>) -> Self {
        self.image = image;
        self
    }

    // =========================================================================
    // ASSESSMENT
    // =========================================================================

    /// Start a capability assessment for a user.
    pub async fn begin_assessment(&self, user: UserId) -> SessionId {
        self.engine.begin(user).await
    }

    /// Submit one step outcome; see [`AssessmentEngine::submit_signal`].
    pub async fn submit_signal(
        &self,
        session: &SessionId,
        step_index: usize,
        outcome: bool,
    ) -> Result<SubmitOutput, AssessmentError> {
        self.engine.submit_signal(session, step_index, outcome).await
    }

    /// Next pending step of a session.
    pub async fn current_step(&self, session: &SessionId) -> Result<StepCursor, AssessmentError> {
        self.engine.current_step(session).await
    }

    /// Discard a session; idempotent.
    pub async fn abandon(&self, session: &SessionId) {
        self.engine.abandon(session).await
    }

    /// Lifecycle phase of a session, if it exists (status views).
    pub async fn session_phase(&self, session: &SessionId) -> Option<SessionPhase> {
        self.engine.phase(session).await
    }

    /// Owning user of a session, if it exists.
    pub async fn session_user(&self, session: &SessionId) -> Option<UserId> {
        self.engine.session_user(session).await
    }

    /// Number of sessions in the registry.
    pub async fn session_count(&self) -> usize {
        self.engine.session_count().await
    }

    // =========================================================================
    // POLICY
    // =========================================================================

    /// Persisted tier for a user; `Low` until their first completed
    /// assessment.
    pub async fn tier_for(&self, user: &UserId) -> Result<Tier, StoreError> {
        Ok(self.store.get(user).await?.unwrap_or_default())
    }

    /// Rendering parameters every screen uses for this user.
    pub async fn get_policy(&self, user: &UserId) -> Result<UIPolicy, StoreError> {
        let tier = self.tier_for(user).await?;
        Ok(self.resolver.resolve(tier))
    }

    /// Resolve a tier directly (for callers that already hold one).
    pub fn resolve_policy(&self, tier: Tier) -> UIPolicy {
        self.resolver.resolve(tier)
    }

    // =========================================================================
    // SPEECH
    // =========================================================================

    /// Cached speech synthesis; single-flight per normalized key.
    pub async fn get_or_synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
    ) -> Result<AudioRef, AudioError> {
        self.audio.get_or_synthesize(text, language).await
    }

    /// Spoken guidance gated by the user's policy: if voice assist is
    /// off for their tier, nothing is synthesized at all.
    pub async fn speak_for(
        &self,
        user: &UserId,
        text: &str,
        language: &LanguageCode,
    ) -> Result<SpeechOutcome, SpeechError> {
        let policy = self.get_policy(user).await?;
        if !policy.voice_assist {
            debug!(user = %user, "voice assist disabled, skipping synthesis");
            return Ok(SpeechOutcome::VoiceDisabled);
        }
        let asset = self.audio.get_or_synthesize(text, language).await?;
        Ok(SpeechOutcome::Spoken(asset))
    }

    // =========================================================================
    // RECOGNITION
    // =========================================================================

    /// Identify a crop photo, if a recognition model is configured.
    pub async fn recognize_crop(
        &self,
        image: &[u8],
    ) -> Result<RecognitionOutcome, RecognitionError> {
        self.image.recognize(image).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
