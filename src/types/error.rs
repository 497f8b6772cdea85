//! Error taxonomy
//!
//! Sequencing and backend failures are expected runtime conditions and
//! recoverable; table misconfiguration is fatal at startup.

use thiserror::Error;

/// Errors from the assessment state machine
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Caller violated step sequencing; re-query `current_step` and retry
    #[error("out-of-order step: expected {expected}, got {got}")]
    OutOfOrderStep { expected: usize, got: usize },

    /// Stale or unknown session handle
    #[error("session not found")]
    SessionNotFound,

    /// Session already reached its terminal state
    #[error("session already completed")]
    SessionCompleted,

    /// Scoring was invoked before all steps were recorded. Internal
    /// invariant of the state machine, not a public-input concern.
    #[error("signal vector incomplete: {recorded} of 4 steps recorded")]
    IncompleteVector { recorded: usize },

    /// Tier store write failed; the session keeps its computed result
    /// and the commit can be retried
    #[error("tier store write failed: {0}")]
    StoreWriteFailed(#[source] StoreError),
}

/// Configuration errors; fatal at startup, never silently replaced by
/// an unvalidated fallback
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid threshold table: {0}")]
    InvalidThresholdTable(String),

    #[error("invalid policy table: {0}")]
    InvalidPolicyTable(String),

    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure from the tier store collaborator
#[derive(Debug, Error)]
#[error("tier store unavailable: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Failure from the speech synthesis collaborator
#[derive(Debug, Error)]
#[error("speech backend failed: {message}")]
pub struct SynthesisError {
    pub message: String,
}

impl SynthesisError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Errors from the audio asset cache
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// Synthesis failed; nothing was cached, the next request retries
    #[error("synthesis failed: {message}")]
    SynthesisFailed { message: String },
}

/// Errors from policy-gated speech guidance: the tier lookup and the
/// cache can each fail independently
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Failure from the image recognition collaborator
#[derive(Debug, Error)]
#[error("image backend failed: {message}")]
pub struct RecognitionError {
    pub message: String,
}

impl RecognitionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
