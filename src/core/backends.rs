//! External backend seams
//!
//! Speech synthesis and image recognition are collaborator concerns:
//! the engine consumes them as pure async functions behind traits.

use async_trait::async_trait;

use crate::types::{LanguageCode, RecognitionError, SynthesisError};

/// Text-to-speech backend: `(text, language) -> audio bytes`.
///
/// Called only by the audio cache, which guarantees at most one call in
/// flight per normalized key.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
    ) -> Result<Vec<u8>, SynthesisError>;
}

/// A recognized crop photo
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Recognition {
    /// Predicted label ("rice", "tomato", ...)
    pub label: String,
    /// Health/quality status reported by the model
    pub status: String,
}

/// Outcome of an image recognition request. "Feature unavailable" is an
/// explicit variant, distinct from a failed call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecognitionOutcome {
    Recognized(Recognition),
    /// No model is configured for this deployment
    Unavailable,
}

/// Image recognition backend: `bytes -> {label, status}`.
///
/// Consumed by screens only; the assessment engine never calls it. The
/// trait lives here to pin down the boundary.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<RecognitionOutcome, RecognitionError>;
}

/// Backend for deployments without a recognition model: every request
/// reports `Unavailable` rather than erroring.
#[derive(Debug, Default)]
pub struct UnavailableImageBackend;

#[async_trait]
impl ImageBackend for UnavailableImageBackend {
    async fn recognize(&self, _image: &[u8]) -> Result<RecognitionOutcome, RecognitionError> {
        Ok(RecognitionOutcome::Unavailable)
    }
}
