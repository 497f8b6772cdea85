//! Core types for Krishi

mod error;
mod policy;
mod session;
mod signals;
mod tier;

pub use error::{
    AssessmentError, AudioError, ConfigError, RecognitionError, SpeechError, StoreError,
    SynthesisError,
};
pub use policy::{ControlSize, LayoutMode, PolicyRow, PolicyTable, UIPolicy};
pub use session::{LanguageCode, SessionId, SessionPhase, StepCursor, SubmitOutput, UserId};
pub use signals::{Score, SignalStep, SignalVector};
pub use tier::Tier;
