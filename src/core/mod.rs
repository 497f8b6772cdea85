//! Core modules for Krishi

pub mod api;
pub mod assessment;
pub mod audio;
pub mod backends;
pub mod classifier;
pub mod config;
pub mod policy;
pub mod service;
pub mod store;

pub use api::{create_router, run_server};
pub use assessment::AssessmentEngine;
pub use audio::{AudioCache, AudioRef, SpeechOutcome};
pub use backends::{ImageBackend, Recognition, RecognitionOutcome, SpeechBackend, UnavailableImageBackend};
pub use classifier::{ThresholdTable, TierBand};
pub use config::EngineConfig;
pub use policy::PolicyResolver;
pub use service::Adaptive;
pub use store::{MemoryTierStore, TierStore};
