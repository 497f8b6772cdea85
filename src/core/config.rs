//! Engine configuration
//!
//! Threshold and policy tables are configuration, not constants. Both
//! validate at construction; an invalid table aborts startup rather than
//! silently falling back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::classifier::ThresholdTable;
use crate::types::{ConfigError, PolicyTable};

/// Validated engine configuration: the canonical tables unless a
/// deployment overrides them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub thresholds: ThresholdTable,
    #[serde(default)]
    pub policies: PolicyTable,
}

impl EngineConfig {
    /// Load overrides from a JSON file. Missing sections keep their
    /// canonical defaults; invalid tables fail loudly.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }
}
