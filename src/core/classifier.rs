//! Tier classifier: score → tier via a validated threshold table
//!
//! The table is configuration with a canonical default, not a hard-coded
//! constant. Validation happens once at construction; classification is
//! then total over [0, ASSESSMENT_STEPS].

use serde::{Deserialize, Serialize};

use crate::types::{ConfigError, Score, Tier};
use crate::{ASSESSMENT_STEPS, SCORE_MIN_HIGH, SCORE_MIN_MEDIUM};

/// One band of the threshold table: scores in `[min, max]` map to `tier`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierBand {
    pub min: Score,
    pub max: Score,
    pub tier: Tier,
}

/// Ordered score-band table mapping every score in `[0, max_score]` to a
/// tier. Invariant: bands cover the range without gaps or overlaps and
/// tiers are monotonically non-decreasing as scores rise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ThresholdTableConfig", into = "ThresholdTableConfig")]
pub struct ThresholdTable {
    bands: Vec<TierBand>,
    max_score: Score,
}

/// Serialized form: bands plus the score ceiling they must cover
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdTableConfig {
    pub bands: Vec<TierBand>,
    pub max_score: Score,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        // [0,2) LOW, [2,4) MEDIUM, [4,4] HIGH over a 4-step assessment
        Self::new(
            vec![
                TierBand { min: 0, max: SCORE_MIN_MEDIUM - 1, tier: Tier::Low },
                TierBand { min: SCORE_MIN_MEDIUM, max: SCORE_MIN_HIGH - 1, tier: Tier::Medium },
                TierBand { min: SCORE_MIN_HIGH, max: ASSESSMENT_STEPS, tier: Tier::High },
            ],
            ASSESSMENT_STEPS,
        )
        .expect("canonical threshold table is valid")
    }
}

impl ThresholdTable {
    /// Build a table, validating coverage and monotonicity.
    pub fn new(mut bands: Vec<TierBand>, max_score: Score) -> Result<Self, ConfigError> {
        if bands.is_empty() {
            return Err(ConfigError::InvalidThresholdTable("table is empty".to_string()));
        }
        bands.sort_by_key(|b| b.min);

        let mut expected_min: Score = 0;
        let mut prev_tier: Option<Tier> = None;
        for band in &bands {
            if band.min != expected_min {
                return Err(ConfigError::InvalidThresholdTable(format!(
                    "gap or overlap at score {}: band starts at {}",
                    expected_min, band.min
                )));
            }
            if band.max < band.min {
                return Err(ConfigError::InvalidThresholdTable(format!(
                    "band [{}, {}] is inverted",
                    band.min, band.max
                )));
            }
            if let Some(prev) = prev_tier {
                if band.tier < prev {
                    return Err(ConfigError::InvalidThresholdTable(format!(
                        "tier {} for scores >= {} is below preceding tier {}",
                        band.tier, band.min, prev
                    )));
                }
            }
            prev_tier = Some(band.tier);
            expected_min = band.max + 1;
        }
        if expected_min != max_score + 1 {
            return Err(ConfigError::InvalidThresholdTable(format!(
                "bands cover [0, {}] but must cover [0, {}]",
                expected_min - 1,
                max_score
            )));
        }

        Ok(Self { bands, max_score })
    }

    /// Highest score the table covers
    pub fn max_score(&self) -> Score {
        self.max_score
    }

    /// Classify a score. Total for scores the table covers; scores above
    /// the ceiling clamp to the top band (cannot happen with a complete
    /// signal vector).
    pub fn classify(&self, score: Score) -> Tier {
        for band in &self.bands {
            if score >= band.min && score <= band.max {
                return band.tier;
            }
        }
        self.bands.last().map(|b| b.tier).unwrap_or(Tier::Low)
    }
}

impl TryFrom<ThresholdTableConfig> for ThresholdTable {
    type Error = ConfigError;

    fn try_from(config: ThresholdTableConfig) -> Result<Self, Self::Error> {
        Self::new(config.bands, config.max_score)
    }
}

impl From<ThresholdTable> for ThresholdTableConfig {
    fn from(table: ThresholdTable) -> Self {
        Self { bands: table.bands, max_score: table.max_score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_rows() {
        let table = ThresholdTable::default();
        assert_eq!(table.classify(0), Tier::Low);
        assert_eq!(table.classify(1), Tier::Low);
        assert_eq!(table.classify(2), Tier::Medium);
        assert_eq!(table.classify(3), Tier::Medium);
        assert_eq!(table.classify(4), Tier::High);
    }

    #[test]
    fn test_monotonicity_default() {
        let table = ThresholdTable::default();
        let mut prev = table.classify(0);
        for score in 1..=table.max_score() {
            let tier = table.classify(score);
            assert!(tier >= prev, "tier dropped at score {}", score);
            prev = tier;
        }
    }

    #[test]
    fn test_rejects_gap() {
        let bands = vec![
            TierBand { min: 0, max: 1, tier: Tier::Low },
            TierBand { min: 3, max: 4, tier: Tier::High },
        ];
        assert!(matches!(
            ThresholdTable::new(bands, 4),
            Err(ConfigError::InvalidThresholdTable(_))
        ));
    }

    #[test]
    fn test_rejects_overlap() {
        let bands = vec![
            TierBand { min: 0, max: 2, tier: Tier::Low },
            TierBand { min: 2, max: 4, tier: Tier::Medium },
        ];
        assert!(matches!(
            ThresholdTable::new(bands, 4),
            Err(ConfigError::InvalidThresholdTable(_))
        ));
    }

    #[test]
    fn test_rejects_non_monotonic_tiers() {
        let bands = vec![
            TierBand { min: 0, max: 1, tier: Tier::High },
            TierBand { min: 2, max: 4, tier: Tier::Low },
        ];
        assert!(matches!(
            ThresholdTable::new(bands, 4),
            Err(ConfigError::InvalidThresholdTable(_))
        ));
    }

    #[test]
    fn test_rejects_short_coverage() {
        let bands = vec![TierBand { min: 0, max: 2, tier: Tier::Low }];
        assert!(matches!(
            ThresholdTable::new(bands, 4),
            Err(ConfigError::InvalidThresholdTable(_))
        ));
    }

    #[test]
    fn test_rejects_empty_table() {
        assert!(matches!(
            ThresholdTable::new(vec![], 4),
            Err(ConfigError::InvalidThresholdTable(_))
        ));
    }

    #[test]
    fn test_custom_table_classifies() {
        // Stricter deployment: only a perfect run is MEDIUM, none HIGH
        let table = ThresholdTable::new(
            vec![
                TierBand { min: 0, max: 3, tier: Tier::Low },
                TierBand { min: 4, max: 4, tier: Tier::Medium },
            ],
            4,
        )
        .unwrap();
        assert_eq!(table.classify(3), Tier::Low);
        assert_eq!(table.classify(4), Tier::Medium);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let json = r#"{"bands":[{"min":0,"max":1,"tier":"LOW"}],"max_score":4}"#;
        assert!(serde_json::from_str::<ThresholdTable>(json).is_err());

        let json = r#"{"bands":[{"min":0,"max":1,"tier":"LOW"},{"min":2,"max":3,"tier":"MEDIUM"},{"min":4,"max":4,"tier":"HIGH"}],"max_score":4}"#;
        let table: ThresholdTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.classify(4), Tier::High);
    }
}
