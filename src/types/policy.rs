//! UI policy types
//!
//! A `UIPolicy` is the resolved bundle of rendering/voice parameters for
//! one tier. The table is configuration: deployments may override rows
//! per locale without touching the resolver.

use serde::{Deserialize, Serialize};

use crate::types::{ConfigError, Tier};
use crate::{
    CONTROL_PX_HIGH, CONTROL_PX_LOW, CONTROL_PX_MEDIUM, ICON_PX_HIGH, ICON_PX_LOW, ICON_PX_MEDIUM,
};

/// Relative control sizing class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSize {
    Small,
    Medium,
    Large,
}

impl std::fmt::Display for ControlSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ControlSize::Small => "small",
            ControlSize::Medium => "medium",
            ControlSize::Large => "large",
        };
        write!(f, "{}", name)
    }
}

/// Screen layout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// One control per row, top to bottom
    Linear,
    /// Icon grid
    Grid,
    /// Dense layout with full text and extras
    Advanced,
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LayoutMode::Linear => "linear",
            LayoutMode::Grid => "grid",
            LayoutMode::Advanced => "advanced",
        };
        write!(f, "{}", name)
    }
}

/// Resolved rendering/voice parameters for one tier.
///
/// Immutable value object; computed on demand from the policy table,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UIPolicy {
    /// Sizing class for buttons and touch targets
    pub control_size: ControlSize,
    /// Control size in logical pixels
    pub control_px: u16,
    /// Icon size in logical pixels
    pub icon_px: u16,
    /// Speak prompts aloud on focus/hover
    pub voice_assist: bool,
    /// Screen layout mode
    pub layout: LayoutMode,
    /// Show the persistent help overlay
    pub help_overlay: bool,
}

impl UIPolicy {
    /// Default policy for the LOW tier
    pub fn low() -> Self {
        Self {
            control_size: ControlSize::Large,
            control_px: CONTROL_PX_LOW,
            icon_px: ICON_PX_LOW,
            voice_assist: true,
            layout: LayoutMode::Linear,
            help_overlay: true,
        }
    }

    /// Default policy for the MEDIUM tier
    pub fn medium() -> Self {
        Self {
            control_size: ControlSize::Medium,
            control_px: CONTROL_PX_MEDIUM,
            icon_px: ICON_PX_MEDIUM,
            voice_assist: false,
            layout: LayoutMode::Grid,
            help_overlay: false,
        }
    }

    /// Default policy for the HIGH tier
    pub fn high() -> Self {
        Self {
            control_size: ControlSize::Small,
            control_px: CONTROL_PX_HIGH,
            icon_px: ICON_PX_HIGH,
            voice_assist: false,
            layout: LayoutMode::Advanced,
            help_overlay: false,
        }
    }
}

/// One configurable table entry: a tier and its policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRow {
    pub tier: Tier,
    pub policy: UIPolicy,
}

/// Tier → UIPolicy lookup table. Every tier has exactly one row, so
/// resolution has no failure mode once the table is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<PolicyRow>", into = "Vec<PolicyRow>")]
pub struct PolicyTable {
    low: UIPolicy,
    medium: UIPolicy,
    high: UIPolicy,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            low: UIPolicy::low(),
            medium: UIPolicy::medium(),
            high: UIPolicy::high(),
        }
    }
}

impl PolicyTable {
    /// Build a table from explicit rows. Rejects missing or duplicate
    /// tiers - misconfiguration is fatal at startup, never papered over.
    pub fn from_rows(rows: Vec<PolicyRow>) -> Result<Self, ConfigError> {
        let mut low = None;
        let mut medium = None;
        let mut high = None;
        for row in rows {
            let slot = match row.tier {
                Tier::Low => &mut low,
                Tier::Medium => &mut medium,
                Tier::High => &mut high,
            };
            if slot.is_some() {
                return Err(ConfigError::InvalidPolicyTable(format!(
                    "duplicate row for tier {}",
                    row.tier
                )));
            }
            *slot = Some(row.policy);
        }
        match (low, medium, high) {
            (Some(low), Some(medium), Some(high)) => Ok(Self { low, medium, high }),
            _ => Err(ConfigError::InvalidPolicyTable(
                "table must contain one row per tier".to_string(),
            )),
        }
    }

    /// Look up the policy for a tier. Total: every tier has a row.
    pub fn get(&self, tier: Tier) -> UIPolicy {
        match tier {
            Tier::Low => self.low,
            Tier::Medium => self.medium,
            Tier::High => self.high,
        }
    }
}

impl TryFrom<Vec<PolicyRow>> for PolicyTable {
    type Error = ConfigError;

    fn try_from(rows: Vec<PolicyRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<PolicyTable> for Vec<PolicyRow> {
    fn from(table: PolicyTable) -> Self {
        Tier::all()
            .into_iter()
            .map(|tier| PolicyRow {
                tier,
                policy: table.get(tier),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_rows() {
        let table = PolicyTable::default();

        let low = table.get(Tier::Low);
        assert_eq!(low.control_size, ControlSize::Large);
        assert!(low.voice_assist);
        assert_eq!(low.layout, LayoutMode::Linear);
        assert!(low.help_overlay);

        let medium = table.get(Tier::Medium);
        assert_eq!(medium.control_size, ControlSize::Medium);
        assert!(!medium.voice_assist);
        assert_eq!(medium.layout, LayoutMode::Grid);
        assert!(!medium.help_overlay);

        let high = table.get(Tier::High);
        assert_eq!(high.control_size, ControlSize::Small);
        assert!(!high.voice_assist);
        assert_eq!(high.layout, LayoutMode::Advanced);
        assert!(!high.help_overlay);
    }

    #[test]
    fn test_sizes_shrink_as_tier_rises() {
        let table = PolicyTable::default();
        assert!(table.get(Tier::Low).control_px > table.get(Tier::Medium).control_px);
        assert!(table.get(Tier::Medium).control_px > table.get(Tier::High).control_px);
    }

    #[test]
    fn test_from_rows_requires_all_tiers() {
        let rows = vec![PolicyRow {
            tier: Tier::Low,
            policy: UIPolicy::low(),
        }];
        assert!(matches!(
            PolicyTable::from_rows(rows),
            Err(ConfigError::InvalidPolicyTable(_))
        ));
    }

    #[test]
    fn test_from_rows_rejects_duplicates() {
        let rows = vec![
            PolicyRow { tier: Tier::Low, policy: UIPolicy::low() },
            PolicyRow { tier: Tier::Low, policy: UIPolicy::medium() },
            PolicyRow { tier: Tier::Medium, policy: UIPolicy::medium() },
            PolicyRow { tier: Tier::High, policy: UIPolicy::high() },
        ];
        assert!(matches!(
            PolicyTable::from_rows(rows),
            Err(ConfigError::InvalidPolicyTable(_))
        ));
    }

    #[test]
    fn test_table_serde_roundtrip() {
        let table = PolicyTable::default();
        let json = serde_json::to_string(&table).unwrap();
        let back: PolicyTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(Tier::Low), table.get(Tier::Low));
        assert_eq!(back.get(Tier::High), table.get(Tier::High));
    }

    #[test]
    fn test_incomplete_table_fails_to_deserialize() {
        let json = r#"[{"tier":"LOW","policy":{"control_size":"large","control_px":50,"icon_px":42,"voice_assist":true,"layout":"linear","help_overlay":true}}]"#;
        assert!(serde_json::from_str::<PolicyTable>(json).is_err());
    }
}
