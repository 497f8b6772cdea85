//! Literacy tier definitions

use serde::{Deserialize, Serialize};

/// The three literacy tiers a user can be classified into.
///
/// Totally ordered: `Low < Medium < High`. A higher assessment score
/// never yields a lower tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Dense assistance: large controls, voice guidance, linear layout
    #[default]
    Low,
    /// Moderate assistance: medium controls, grid layout
    Medium,
    /// Minimal assistance: small controls, advanced layout
    High,
}

impl Tier {
    /// Numeric rank, 0-2 (matches the persisted `literacy_lvl` column)
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Low => 0,
            Tier::Medium => 1,
            Tier::High => 2,
        }
    }

    /// All tiers in ascending order
    pub fn all() -> [Tier; 3] {
        [Tier::Low, Tier::Medium, Tier::High]
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Tier::Low => "\x1b[33m",    // Yellow
            Tier::Medium => "\x1b[36m", // Cyan
            Tier::High => "\x1b[32m",   // Green
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Low => "LOW",
            Tier::Medium => "MEDIUM",
            Tier::High => "HIGH",
        };
        write!(f, "{}", name)
    }
}
