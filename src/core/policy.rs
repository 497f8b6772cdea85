//! UI policy resolver
//!
//! Pure table lookup: tier → rendering/voice parameters. No computation,
//! no failure mode - every tier has a row once the table is validated.

use crate::types::{PolicyTable, Tier, UIPolicy};

/// Resolves tiers against a (possibly deployment-overridden) table.
#[derive(Debug, Clone, Default)]
pub struct PolicyResolver {
    table: PolicyTable,
}

impl PolicyResolver {
    pub fn new(table: PolicyTable) -> Self {
        Self { table }
    }

    /// The policy every screen renders with for this tier.
    pub fn resolve(&self, tier: Tier) -> UIPolicy {
        self.table.get(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ControlSize, LayoutMode};

    #[test]
    fn test_resolve_defined_for_every_tier() {
        let resolver = PolicyResolver::default();
        for tier in Tier::all() {
            // Must not panic, must return a concrete row
            let _ = resolver.resolve(tier);
        }
    }

    #[test]
    fn test_resolve_returns_documented_defaults() {
        let resolver = PolicyResolver::default();

        let low = resolver.resolve(Tier::Low);
        assert_eq!(low.control_size, ControlSize::Large);
        assert_eq!(low.layout, LayoutMode::Linear);
        assert!(low.voice_assist && low.help_overlay);

        let medium = resolver.resolve(Tier::Medium);
        assert_eq!(medium.control_size, ControlSize::Medium);
        assert_eq!(medium.layout, LayoutMode::Grid);
        assert!(!medium.voice_assist && !medium.help_overlay);

        let high = resolver.resolve(Tier::High);
        assert_eq!(high.control_size, ControlSize::Small);
        assert_eq!(high.layout, LayoutMode::Advanced);
        assert!(!high.voice_assist && !high.help_overlay);
    }

    #[test]
    fn test_custom_table_overrides() {
        use crate::types::{PolicyRow, UIPolicy};
        // Deployment that keeps voice on for MEDIUM as well
        let mut medium = UIPolicy::medium();
        medium.voice_assist = true;
        let table = PolicyTable::from_rows(vec![
            PolicyRow { tier: Tier::Low, policy: UIPolicy::low() },
            PolicyRow { tier: Tier::Medium, policy: medium },
            PolicyRow { tier: Tier::High, policy: UIPolicy::high() },
        ])
        .unwrap();

        let resolver = PolicyResolver::new(table);
        assert!(resolver.resolve(Tier::Medium).voice_assist);
        assert!(!resolver.resolve(Tier::High).voice_assist);
    }
}
