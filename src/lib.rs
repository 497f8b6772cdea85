//! Krishi: Adaptive Capability Assessment & UI Policy Engine
//!
//! Runs a deterministic multi-step capability test, converts the raw
//! interaction signals into a literacy tier, persists the tier per user,
//! and resolves it into concrete UI/voice parameters for every screen.

pub mod core;
pub mod types;

// =============================================================================
// ASSESSMENT CONSTANTS - canonical defaults, retunable via config tables
// =============================================================================

/// Number of steps in the capability assessment (swipe, tap, navigate, capture)
pub const ASSESSMENT_STEPS: u8 = 4;

/// Minimum score for the MEDIUM tier (default threshold table)
pub const SCORE_MIN_MEDIUM: u8 = 2;

/// Minimum score for the HIGH tier (default threshold table)
pub const SCORE_MIN_HIGH: u8 = 4;

// =============================================================================
// DEFAULT UI POLICY SIZES - logical pixels, per tier
// =============================================================================

/// Control size for the LOW tier
pub const CONTROL_PX_LOW: u16 = 50;
/// Icon size for the LOW tier
pub const ICON_PX_LOW: u16 = 42;

/// Control size for the MEDIUM tier
pub const CONTROL_PX_MEDIUM: u16 = 42;
/// Icon size for the MEDIUM tier
pub const ICON_PX_MEDIUM: u16 = 32;

/// Control size for the HIGH tier
pub const CONTROL_PX_HIGH: u16 = 32;
/// Icon size for the HIGH tier
pub const ICON_PX_HIGH: u16 = 22;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
