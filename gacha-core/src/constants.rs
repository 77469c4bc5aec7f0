//! Centralized defaults for draw and pity behaviour.
//!
//! Hosts override these through `PityConfig` or constructor arguments; the
//! values here are what a banner gets when it asks for nothing special.

// Pity ---------------------------------------------------------------------
/// Draws without the guaranteed rarity before the next draw is forced.
pub const DEFAULT_GUARANTEE_LIMIT: i64 = 100;
/// Rarity forced once the guarantee limit is reached.
pub const DEFAULT_GUARANTEED_RARITY: &str = "ultra_rare";

// Batches ------------------------------------------------------------------
/// Size of a standard multi-draw ("10-pull").
pub const DEFAULT_DRAW_COUNT: usize = 10;

// Reporting ----------------------------------------------------------------
pub(crate) const PERCENT_SCALE: f64 = 100.0;
pub(crate) const PROBABILITY_DECIMALS: i32 = 2;
