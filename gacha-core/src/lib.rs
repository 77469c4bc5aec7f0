//! Gacha Core
//!
//! Weighted random draws over a fixed catalog, with an optional pity
//! guarantee that forces a chosen rarity after a run of unlucky draws.
//!
//! The crate keeps no per-user state. Hosts own the catalog and the pity
//! counters; they hand the current counter to every pity-aware call and
//! persist the counter that comes back. Randomness is injected per call, so
//! seeded generators make any sequence of draws reproducible.
//!
//! ```
//! use std::sync::Arc;
//! use gacha_core::{Card, DrawEngine, DrawRng, PityGuarantee};
//!
//! let engine = Arc::new(DrawEngine::new(vec![
//!     Card::new("c-1", "Slime", 70.0, "common"),
//!     Card::new("r-1", "Knight", 25.0, "rare"),
//!     Card::new("sr-1", "Wizard", 4.0, "super_rare"),
//!     Card::new("ur-1", "Dragon", 1.0, "ultra_rare"),
//! ])?);
//! let pity = PityGuarantee::new(engine, 100, "ultra_rare")?;
//!
//! let mut rng = DrawRng::from_user_seed(1337);
//! let forced = pity.draw(100, &mut rng)?;
//! assert_eq!(forced.rarity.as_str(), "ultra_rare");
//!
//! let batch = pity.draw_batch(10, 42, &mut rng)?;
//! assert_eq!(batch.items.len(), 10);
//! let pity_to_store = batch.final_pity_count;
//! # let _ = pity_to_store;
//! # Ok::<(), gacha_core::GachaError>(())
//! ```

pub mod constants;
pub mod engine;
pub mod error;
pub mod item;
pub mod multi_draw;
pub mod numbers;
pub mod pity;
pub mod result;
pub mod rng;

// Re-export commonly used types
pub use constants::{DEFAULT_DRAW_COUNT, DEFAULT_GUARANTEE_LIMIT, DEFAULT_GUARANTEED_RARITY};
pub use engine::DrawEngine;
pub use error::{ArgumentError, ConfigurationError, GachaError, GachaResult};
pub use item::{Card, Drawable, Rarity};
pub use multi_draw::MultiDraw;
pub use pity::{GuaranteeInfo, PityBatch, PityConfig, PityGuarantee, PityState};
pub use result::DrawResult;
pub use rng::DrawRng;
