//! Pity guarantee layered over a shared draw engine.
//!
//! The pity counter ("draws since the guaranteed rarity last came up") is
//! owned by the caller. Every operation takes the current value and none of
//! them store it, so one `PityGuarantee` can serve any number of users as
//! long as each brings its own counter and its own RNG.
//!
//! Per counter the layer behaves like a two-state machine:
//!
//! * `Normal` (`count < limit`): draws go to the engine untouched. A
//!   guaranteed-rarity result resets the counter to 0, anything else adds 1.
//! * `Guaranteed` (`count >= limit`): the draw is forced from the guaranteed
//!   rarity and the counter resets to 0.
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::{DEFAULT_GUARANTEE_LIMIT, DEFAULT_GUARANTEED_RARITY};
use crate::engine::DrawEngine;
use crate::error::{ArgumentError, ConfigurationError, GachaResult};
use crate::item::{Drawable, Rarity};

/// Serializable pity settings for a banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityConfig {
    #[serde(default = "PityConfig::default_guarantee_limit")]
    pub guarantee_limit: i64,
    #[serde(default = "PityConfig::default_guaranteed_rarity")]
    pub guaranteed_rarity: Rarity,
}

impl PityConfig {
    const fn default_guarantee_limit() -> i64 {
        DEFAULT_GUARANTEE_LIMIT
    }

    fn default_guaranteed_rarity() -> Rarity {
        Rarity::new(DEFAULT_GUARANTEED_RARITY)
    }

    /// Parse a config from JSON, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the values a hand-edited config could get wrong.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a non-positive limit and
    /// `InvalidConfiguration` for a blank rarity.
    pub fn validate(&self) -> GachaResult<()> {
        if self.guarantee_limit <= 0 {
            return Err(ArgumentError::NonPositiveGuaranteeLimit.into());
        }
        if self.guaranteed_rarity.as_str().is_empty() {
            return Err(
                ConfigurationError::InvalidConfig("guaranteed_rarity must not be blank".into())
                    .into(),
            );
        }
        Ok(())
    }
}

impl Default for PityConfig {
    fn default() -> Self {
        Self {
            guarantee_limit: Self::default_guarantee_limit(),
            guaranteed_rarity: Self::default_guaranteed_rarity(),
        }
    }
}

/// Where a counter sits relative to the guarantee limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PityState {
    /// Below the limit; draws are plain weighted draws.
    Normal,
    /// At or above the limit; the next draw is forced.
    Guaranteed,
}

/// Progress towards the next guaranteed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteeInfo {
    pub current_pity_count: i64,
    pub remaining: i64,
    pub guaranteed_at: i64,
}

/// Results of a pity-aware batch together with the evolved counter.
#[derive(Debug, Clone, PartialEq)]
pub struct PityBatch<'a, T> {
    pub items: Vec<&'a T>,
    /// Counter to persist for the next call.
    pub final_pity_count: i64,
    /// Draws in this batch that were forced by the guarantee.
    pub guaranteed_hits: usize,
}

/// Stateless pity guarantee over a shared engine.
#[derive(Debug, Clone)]
pub struct PityGuarantee<T> {
    engine: Arc<DrawEngine<T>>,
    guarantee_limit: i64,
    guaranteed_rarity: Rarity,
}

impl<T: Drawable> PityGuarantee<T> {
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `guarantee_limit` is not positive.
    pub fn new(
        engine: Arc<DrawEngine<T>>,
        guarantee_limit: i64,
        guaranteed_rarity: impl Into<Rarity>,
    ) -> GachaResult<Self> {
        if guarantee_limit <= 0 {
            return Err(ArgumentError::NonPositiveGuaranteeLimit.into());
        }
        let guaranteed_rarity = guaranteed_rarity.into();
        debug!("pity guarantee: {guaranteed_rarity} forced at {guarantee_limit} draws");
        Ok(Self {
            engine,
            guarantee_limit,
            guaranteed_rarity,
        })
    }

    /// Limit 100, forcing `ultra_rare`.
    #[must_use]
    pub fn with_defaults(engine: Arc<DrawEngine<T>>) -> Self {
        Self {
            engine,
            guarantee_limit: DEFAULT_GUARANTEE_LIMIT,
            guaranteed_rarity: Rarity::ultra_rare(),
        }
    }

    /// # Errors
    ///
    /// Returns the first problem `PityConfig::validate` finds.
    pub fn from_config(engine: Arc<DrawEngine<T>>, config: &PityConfig) -> GachaResult<Self> {
        config.validate()?;
        Self::new(
            engine,
            config.guarantee_limit,
            config.guaranteed_rarity.clone(),
        )
    }

    /// Draw once, forcing the guaranteed rarity when the counter is at the limit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a negative counter and
    /// `InvalidConfiguration` when a forced draw finds no guaranteed items.
    pub fn draw<R: Rng + ?Sized>(&self, current_pity_count: i64, rng: &mut R) -> GachaResult<&T> {
        ensure_pity_count(current_pity_count)?;
        if current_pity_count >= self.guarantee_limit {
            return self.draw_guaranteed(rng);
        }
        Ok(self.engine.draw(rng))
    }

    /// Draw `count` times, evolving the counter between draws.
    ///
    /// # Errors
    ///
    /// See [`PityGuarantee::draw_batch`].
    pub fn draw_multiple<R: Rng + ?Sized>(
        &self,
        count: usize,
        current_pity_count: i64,
        rng: &mut R,
    ) -> GachaResult<Vec<&T>> {
        self.draw_batch(count, current_pity_count, rng)
            .map(|batch| batch.items)
    }

    /// Like [`PityGuarantee::draw_multiple`], also reporting the counter the
    /// caller should persist afterwards.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero count or a negative counter, and
    /// `InvalidConfiguration` if a forced draw finds no guaranteed items.
    pub fn draw_batch<R: Rng + ?Sized>(
        &self,
        count: usize,
        current_pity_count: i64,
        rng: &mut R,
    ) -> GachaResult<PityBatch<'_, T>> {
        if count == 0 {
            return Err(ArgumentError::NonPositiveDrawCount.into());
        }
        ensure_pity_count(current_pity_count)?;

        let mut items = Vec::with_capacity(count);
        let mut running = current_pity_count;
        let mut guaranteed_hits = 0;
        for _ in 0..count {
            if self.state(running) == PityState::Guaranteed {
                guaranteed_hits += 1;
            }
            let item = self.draw(running, rng)?;
            running = self.next_pity_count(item, running);
            items.push(item);
        }

        Ok(PityBatch {
            items,
            final_pity_count: running,
            guaranteed_hits,
        })
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` for a negative counter.
    pub fn next_guarantee_info(&self, current_pity_count: i64) -> GachaResult<GuaranteeInfo> {
        ensure_pity_count(current_pity_count)?;
        Ok(GuaranteeInfo {
            current_pity_count,
            remaining: self.guarantee_limit.saturating_sub(current_pity_count).max(0),
            guaranteed_at: self.guarantee_limit,
        })
    }

    #[must_use]
    pub const fn state(&self, current_pity_count: i64) -> PityState {
        if current_pity_count >= self.guarantee_limit {
            PityState::Guaranteed
        } else {
            PityState::Normal
        }
    }

    /// Counter after drawing `item` with `current_pity_count` in hand.
    #[must_use]
    pub fn next_pity_count(&self, item: &T, current_pity_count: i64) -> i64 {
        if self.is_guaranteed(item) {
            0
        } else {
            current_pity_count.saturating_add(1)
        }
    }

    #[must_use]
    pub fn is_guaranteed(&self, item: &T) -> bool {
        self.guaranteed_rarity.matches(item.rarity())
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<DrawEngine<T>> {
        &self.engine
    }

    #[must_use]
    pub const fn guarantee_limit(&self) -> i64 {
        self.guarantee_limit
    }

    #[must_use]
    pub const fn guaranteed_rarity(&self) -> &Rarity {
        &self.guaranteed_rarity
    }

    fn draw_guaranteed<R: Rng + ?Sized>(&self, rng: &mut R) -> GachaResult<&T> {
        let candidates: Vec<&T> = self
            .engine
            .items_with_rarity(self.guaranteed_rarity.as_str())
            .collect();
        let Some(item) = candidates.choose(rng).copied() else {
            return Err(ConfigurationError::NoGuaranteedItems {
                rarity: self.guaranteed_rarity.to_string(),
            }
            .into());
        };
        debug!(
            "forced {} draw from {} candidates",
            self.guaranteed_rarity,
            candidates.len()
        );
        Ok(item)
    }
}

fn ensure_pity_count(current_pity_count: i64) -> Result<(), ArgumentError> {
    if current_pity_count < 0 {
        return Err(ArgumentError::NegativePityCount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GachaError;
    use crate::item::Card;
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha20Rng;

    fn engine() -> Arc<DrawEngine<Card>> {
        Arc::new(
            DrawEngine::new(vec![
                Card::new("common-1", "Slime", 70.0, "common"),
                Card::new("rare-1", "Knight", 25.0, "rare"),
                Card::new("sr-1", "Wizard", 4.0, "super_rare"),
                Card::new("ur-1", "Dragon", 0.5, "ultra_rare"),
                Card::new("ur-2", "Phoenix", 0.5, "ultra_rare"),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn construction_validates_limit() {
        for bad in [0, -10] {
            let err = PityGuarantee::new(engine(), bad, "ultra_rare").unwrap_err();
            assert_eq!(
                err,
                GachaError::InvalidArgument(ArgumentError::NonPositiveGuaranteeLimit)
            );
        }
    }

    #[test]
    fn defaults_and_normalization() {
        let pity = PityGuarantee::with_defaults(engine());
        assert_eq!(pity.guarantee_limit(), 100);
        assert_eq!(pity.guaranteed_rarity().as_str(), "ultra_rare");

        let pity = PityGuarantee::new(engine(), 10, " Super_Rare ").unwrap();
        assert_eq!(pity.guaranteed_rarity().as_str(), "super_rare");
    }

    #[test]
    fn engine_is_shared_not_copied() {
        let shared = engine();
        let pity = PityGuarantee::with_defaults(Arc::clone(&shared));
        assert!(Arc::ptr_eq(pity.engine(), &shared));
    }

    #[test]
    fn forced_draw_always_returns_guaranteed_rarity() {
        let pity = PityGuarantee::new(engine(), 100, "ultra_rare").unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for count in [100, 101, 150, 10_000] {
            for _ in 0..50 {
                let card = pity.draw(count, &mut rng).unwrap();
                assert_eq!(card.rarity.as_str(), "ultra_rare");
            }
        }
    }

    #[test]
    fn below_limit_delegates_to_engine() {
        let pity = PityGuarantee::new(engine(), 100, "ultra_rare").unwrap();
        let mut rng = StepRng::new(0, 0);
        assert_eq!(pity.draw(99, &mut rng).unwrap().id, "common-1");
    }

    #[test]
    fn negative_pity_rejected_everywhere() {
        let pity = PityGuarantee::with_defaults(engine());
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let expected = GachaError::InvalidArgument(ArgumentError::NegativePityCount);
        assert_eq!(pity.draw(-1, &mut rng).unwrap_err(), expected);
        assert_eq!(pity.draw_multiple(3, -1, &mut rng).unwrap_err(), expected);
        assert_eq!(pity.next_guarantee_info(-1).unwrap_err(), expected);
    }

    #[test]
    fn zero_count_rejected_before_pity_check() {
        let pity = PityGuarantee::with_defaults(engine());
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(
            pity.draw_multiple(0, -1, &mut rng).unwrap_err(),
            GachaError::InvalidArgument(ArgumentError::NonPositiveDrawCount)
        );
    }

    #[test]
    fn forced_draw_without_candidates_fails() {
        let pity = PityGuarantee::new(engine(), 5, "mythic").unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let err = pity.draw(5, &mut rng).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "invalid configuration: No cards with rarity mythic found"
        );
        // Below the limit the missing rarity is irrelevant.
        assert!(pity.draw(4, &mut rng).is_ok());
    }

    #[test]
    fn batch_forces_at_limit_and_tracks_counter() {
        let pity = PityGuarantee::new(engine(), 100, "ultra_rare").unwrap();
        let mut rng = StepRng::new(0, 0);
        let batch = pity.draw_batch(10, 95, &mut rng).unwrap();
        assert_eq!(batch.items.len(), 10);
        for (idx, card) in batch.items.iter().enumerate() {
            if idx == 5 {
                assert_eq!(card.rarity.as_str(), "ultra_rare");
            } else {
                assert_eq!(card.rarity.as_str(), "common");
            }
        }
        assert_eq!(batch.guaranteed_hits, 1);
        assert_eq!(batch.final_pity_count, 4);
    }

    #[test]
    fn natural_hit_resets_counter() {
        let pity = PityGuarantee::new(engine(), 100, "rare").unwrap();
        let rare = &pity.engine().items()[1];
        let common = &pity.engine().items()[0];
        assert_eq!(pity.next_pity_count(rare, 42), 0);
        assert_eq!(pity.next_pity_count(common, 42), 43);
    }

    #[test]
    fn guarantee_info_reports_remaining() {
        let pity = PityGuarantee::with_defaults(engine());
        assert_eq!(
            pity.next_guarantee_info(75).unwrap(),
            GuaranteeInfo {
                current_pity_count: 75,
                remaining: 25,
                guaranteed_at: 100,
            }
        );
        assert_eq!(pity.next_guarantee_info(150).unwrap().remaining, 0);
        assert_eq!(pity.next_guarantee_info(0).unwrap().remaining, 100);
    }

    #[test]
    fn state_flips_at_limit() {
        let pity = PityGuarantee::new(engine(), 5, "ultra_rare").unwrap();
        assert_eq!(pity.state(4), PityState::Normal);
        assert_eq!(pity.state(5), PityState::Guaranteed);
        assert_eq!(pity.state(9), PityState::Guaranteed);
    }

    #[test]
    fn config_defaults_and_validation() {
        let config = PityConfig::from_json("{}").unwrap();
        assert_eq!(config, PityConfig::default());
        assert_eq!(config.guarantee_limit, 100);

        let config = PityConfig::from_json(r#"{"guarantee_limit": 90, "guaranteed_rarity": "SSR"}"#)
            .unwrap();
        let pity = PityGuarantee::from_config(engine(), &config).unwrap();
        assert_eq!(pity.guarantee_limit(), 90);
        assert_eq!(pity.guaranteed_rarity().as_str(), "ssr");

        let bad = PityConfig {
            guarantee_limit: 0,
            ..PityConfig::default()
        };
        assert!(PityGuarantee::from_config(engine(), &bad).unwrap_err().is_argument());

        let blank = PityConfig {
            guaranteed_rarity: Rarity::new("  "),
            ..PityConfig::default()
        };
        assert!(blank.validate().unwrap_err().is_configuration());
    }
}
