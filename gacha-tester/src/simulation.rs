use anyhow::{Result, bail};
use gacha_core::numbers::{count_to_f64, round_to_places};
use gacha_core::{
    Card, DrawEngine, DrawResult, DrawRng, MultiDraw, PityConfig, PityGuarantee, PityState, Rarity,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// How many sessions to run per seed and how each session pulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPlan {
    pub sessions: usize,
    pub pulls_per_session: usize,
    pub batch_size: usize,
    pub start_pity: i64,
    /// Rarity whose droughts are tracked; the pity rarity when pity is on.
    pub tracked_rarity: Rarity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityStat {
    pub rarity: String,
    pub count: usize,
    pub observed_pct: f64,
    pub expected_pct: f64,
}

/// Aggregated outcome of every session run under one seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub total_draws: usize,
    pub rarity_stats: Vec<RarityStat>,
    pub forced_guarantees: usize,
    pub longest_drought: i64,
    pub final_pity_counts: Vec<i64>,
    pub rng_pulls: u64,
    /// First batch of the first session, projected for display.
    pub sample: Vec<DrawResult>,
}

/// Runs plans against one catalog.
pub struct Simulator {
    engine: Arc<DrawEngine<Card>>,
    pity: Option<PityGuarantee<Card>>,
    expected: BTreeMap<String, f64>,
}

impl Simulator {
    /// # Errors
    ///
    /// Returns an error when pity is enabled but the catalog has no card of
    /// the guaranteed rarity, or the pity config is invalid.
    pub fn new(engine: Arc<DrawEngine<Card>>, pity: Option<&PityConfig>) -> Result<Self> {
        let pity = match pity {
            Some(config) => {
                let guarantee = PityGuarantee::from_config(Arc::clone(&engine), config)?;
                let rarity = guarantee.guaranteed_rarity().as_str();
                if engine.items_with_rarity(rarity).next().is_none() {
                    bail!("pity is enabled but the catalog has no {rarity} cards");
                }
                Some(guarantee)
            }
            None => None,
        };
        let expected = expected_rarity_pct(&engine);
        Ok(Self {
            engine,
            pity,
            expected,
        })
    }

    #[must_use]
    pub fn engine(&self) -> &DrawEngine<Card> {
        &self.engine
    }

    #[must_use]
    pub const fn pity(&self) -> Option<&PityGuarantee<Card>> {
        self.pity.as_ref()
    }

    /// # Errors
    ///
    /// Propagates draw errors from the core library.
    pub fn run(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut forced_guarantees = 0;
        let mut longest_drought = 0_i64;
        let mut final_pity_counts = Vec::with_capacity(plan.sessions);
        let mut rng_pulls = 0;
        let mut sample = Vec::new();

        let ten_pull = MultiDraw::new(Arc::clone(&self.engine), plan.batch_size)?;

        for session in 0..plan.sessions {
            let mut rng = DrawRng::for_stream(seed, &format!("session-{session}"));
            let mut pity_count = plan.start_pity;
            let mut drought = 0_i64;
            let mut remaining = plan.pulls_per_session;

            while remaining > 0 {
                let size = remaining.min(plan.batch_size);
                let drawn = if let Some(pity) = &self.pity {
                    let batch = pity.draw_batch(size, pity_count, &mut rng)?;
                    forced_guarantees += batch.guaranteed_hits;
                    pity_count = batch.final_pity_count;
                    batch.items
                } else if size == plan.batch_size {
                    ten_pull.execute(&mut rng)?
                } else {
                    self.engine.draw_multiple(size, &mut rng)?
                };

                if sample.is_empty() {
                    sample = drawn.iter().map(|card| DrawResult::from(*card)).collect();
                }
                for card in &drawn {
                    *counts.entry(card.rarity.to_string()).or_insert(0) += 1;
                    if plan.tracked_rarity == card.rarity {
                        drought = 0;
                    } else {
                        drought += 1;
                        longest_drought = longest_drought.max(drought);
                    }
                }
                remaining -= size;
            }

            rng_pulls += rng.draws();
            final_pity_counts.push(pity_count);
            debug!("seed {seed} session {session}: pity counter ends at {pity_count}");
        }

        let total_draws = plan.sessions * plan.pulls_per_session;
        let rarity_stats = self.rarity_stats(&counts, total_draws);
        info!("seed {seed}: {total_draws} draws, {forced_guarantees} forced guarantees");

        Ok(SimulationSummary {
            seed,
            total_draws,
            rarity_stats,
            forced_guarantees,
            longest_drought,
            final_pity_counts,
            rng_pulls,
            sample,
        })
    }

    fn rarity_stats(&self, counts: &BTreeMap<String, usize>, total: usize) -> Vec<RarityStat> {
        let mut stats: Vec<RarityStat> = self
            .expected
            .iter()
            .map(|(rarity, expected_pct)| {
                let count = counts.get(rarity).copied().unwrap_or(0);
                RarityStat {
                    rarity: rarity.clone(),
                    count,
                    observed_pct: observed_pct(count, total),
                    expected_pct: *expected_pct,
                }
            })
            .collect();
        stats.sort_by(|a, b| b.expected_pct.total_cmp(&a.expected_pct));
        stats
    }
}

/// Rarities whose observed share drifted further than `tolerance_pct` points.
#[must_use]
pub fn rate_deviations(summary: &SimulationSummary, tolerance_pct: f64) -> Vec<String> {
    summary
        .rarity_stats
        .iter()
        .filter(|stat| (stat.observed_pct - stat.expected_pct).abs() > tolerance_pct)
        .map(|stat| {
            format!(
                "seed {}: {} observed {:.2}% vs expected {:.2}%",
                summary.seed, stat.rarity, stat.observed_pct, stat.expected_pct
            )
        })
        .collect()
}

/// The pity state every session ended in, keyed by state.
#[must_use]
pub fn final_states(
    pity: &PityGuarantee<Card>,
    summary: &SimulationSummary,
) -> BTreeMap<&'static str, usize> {
    let mut states = BTreeMap::new();
    for count in &summary.final_pity_counts {
        let label = match pity.state(*count) {
            PityState::Normal => "normal",
            PityState::Guaranteed => "guaranteed",
        };
        *states.entry(label).or_insert(0) += 1;
    }
    states
}

fn expected_rarity_pct(engine: &DrawEngine<Card>) -> BTreeMap<String, f64> {
    let mut expected: BTreeMap<String, f64> = BTreeMap::new();
    for card in engine.items() {
        *expected.entry(card.rarity.to_string()).or_insert(0.0) +=
            card.weight / engine.total_weight() * 100.0;
    }
    for pct in expected.values_mut() {
        *pct = round_to_places(*pct, 2);
    }
    expected
}

fn observed_pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to_places(count_to_f64(count) / count_to_f64(total) * 100.0, 2)
}
