//! # Weighted Draw
//!
//! **Tier-weighted selection over an ordered pool**
//!
//! A draw rolls one uniform integer in `[0, total_weight)` and maps it to
//! a pool index. Two mapping rules ship side by side:
//!
//! - [`DrawMode::Legacy`]: the rule existing pull records were produced
//!   under. Kept as the default so tuned banner configs and recorded
//!   outcomes stay valid.
//! - [`DrawMode::Proportional`]: the standard cumulative-threshold walk.
//!   Each item's chance is exactly `weight / total_weight`.
//!
//! ## The legacy rule, precisely
//!
//! Legacy compares the roll against each item's OWN weight, not a running
//! total, and returns the first index whose weight exceeds the roll. When
//! no weight does, it returns index 0.
//!
//! ```text
//! pool [A common(10), B rare(5)], total 15
//!
//! roll   0..10   matches A at index 0 (10 > roll)
//! roll  10..15   matches nothing, falls back to index 0 (A again)
//! ```
//!
//! Consequences worth knowing before tuning a pool:
//!
//! - Selection skews hard toward the head of the pool. In the example
//!   above B is unreachable.
//! - Pool order changes outcomes. `[B, A]` gives B rolls `0..5` plus the
//!   `10..15` fallback, two thirds of all draws.
//! - With all weights equal, every roll at or above the shared weight
//!   falls back to index 0.
//!
//! The proportional rule has none of these properties and is the mode the
//! fairness tests target.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GachaError, GachaResult};
use crate::item::{Item, ItemId, Rarity};
use crate::weights::RarityWeights;

/// Which selection rule a banner runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// First index whose own weight exceeds the roll, index 0 otherwise.
    #[default]
    Legacy,
    /// First index whose cumulative weight exceeds the roll.
    Proportional,
}

/// Draws one pool index.
///
/// # Errors
///
/// Returns `GachaError::EmptyPool` for an empty pool and
/// `GachaError::UnknownRarity` if any pool item's tier is unmapped. A
/// banner validates tiers at registration, so the latter only surfaces
/// when pool and weights are assembled by hand.
pub fn draw_index(
    pool: &[Item],
    weights: &RarityWeights,
    mode: DrawMode,
    rng: &mut impl Rng,
) -> GachaResult<usize> {
    if pool.is_empty() {
        return Err(GachaError::EmptyPool);
    }

    let total = weights.total_for_pool(pool)?;
    let roll = rng.gen_range(0..total);

    match mode {
        DrawMode::Legacy => legacy_pick(pool, weights, roll),
        DrawMode::Proportional => proportional_pick(pool, weights, roll),
    }
}

/// Draws one item from the pool.
///
/// # Errors
///
/// Same as [`draw_index`].
pub fn draw_one<'pool>(
    pool: &'pool [Item],
    weights: &RarityWeights,
    mode: DrawMode,
    rng: &mut impl Rng,
) -> GachaResult<&'pool Item> {
    let index = draw_index(pool, weights, mode, rng)?;
    Ok(&pool[index])
}

/// The legacy comparison: own weight versus the roll, fallback index 0.
fn legacy_pick(pool: &[Item], weights: &RarityWeights, roll: u64) -> GachaResult<usize> {
    for (index, item) in pool.iter().enumerate() {
        if u64::from(weights.weight_for_item(item)?) > roll {
            return Ok(index);
        }
    }
    Ok(0)
}

/// The cumulative walk: first index whose running total exceeds the roll.
fn proportional_pick(pool: &[Item], weights: &RarityWeights, roll: u64) -> GachaResult<usize> {
    let mut cumulative = 0u64;
    for (index, item) in pool.iter().enumerate() {
        cumulative += u64::from(weights.weight_for_item(item)?);
        if roll < cumulative {
            return Ok(index);
        }
    }
    // roll < total, so the walk lands inside the loop; this arm keeps the
    // function total.
    Ok(pool.len() - 1)
}

/// Histogram data from simulated draws.
///
/// Simulation never touches requester state. It runs the selection alone,
/// which makes it safe to call against a live banner for tuning.
#[derive(Clone, Debug, Default)]
pub struct DrawStatistics {
    /// Total number of simulated draws.
    pub total_draws: u64,
    /// Draw counts by item id.
    pub item_counts: HashMap<ItemId, u64>,
    /// Draw counts by rarity tier.
    pub rarity_counts: HashMap<Rarity, u64>,
}

impl DrawStatistics {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one drawn item.
    pub fn record(&mut self, item: &Item) {
        self.total_draws += 1;
        *self.item_counts.entry(item.id.clone()).or_insert(0) += 1;
        *self.rarity_counts.entry(item.rarity).or_insert(0) += 1;
    }

    /// Returns how many draws landed on the item.
    #[must_use]
    pub fn count_of(&self, item_id: &str) -> u64 {
        self.item_counts.get(item_id).copied().unwrap_or(0)
    }

    /// Returns the fraction of draws that landed on the item.
    #[must_use]
    pub fn share_of(&self, item_id: &str) -> f64 {
        if self.total_draws == 0 {
            0.0
        } else {
            self.count_of(item_id) as f64 / self.total_draws as f64
        }
    }

    /// Returns the fraction of draws that landed on the tier.
    #[must_use]
    pub fn rarity_share(&self, rarity: Rarity) -> f64 {
        if self.total_draws == 0 {
            0.0
        } else {
            let count = self.rarity_counts.get(&rarity).copied().unwrap_or(0);
            count as f64 / self.total_draws as f64
        }
    }
}
