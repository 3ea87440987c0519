//! # Rarity Weight Table
//!
//! Maps rarity tiers to draw weights. The table is intentionally partial:
//! a banner may choose to weight only the tiers its pool uses, and an item
//! whose tier is unmapped is rejected the moment it enters the pool rather
//! than when a draw first lands on it.

use std::collections::{BTreeMap, HashMap};

use crate::error::{GachaError, GachaResult};
use crate::item::{Item, Rarity};

/// Draw weights per rarity tier.
///
/// Weights are positive integers; higher weight means the tier is drawn
/// more often. Zero weights are rejected at insertion so the draw never
/// has to reason about unreachable tiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RarityWeights {
    weights: HashMap<Rarity, u32>,
}

impl RarityWeights {
    /// Creates an empty weight table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from tier/weight pairs.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if any weight is zero.
    pub fn from_entries(entries: impl IntoIterator<Item = (Rarity, u32)>) -> GachaResult<Self> {
        let mut table = Self::new();
        for (rarity, weight) in entries {
            table.set(rarity, weight)?;
        }
        Ok(table)
    }

    /// Builds a table from a config map of tier names to weights.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` for an unrecognized tier name
    /// or a zero weight.
    pub fn from_named(named: &BTreeMap<String, u32>) -> GachaResult<Self> {
        let mut table = Self::new();
        for (name, weight) in named {
            let rarity = Rarity::from_config_name(name).ok_or_else(|| {
                GachaError::InvalidConfig(format!("unknown rarity tier in weights: {name}"))
            })?;
            table.set(rarity, *weight)?;
        }
        Ok(table)
    }

    /// Renders the table as a config map of tier names to weights.
    #[must_use]
    pub fn to_named(&self) -> BTreeMap<String, u32> {
        self.weights
            .iter()
            .map(|(rarity, weight)| (rarity.config_name().to_owned(), *weight))
            .collect()
    }

    /// Sets the weight for a tier, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if `weight` is zero.
    pub fn set(&mut self, rarity: Rarity, weight: u32) -> GachaResult<()> {
        if weight == 0 {
            return Err(GachaError::InvalidConfig(format!(
                "weight for rarity {rarity} must be positive"
            )));
        }
        self.weights.insert(rarity, weight);
        Ok(())
    }

    /// Returns the weight for a tier, or `None` if the tier is unmapped.
    #[inline]
    #[must_use]
    pub fn weight_of(&self, rarity: Rarity) -> Option<u32> {
        self.weights.get(&rarity).copied()
    }

    /// Returns true if the tier has a weight.
    #[inline]
    #[must_use]
    pub fn is_mapped(&self, rarity: Rarity) -> bool {
        self.weights.contains_key(&rarity)
    }

    /// Returns the weight for an item's tier.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::UnknownRarity` naming the item if its tier is
    /// unmapped. Banners call this when an item enters the pool so the
    /// gap surfaces at registration, never mid-draw.
    pub fn weight_for_item(&self, item: &Item) -> GachaResult<u32> {
        self.weight_of(item.rarity)
            .ok_or_else(|| GachaError::UnknownRarity {
                item_id: item.id.clone(),
                rarity: item.rarity.config_name().to_owned(),
            })
    }

    /// Sums the weights of every item in a pool.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::UnknownRarity` for the first item whose tier
    /// is unmapped, or `GachaError::ArithmeticOverflow` if the sum leaves
    /// the 64-bit range.
    pub fn total_for_pool(&self, pool: &[Item]) -> GachaResult<u64> {
        let mut total = 0u64;
        for item in pool {
            let weight = u64::from(self.weight_for_item(item)?);
            total = total
                .checked_add(weight)
                .ok_or(GachaError::ArithmeticOverflow)?;
        }
        Ok(total)
    }
}
