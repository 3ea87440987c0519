//! # Item Catalog Types
//!
//! Pool items and their rarity tiers. Items are immutable once a banner
//! owns them; all balance and ownership state lives with the requester.

use serde::{Deserialize, Serialize};

/// Unique item identifier within a banner pool.
///
/// Ids are short strings from the banner config ("astral_sword",
/// "plain_cap"). Ownership checks compare ids, never item instances.
pub type ItemId = String;

/// Rarity tier for pool items.
///
/// Tiers are ordered from most to least frequent. The weight table maps
/// each tier to a draw weight; an item whose tier has no mapping is
/// rejected when it enters the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Rarity {
    /// Common items - the bulk of every pool.
    Common = 0,
    /// Rare items - the mid tier.
    Rare = 1,
    /// Ultra-rare items - the chase tier.
    UltraRare = 2,
}

impl Rarity {
    /// All tiers in ascending order, for iteration and histograms.
    pub const ALL: [Self; 3] = [Self::Common, Self::Rare, Self::UltraRare];

    /// The tier's name as it appears in config files.
    #[inline]
    #[must_use]
    pub const fn config_name(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::UltraRare => "ultra_rare",
        }
    }

    /// Parses a tier from its config name. Returns `None` for unknown names.
    #[must_use]
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "common" => Some(Self::Common),
            "rare" => Some(Self::Rare),
            "ultra_rare" => Some(Self::UltraRare),
            _ => None,
        }
    }

    /// Converts from u8 to Rarity.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Common,
            1 => Self::Rare,
            _ => Self::UltraRare,
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.config_name())
    }
}

/// A single item in a banner pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique id within the pool.
    pub id: ItemId,
    /// Rarity tier driving the draw weight.
    pub rarity: Rarity,
}

impl Item {
    /// Creates a new pool item.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ItemId>, rarity: Rarity) -> Self {
        Self {
            id: id.into(),
            rarity,
        }
    }
}
