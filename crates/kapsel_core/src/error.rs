//! # Gacha Error Types
//!
//! All errors that can occur in the banner engine.

use thiserror::Error;

/// Errors that can occur in the banner engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GachaError {
    /// Attempted to pull from a banner with no items in its pool.
    #[error("banner pool is empty: nothing to draw")]
    EmptyPool,

    /// An item carries a rarity tier with no entry in the weight table.
    #[error("no weight configured for rarity {rarity} on item {item_id}")]
    UnknownRarity {
        /// The item whose rarity has no weight.
        item_id: String,
        /// The unmapped rarity tier, as its config name.
        rarity: String,
    },

    /// Pull rejected because the requester cannot cover the cost.
    #[error("insufficient credits: need {required}, have {available}")]
    InsufficientCredits {
        /// The credits the pull would debit.
        required: i64,
        /// The credits the requester holds.
        available: i64,
    },

    /// Banner not found in the registry.
    #[error("banner not found: {0}")]
    BannerNotFound(String),

    /// Requester has no account in the registry.
    #[error("account not found for requester {0}")]
    AccountNotFound(u64),

    /// Arithmetic overflow in credit calculation.
    #[error("arithmetic overflow in credit calculation")]
    ArithmeticOverflow,

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for banner operations.
pub type GachaResult<T> = Result<T, GachaError>;
