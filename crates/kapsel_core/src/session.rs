//! # Requester Accounts
//!
//! Wallet and collection state for whoever is pulling.
//! The banner never stores requester state; it reaches it through the
//! [`Requester`] trait so hosts can back accounts however they like.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::currency::Credits;
use crate::error::GachaResult;
use crate::item::ItemId;

/// Unique identifier for a requester.
pub type RequesterId = u64;

/// Wallet and collection state owned by a requester.
///
/// The collection tracks item ids, never item instances. Credits may go
/// negative under the default funds policy; the state records whatever
/// the transaction produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyState {
    /// Current credit balance.
    credits: Credits,
    /// Ids of every item this requester has collected.
    owned: BTreeSet<ItemId>,
}

impl EconomyState {
    /// Creates a state with a starting balance and empty collection.
    #[must_use]
    pub fn new(starting_credits: Credits) -> Self {
        Self {
            credits: starting_credits,
            owned: BTreeSet::new(),
        }
    }

    /// Returns the current balance.
    #[inline]
    #[must_use]
    pub const fn credits(&self) -> Credits {
        self.credits
    }

    /// Returns true if the collection contains the item id.
    #[inline]
    #[must_use]
    pub fn owns(&self, item_id: &str) -> bool {
        self.owned.contains(item_id)
    }

    /// Returns the number of distinct items collected.
    #[inline]
    #[must_use]
    pub fn owned_count(&self) -> usize {
        self.owned.len()
    }

    /// Returns the collected ids in sorted order.
    #[must_use]
    pub fn owned_sorted(&self) -> Vec<ItemId> {
        self.owned.iter().cloned().collect()
    }

    /// Removes `amount` from the balance. The balance may go negative.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::ArithmeticOverflow` if the subtraction leaves
    /// the representable range.
    pub fn debit(&mut self, amount: Credits) -> GachaResult<()> {
        self.credits = self.credits.safe_sub(amount)?;
        Ok(())
    }

    /// Adds `amount` to the balance.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::ArithmeticOverflow` if the addition leaves
    /// the representable range.
    pub fn deposit(&mut self, amount: Credits) -> GachaResult<()> {
        self.credits = self.credits.safe_add(amount)?;
        Ok(())
    }

    /// Adds an item id to the collection.
    ///
    /// Returns true if the id was new, false if it was already owned.
    pub fn grant(&mut self, item_id: ItemId) -> bool {
        self.owned.insert(item_id)
    }
}

/// Anything that can pull from a banner.
///
/// The banner reads and mutates requester state only through this seam,
/// so a host can wrap a database row, a session object, or a plain
/// [`PlayerAccount`].
pub trait Requester {
    /// Stable identifier for logging and event routing.
    fn requester_id(&self) -> RequesterId;

    /// Read access to the wallet and collection.
    fn economy(&self) -> &EconomyState;

    /// Write access to the wallet and collection.
    fn economy_mut(&mut self) -> &mut EconomyState;
}

/// A plain in-memory requester account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAccount {
    /// The account's id.
    pub id: RequesterId,
    /// The account's wallet and collection.
    pub economy: EconomyState,
}

impl PlayerAccount {
    /// Creates an account with a starting balance.
    #[must_use]
    pub fn new(id: RequesterId, starting_credits: Credits) -> Self {
        Self {
            id,
            economy: EconomyState::new(starting_credits),
        }
    }
}

impl Requester for PlayerAccount {
    #[inline]
    fn requester_id(&self) -> RequesterId {
        self.id
    }

    #[inline]
    fn economy(&self) -> &EconomyState {
        &self.economy
    }

    #[inline]
    fn economy_mut(&mut self) -> &mut EconomyState {
        &mut self.economy
    }
}
