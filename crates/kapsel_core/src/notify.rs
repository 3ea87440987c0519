//! # Pull Notifications
//!
//! The notification seam between the banner and whatever is watching it.
//! Every successful pull produces one [`PullEvent`] carrying the full
//! post-transaction [`EconomySnapshot`], never a diff. A late or lossy
//! observer reconciles from any single event.
//!
//! Notifiers are composed onto a banner as trait objects. Publishing is
//! fire-and-forget: the signature is infallible and implementations
//! absorb their own failures. A slow subscriber can lose events; it can
//! never fail the pull that produced them.

use serde::{Deserialize, Serialize};

use crate::banner::BannerId;
use crate::currency::Credits;
use crate::item::{Item, ItemId};
use crate::session::{EconomyState, RequesterId};

/// Full requester economy state at a point in time.
///
/// Owned ids are sorted, so two snapshots of the same state compare equal
/// field by field regardless of insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// The requester this snapshot belongs to.
    pub requester: RequesterId,
    /// Balance after the mutation.
    pub credits: Credits,
    /// Every owned item id, sorted.
    pub owned: Vec<ItemId>,
}

impl EconomySnapshot {
    /// Captures the current state of a requester's economy.
    #[must_use]
    pub fn capture(requester: RequesterId, state: &EconomyState) -> Self {
        Self {
            requester,
            credits: state.credits(),
            owned: state.owned_sorted(),
        }
    }

    /// Returns true if the snapshot contains the item id.
    #[must_use]
    pub fn owns(&self, item_id: &str) -> bool {
        self.owned.binary_search_by(|id| id.as_str().cmp(item_id)).is_ok()
    }
}

/// What a single pull produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullResult {
    /// The item the draw landed on.
    pub item: Item,
    /// True if the requester already owned the item.
    pub duplicate: bool,
    /// The credits returned for a duplicate, zero for a new item.
    pub refund: Credits,
    /// Requester economy after the whole transaction.
    pub snapshot: EconomySnapshot,
}

/// The mutation event published after every successful pull.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullEvent {
    /// The banner the pull ran against.
    pub banner_id: BannerId,
    /// The pull outcome, snapshot included.
    pub pull: PullResult,
}

/// Observer seam for pull events.
///
/// Implementations must not panic and must not block the caller; drop or
/// buffer under pressure instead. The banner publishes strictly after its
/// mutations are complete, so an observer always sees settled state.
pub trait PullNotifier: Send + Sync {
    /// Delivers one pull event.
    fn publish(&self, event: &PullEvent);
}
