//! # Broadcast Hub
//!
//! Server-side fan-out for pull events. Every subscriber gets its own
//! bounded channel; `publish` clones the event into each one with
//! `try_send` and moves on. A subscriber that falls behind loses events
//! (counted, logged), a subscriber that went away is pruned on the next
//! publish, and neither can ever stall or fail the pull that produced
//! the event.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use kapsel_core::{PullEvent, PullNotifier};
use parking_lot::Mutex;

/// Default per-subscriber channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Fan-out point for pull events.
///
/// Attach one hub to any number of banners and hand receivers to any
/// number of observer threads. Delivery is at-most-once per subscriber:
/// a full channel drops the event for that subscriber only.
pub struct BroadcastHub {
    /// One sender per live subscriber.
    subscribers: Mutex<Vec<Sender<PullEvent>>>,
    /// Events dropped on full channels, across all subscribers.
    dropped: AtomicU64,
}

impl BroadcastHub {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Registers a subscriber with the default channel capacity.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<PullEvent> {
        self.subscribe_with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Registers a subscriber with an explicit channel capacity.
    ///
    /// Small capacities are useful for observers that only care about
    /// the freshest events and can afford to lose the rest.
    #[must_use]
    pub fn subscribe_with_capacity(&self, capacity: usize) -> Receiver<PullEvent> {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Number of live subscribers.
    ///
    /// Subscribers whose receivers were dropped still count until the
    /// next publish prunes them.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Total events dropped on full subscriber channels.
    #[must_use]
    pub fn dropped_event_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PullNotifier for BroadcastHub {
    fn publish(&self, event: &PullEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    "subscriber channel full, dropped pull event for requester {} ({} dropped total)",
                    event.pull.snapshot.requester,
                    total
                );
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}
