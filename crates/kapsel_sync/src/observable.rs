//! # Economy Mirror
//!
//! The client-local observation surface. The mirror keeps the latest
//! [`EconomySnapshot`] per requester for direct reads (UI binding polls
//! this) and buffers every event it sees for consumers that want the
//! sequence rather than the end state (a frame loop drains the buffer
//! once per tick).
//!
//! Because every event carries the full snapshot, a mirror that missed
//! events is still correct after the next one arrives.

use std::collections::HashMap;

use kapsel_core::{EconomySnapshot, PullEvent, PullNotifier, RequesterId};
use parking_lot::{Mutex, RwLock};

/// Latest-state store plus a drainable event backlog.
pub struct EconomyMirror {
    /// Latest snapshot per requester.
    latest: RwLock<HashMap<RequesterId, EconomySnapshot>>,
    /// Events not yet drained by the consumer.
    backlog: Mutex<Vec<PullEvent>>,
}

impl EconomyMirror {
    /// Creates an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(HashMap::new()),
            backlog: Mutex::new(Vec::with_capacity(64)),
        }
    }

    /// Returns the latest snapshot observed for a requester, if any.
    #[must_use]
    pub fn latest(&self, requester: RequesterId) -> Option<EconomySnapshot> {
        self.latest.read().get(&requester).cloned()
    }

    /// Number of requesters with at least one observed snapshot.
    #[must_use]
    pub fn tracked_requesters(&self) -> usize {
        self.latest.read().len()
    }

    /// Takes every buffered event, oldest first.
    #[must_use]
    pub fn drain_events(&self) -> Vec<PullEvent> {
        let mut backlog = self.backlog.lock();
        std::mem::take(&mut *backlog)
    }

    /// Number of buffered events awaiting a drain.
    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.backlog.lock().len()
    }
}

impl Default for EconomyMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl PullNotifier for EconomyMirror {
    fn publish(&self, event: &PullEvent) {
        self.latest
            .write()
            .insert(event.pull.snapshot.requester, event.pull.snapshot.clone());
        self.backlog.lock().push(event.clone());
    }
}
