//! # The Parlor
//!
//! The owning context for banners and accounts. The banner engine
//! deliberately does no locking of its own; the parlor provides the
//! contract the engine assumes: at most one in-flight pull per
//! requester, enforced here by taking the account table lock for the
//! whole transaction.
//!
//! Both notification surfaces are wired in at construction: every
//! registered banner publishes to the parlor's [`BroadcastHub`] and
//! [`EconomyMirror`], so one pull lands on both with the same snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use kapsel_core::{
    Banner, BannerConfig, BannerId, Credits, DrawStatistics, EconomySnapshot, GachaError,
    GachaResult, PlayerAccount, PullResult, Requester, RequesterId,
};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::hub::BroadcastHub;
use crate::observable::EconomyMirror;

/// Banner and account registry with per-requester pull serialization.
///
/// The parlor is `Send + Sync`: banners sit behind a read-write lock
/// (reads for pulls, writes for registration), accounts behind a mutex
/// that serializes every pull, and the draw RNG behind its own mutex so
/// live draws consume one shared stream.
pub struct Parlor {
    /// Registered banners by id.
    banners: RwLock<HashMap<BannerId, Banner>>,
    /// Open accounts by requester id. The lock is the pull serializer.
    accounts: Mutex<HashMap<RequesterId, PlayerAccount>>,
    /// Shared draw RNG.
    rng: Mutex<StdRng>,
    /// Server-side broadcast surface.
    hub: Arc<BroadcastHub>,
    /// Client-local observable surface.
    mirror: Arc<EconomyMirror>,
}

impl Parlor {
    /// Creates a parlor drawing from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a parlor with a seeded RNG for reproducible draw runs.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            banners: RwLock::new(HashMap::new()),
            accounts: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
            hub: Arc::new(BroadcastHub::new()),
            mirror: Arc::new(EconomyMirror::new()),
        }
    }

    /// Builds a banner from its config, wires both notification
    /// surfaces onto it, and registers it.
    ///
    /// # Errors
    ///
    /// Returns whatever [`Banner::from_config`] rejects, plus
    /// `GachaError::InvalidConfig` if the id is already registered.
    pub fn register_banner(&self, config: &BannerConfig) -> GachaResult<()> {
        let mut banner = Banner::from_config(config)?;
        banner.attach_notifier(self.hub.clone());
        banner.attach_notifier(self.mirror.clone());

        let mut banners = self.banners.write();
        if banners.contains_key(banner.id()) {
            return Err(GachaError::InvalidConfig(format!(
                "banner already registered: {}",
                banner.id()
            )));
        }
        tracing::info!(
            "registered banner {} ({} items, cost {})",
            banner.id(),
            banner.pool().len(),
            banner.pull_cost()
        );
        banners.insert(banner.id().to_owned(), banner);
        Ok(())
    }

    /// Opens an account with a starting balance.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if the requester already has
    /// an open account.
    pub fn open_account(
        &self,
        requester: RequesterId,
        starting_credits: Credits,
    ) -> GachaResult<()> {
        let mut accounts = self.accounts.lock();
        if accounts.contains_key(&requester) {
            return Err(GachaError::InvalidConfig(format!(
                "account already open for requester {requester}"
            )));
        }
        tracing::info!(
            "opened account for requester {} with {}",
            requester,
            starting_credits
        );
        accounts.insert(requester, PlayerAccount::new(requester, starting_credits));
        Ok(())
    }

    /// Runs one pull for a requester against a registered banner.
    ///
    /// The account table lock is held for the whole transaction, which
    /// gives the engine its at-most-one-pull-per-requester guarantee.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::BannerNotFound` / `GachaError::AccountNotFound`
    /// for unknown ids, and whatever [`Banner::pull`] surfaces. A failed
    /// pull mutates nothing and publishes nothing.
    pub fn pull(&self, requester: RequesterId, banner_id: &str) -> GachaResult<PullResult> {
        let banners = self.banners.read();
        let banner = banners
            .get(banner_id)
            .ok_or_else(|| GachaError::BannerNotFound(banner_id.to_owned()))?;

        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(&requester)
            .ok_or(GachaError::AccountNotFound(requester))?;

        let outcome = {
            let mut rng = self.rng.lock();
            banner.pull(account, &mut *rng)
        };

        match &outcome {
            Ok(result) => tracing::debug!(
                "requester {} pulled {} from {} (duplicate: {}, balance: {})",
                requester,
                result.item.id,
                banner_id,
                result.duplicate,
                result.snapshot.credits
            ),
            Err(error) => tracing::warn!(
                "pull failed for requester {} on {}: {}",
                requester,
                banner_id,
                error
            ),
        }
        outcome
    }

    /// Simulates draws against a registered banner without touching any
    /// account, for tuning weight tables on a live parlor.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::BannerNotFound` for an unknown id and
    /// `GachaError::EmptyPool` for an unpopulated one.
    pub fn simulate(&self, banner_id: &str, iterations: u32) -> GachaResult<DrawStatistics> {
        let banners = self.banners.read();
        let banner = banners
            .get(banner_id)
            .ok_or_else(|| GachaError::BannerNotFound(banner_id.to_owned()))?;
        let mut rng = self.rng.lock();
        banner.simulate(iterations, &mut *rng)
    }

    /// Ids of every registered banner, sorted.
    #[must_use]
    pub fn banner_ids(&self) -> Vec<BannerId> {
        let mut ids: Vec<BannerId> = self.banners.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// The plain config record of a registered banner.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::BannerNotFound` for an unknown id.
    pub fn banner_config(&self, banner_id: &str) -> GachaResult<BannerConfig> {
        self.banners
            .read()
            .get(banner_id)
            .map(Banner::to_config)
            .ok_or_else(|| GachaError::BannerNotFound(banner_id.to_owned()))
    }

    /// Current balance of an account.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::AccountNotFound` for an unknown requester.
    pub fn credits_of(&self, requester: RequesterId) -> GachaResult<Credits> {
        self.accounts
            .lock()
            .get(&requester)
            .map(|account| account.economy.credits())
            .ok_or(GachaError::AccountNotFound(requester))
    }

    /// Whether an account owns an item.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::AccountNotFound` for an unknown requester.
    pub fn owns(&self, requester: RequesterId, item_id: &str) -> GachaResult<bool> {
        self.accounts
            .lock()
            .get(&requester)
            .map(|account| account.economy.owns(item_id))
            .ok_or(GachaError::AccountNotFound(requester))
    }

    /// A fresh snapshot of an account's economy state.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::AccountNotFound` for an unknown requester.
    pub fn snapshot_of(&self, requester: RequesterId) -> GachaResult<EconomySnapshot> {
        self.accounts
            .lock()
            .get(&requester)
            .map(|account| EconomySnapshot::capture(account.requester_id(), account.economy()))
            .ok_or(GachaError::AccountNotFound(requester))
    }

    /// Registers a broadcast subscriber on the parlor's hub.
    #[must_use]
    pub fn subscribe(&self) -> crossbeam_channel::Receiver<kapsel_core::PullEvent> {
        self.hub.subscribe()
    }

    /// Registers a broadcast subscriber with an explicit capacity.
    #[must_use]
    pub fn subscribe_with_capacity(
        &self,
        capacity: usize,
    ) -> crossbeam_channel::Receiver<kapsel_core::PullEvent> {
        self.hub.subscribe_with_capacity(capacity)
    }

    /// The server-side broadcast surface.
    #[must_use]
    pub fn hub(&self) -> Arc<BroadcastHub> {
        self.hub.clone()
    }

    /// The client-local observable surface.
    #[must_use]
    pub fn mirror(&self) -> Arc<EconomyMirror> {
        self.mirror.clone()
    }
}

impl Default for Parlor {
    fn default() -> Self {
        Self::new()
    }
}
