//! # Banner Transactions
//!
//! A banner owns an ordered item pool and the pull economics around it.
//! The pull is the only compound operation in the crate:
//!
//! ```text
//! pull(requester) ->
//!   1. Gate: pool must be non-empty (nothing is touched on failure)
//!   2. Gate: funds policy, before the RNG advances
//!   3. Draw one item (weighted, mode dependent)
//!   4. Debit the pull cost, unconditionally
//!   5. Duplicate id? deposit the rounded refund. New id? grant it.
//!   6. Snapshot the economy and publish to every notifier
//!   7. Return the result
//! ```
//!
//! Gates run before any mutation. Once the debit lands, the rest of the
//! pipeline cannot fail: the refund never exceeds the cost, so the
//! deposit fits wherever the debit did, and publishing is fire-and-forget
//! by contract.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::currency::{Credits, RefundFraction};
use crate::draw::{draw_one, DrawMode, DrawStatistics};
use crate::error::{GachaError, GachaResult};
use crate::item::{Item, Rarity};
use crate::notify::{EconomySnapshot, PullEvent, PullNotifier, PullResult};
use crate::session::Requester;
use crate::weights::RarityWeights;

/// Unique banner identifier.
pub type BannerId = String;

/// What happens when a requester cannot cover the pull cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundsPolicy {
    /// No gate. The debit always lands and balances may go negative.
    /// Hosts that authorize spend upstream run this policy.
    #[default]
    AllowDebt,
    /// Reject the pull with `InsufficientCredits` before the draw.
    RequireBalance,
}

/// Plain serializable record of a banner's configuration.
///
/// Notifiers are runtime composition and are not part of the record;
/// reattach them after [`Banner::from_config`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Banner id.
    pub id: BannerId,
    /// Credits debited per pull. Must be positive.
    pub pull_cost: Credits,
    /// Duplicate refund fraction in basis points (0..=10000).
    pub refund_bp: u32,
    /// Selection rule. Defaults to the legacy rule.
    #[serde(default)]
    pub draw_mode: DrawMode,
    /// Funds gate. Defaults to allowing debt.
    #[serde(default)]
    pub funds_policy: FundsPolicy,
    /// Tier name to weight map.
    pub weights: BTreeMap<String, u32>,
    /// The ordered item pool.
    pub pool: Vec<Item>,
}

/// A banner: an ordered pool plus the economics of pulling from it.
///
/// The banner holds no requester state. `pull` takes `&self` and reaches
/// the wallet through the [`Requester`] seam, so one banner serves any
/// number of requesters concurrently as long as each requester's pulls
/// are serialized by the caller.
pub struct Banner {
    id: BannerId,
    pool: Vec<Item>,
    pull_cost: Credits,
    refund: RefundFraction,
    weights: RarityWeights,
    draw_mode: DrawMode,
    funds_policy: FundsPolicy,
    notifiers: Vec<Arc<dyn PullNotifier>>,
}

impl Banner {
    /// Creates a banner with an empty pool, the legacy draw rule and the
    /// debt-allowing funds policy.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if `pull_cost` is not positive.
    pub fn new(
        id: impl Into<BannerId>,
        pull_cost: Credits,
        refund: RefundFraction,
        weights: RarityWeights,
    ) -> GachaResult<Self> {
        if pull_cost.amount() <= 0 {
            return Err(GachaError::InvalidConfig(format!(
                "pull cost must be positive, got {pull_cost}"
            )));
        }
        Ok(Self {
            id: id.into(),
            pool: Vec::new(),
            pull_cost,
            refund,
            weights,
            draw_mode: DrawMode::default(),
            funds_policy: FundsPolicy::default(),
            notifiers: Vec::new(),
        })
    }

    /// Builds a banner from its plain config record.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` for a non-positive cost, an
    /// out-of-range refund, an unknown tier name, a zero weight or a
    /// duplicate pool id, and `GachaError::UnknownRarity` for a pool item
    /// whose tier carries no weight.
    pub fn from_config(config: &BannerConfig) -> GachaResult<Self> {
        let weights = RarityWeights::from_named(&config.weights)?;
        let refund = RefundFraction::from_bp(config.refund_bp)?;
        let mut banner = Self::new(config.id.clone(), config.pull_cost, refund, weights)?;
        banner.set_draw_mode(config.draw_mode);
        banner.set_funds_policy(config.funds_policy);
        for item in &config.pool {
            banner.add_item(item.clone())?;
        }
        Ok(banner)
    }

    /// Renders the banner back into its plain config record.
    ///
    /// Attached notifiers are not part of the record.
    #[must_use]
    pub fn to_config(&self) -> BannerConfig {
        BannerConfig {
            id: self.id.clone(),
            pull_cost: self.pull_cost,
            refund_bp: self.refund.basis_points(),
            draw_mode: self.draw_mode,
            funds_policy: self.funds_policy,
            weights: self.weights.to_named(),
            pool: self.pool.clone(),
        }
    }

    /// The banner id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The ordered pool.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &[Item] {
        &self.pool
    }

    /// The per-pull cost.
    #[inline]
    #[must_use]
    pub const fn pull_cost(&self) -> Credits {
        self.pull_cost
    }

    /// The duplicate refund fraction.
    #[inline]
    #[must_use]
    pub const fn refund_fraction(&self) -> RefundFraction {
        self.refund
    }

    /// The weight table.
    #[inline]
    #[must_use]
    pub const fn weights(&self) -> &RarityWeights {
        &self.weights
    }

    /// The active selection rule.
    #[inline]
    #[must_use]
    pub const fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// The active funds policy.
    #[inline]
    #[must_use]
    pub const fn funds_policy(&self) -> FundsPolicy {
        self.funds_policy
    }

    /// Number of attached notifiers.
    #[inline]
    #[must_use]
    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    /// Appends an item to the pool.
    ///
    /// The item's tier is checked against the weight table here, at
    /// registration, so a config gap surfaces immediately instead of on
    /// the unlucky draw that first lands on the item.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::UnknownRarity` if the tier has no weight and
    /// `GachaError::InvalidConfig` if the pool already contains the id.
    pub fn add_item(&mut self, item: Item) -> GachaResult<()> {
        self.weights.weight_for_item(&item)?;
        if self.pool.iter().any(|existing| existing.id == item.id) {
            return Err(GachaError::InvalidConfig(format!(
                "duplicate item id in pool: {}",
                item.id
            )));
        }
        self.pool.push(item);
        Ok(())
    }

    /// Replaces the pull cost.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if `pull_cost` is not positive.
    pub fn set_pull_cost(&mut self, pull_cost: Credits) -> GachaResult<()> {
        if pull_cost.amount() <= 0 {
            return Err(GachaError::InvalidConfig(format!(
                "pull cost must be positive, got {pull_cost}"
            )));
        }
        self.pull_cost = pull_cost;
        Ok(())
    }

    /// Replaces the duplicate refund fraction.
    pub fn set_refund_fraction(&mut self, refund: RefundFraction) {
        self.refund = refund;
    }

    /// Sets or updates the weight for a tier.
    ///
    /// Weights can only be added or raised onto existing tiers, never
    /// removed, so a pool validated at registration stays covered.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if `weight` is zero.
    pub fn set_weight(&mut self, rarity: Rarity, weight: u32) -> GachaResult<()> {
        self.weights.set(rarity, weight)
    }

    /// Switches the selection rule.
    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        self.draw_mode = mode;
    }

    /// Switches the funds policy.
    pub fn set_funds_policy(&mut self, policy: FundsPolicy) {
        self.funds_policy = policy;
    }

    /// Attaches a notifier. Every successful pull publishes to all
    /// attached notifiers in attachment order.
    pub fn attach_notifier(&mut self, notifier: Arc<dyn PullNotifier>) {
        self.notifiers.push(notifier);
    }

    /// Runs one pull transaction for a requester.
    ///
    /// # Errors
    ///
    /// - `GachaError::EmptyPool` if the pool has no items. Nothing is
    ///   read or written, the RNG does not advance.
    /// - `GachaError::InsufficientCredits` under `RequireBalance` when
    ///   the balance cannot cover the cost. The RNG does not advance.
    /// - `GachaError::ArithmeticOverflow` if the debit leaves the
    ///   representable balance range. No mutation has happened yet.
    pub fn pull<R: Requester + ?Sized>(
        &self,
        requester: &mut R,
        rng: &mut impl Rng,
    ) -> GachaResult<PullResult> {
        // Step 1: empty pool gate.
        if self.pool.is_empty() {
            return Err(GachaError::EmptyPool);
        }

        // Step 2: funds gate, before the RNG advances. A rejected pull
        // must not perturb the draw sequence of the next one.
        if self.funds_policy == FundsPolicy::RequireBalance {
            let available = requester.economy().credits();
            if available < self.pull_cost {
                return Err(GachaError::InsufficientCredits {
                    required: self.pull_cost.amount(),
                    available: available.amount(),
                });
            }
        }

        // Step 3: draw. The pool is immutable during the pull, so the
        // drawn item is cloned out before any mutation starts.
        let item = draw_one(&self.pool, &self.weights, self.draw_mode, rng)?.clone();

        // Steps 4 and 5: settle. The duplicate check and the refund are
        // computed before the debit; after the debit lands the deposit
        // cannot overflow because the refund never exceeds the cost.
        let duplicate = requester.economy().owns(&item.id);
        let refund = if duplicate {
            self.refund.refund_of(self.pull_cost)?
        } else {
            Credits::ZERO
        };

        let economy = requester.economy_mut();
        economy.debit(self.pull_cost)?;
        economy.deposit(refund)?;
        if !duplicate {
            economy.grant(item.id.clone());
        }

        // Step 6: snapshot the settled state and publish. Notifiers are
        // infallible by contract; a lossy observer drops events, never
        // the transaction.
        let snapshot = EconomySnapshot::capture(requester.requester_id(), requester.economy());
        let result = PullResult {
            item,
            duplicate,
            refund,
            snapshot,
        };
        let event = PullEvent {
            banner_id: self.id.clone(),
            pull: result.clone(),
        };
        for notifier in &self.notifiers {
            notifier.publish(&event);
        }

        Ok(result)
    }

    /// Simulates draws without touching any requester state.
    ///
    /// Runs the selection alone and histograms the outcomes, which makes
    /// it safe to call against a live banner for tuning.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::EmptyPool` if the pool has no items.
    pub fn simulate(&self, iterations: u32, rng: &mut impl Rng) -> GachaResult<DrawStatistics> {
        let mut stats = DrawStatistics::new();
        for _ in 0..iterations {
            let item = draw_one(&self.pool, &self.weights, self.draw_mode, rng)?;
            stats.record(item);
        }
        Ok(stats)
    }
}

impl fmt::Debug for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Notifiers are opaque trait objects; show the count only.
        f.debug_struct("Banner")
            .field("id", &self.id)
            .field("pool_len", &self.pool.len())
            .field("pull_cost", &self.pull_cost)
            .field("refund", &self.refund)
            .field("draw_mode", &self.draw_mode)
            .field("funds_policy", &self.funds_policy)
            .field("notifiers", &self.notifiers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PlayerAccount;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Mutex;

    /// Notifier that records every event it sees.
    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<PullEvent>>,
    }

    impl RecordingNotifier {
        fn events(&self) -> Vec<PullEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl PullNotifier for RecordingNotifier {
        fn publish(&self, event: &PullEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn two_item_banner() -> Banner {
        let weights = RarityWeights::from_entries([(Rarity::Common, 10), (Rarity::Rare, 5)])
            .expect("weights are valid");
        let mut banner = Banner::new(
            "launch",
            Credits::new(1000),
            RefundFraction::HALF,
            weights,
        )
        .expect("banner config is valid");
        banner
            .add_item(Item::new("a", Rarity::Common))
            .expect("tier is weighted");
        banner
            .add_item(Item::new("b", Rarity::Rare))
            .expect("tier is weighted");
        banner
    }

    #[test]
    fn test_first_pull_debits_and_grants() {
        // Legacy rule on pool [a(10), b(5)]: every roll lands on a.
        let banner = two_item_banner();
        let mut account = PlayerAccount::new(1, Credits::new(5000));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = banner.pull(&mut account, &mut rng).expect("pull succeeds");

        assert_eq!(result.item.id, "a");
        assert!(!result.duplicate);
        assert_eq!(result.refund, Credits::ZERO);
        assert_eq!(result.snapshot.credits, Credits::new(4000));
        assert_eq!(result.snapshot.owned, vec!["a"]);
        assert_eq!(account.economy.credits(), Credits::new(4000));
    }

    #[test]
    fn test_duplicate_pull_refunds_half_rounded() {
        let banner = two_item_banner();
        let mut account = PlayerAccount::new(1, Credits::new(5000));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        banner.pull(&mut account, &mut rng).expect("first pull");
        let result = banner.pull(&mut account, &mut rng).expect("second pull");

        assert_eq!(result.item.id, "a");
        assert!(result.duplicate);
        assert_eq!(result.refund, Credits::new(500));
        // 5000 - 1000 - 1000 + 500
        assert_eq!(result.snapshot.credits, Credits::new(3500));
        assert_eq!(result.snapshot.owned, vec!["a"], "collection unchanged");
        assert_eq!(account.economy.owned_count(), 1);
    }

    #[test]
    fn test_empty_pool_rejected_before_any_mutation() {
        let weights =
            RarityWeights::from_entries([(Rarity::Common, 10)]).expect("weights are valid");
        let banner = Banner::new("empty", Credits::new(1000), RefundFraction::HALF, weights)
            .expect("banner config is valid");
        let mut account = PlayerAccount::new(1, Credits::new(5000));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let err = banner
            .pull(&mut account, &mut rng)
            .expect_err("empty pool must fail");

        assert_eq!(err, GachaError::EmptyPool);
        assert_eq!(account.economy.credits(), Credits::new(5000));
        assert_eq!(account.economy.owned_count(), 0);
    }

    #[test]
    fn test_allow_debt_lets_balance_go_negative() {
        let banner = two_item_banner();
        let mut account = PlayerAccount::new(1, Credits::new(400));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = banner.pull(&mut account, &mut rng).expect("pull succeeds");

        assert_eq!(result.snapshot.credits, Credits::new(-600));
        assert!(account.economy.credits().is_negative());
    }

    #[test]
    fn test_require_balance_gates_before_the_draw() {
        let mut banner = two_item_banner();
        banner.set_funds_policy(FundsPolicy::RequireBalance);
        let mut account = PlayerAccount::new(1, Credits::new(400));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let err = banner
            .pull(&mut account, &mut rng)
            .expect_err("short balance must fail");

        assert_eq!(
            err,
            GachaError::InsufficientCredits {
                required: 1000,
                available: 400,
            }
        );
        assert_eq!(account.economy.credits(), Credits::new(400));
        assert_eq!(account.economy.owned_count(), 0);
    }

    #[test]
    fn test_rejected_pull_leaves_rng_untouched() {
        let mut banner = two_item_banner();
        banner.set_funds_policy(FundsPolicy::RequireBalance);
        banner.set_draw_mode(DrawMode::Proportional);

        let mut gated = ChaCha8Rng::seed_from_u64(7);
        let mut reference = ChaCha8Rng::seed_from_u64(7);

        let mut poor = PlayerAccount::new(1, Credits::new(0));
        banner
            .pull(&mut poor, &mut gated)
            .expect_err("gate rejects");

        // The rejected pull consumed nothing: both streams now produce
        // the same draws.
        let mut rich_a = PlayerAccount::new(2, Credits::new(100_000));
        let mut rich_b = PlayerAccount::new(3, Credits::new(100_000));
        for _ in 0..10 {
            let via_gated = banner.pull(&mut rich_a, &mut gated).expect("pull");
            let via_reference = banner.pull(&mut rich_b, &mut reference).expect("pull");
            assert_eq!(via_gated.item, via_reference.item);
        }
    }

    #[test]
    fn test_add_item_checks_tier_at_registration() {
        let mut banner = two_item_banner();
        let err = banner
            .add_item(Item::new("void_crown", Rarity::UltraRare))
            .expect_err("unmapped tier must fail");

        assert!(matches!(err, GachaError::UnknownRarity { .. }));
        assert_eq!(banner.pool().len(), 2, "pool unchanged");

        // Mapping the tier first makes the same item acceptable.
        banner
            .set_weight(Rarity::UltraRare, 1)
            .expect("weight is positive");
        banner
            .add_item(Item::new("void_crown", Rarity::UltraRare))
            .expect("tier now weighted");
        assert_eq!(banner.pool().len(), 3);
    }

    #[test]
    fn test_add_item_rejects_duplicate_pool_id() {
        let mut banner = two_item_banner();
        let err = banner
            .add_item(Item::new("a", Rarity::Common))
            .expect_err("duplicate id must fail");
        assert!(matches!(err, GachaError::InvalidConfig(_)));
    }

    #[test]
    fn test_non_positive_cost_rejected() {
        let weights =
            RarityWeights::from_entries([(Rarity::Common, 10)]).expect("weights are valid");
        let err = Banner::new("free", Credits::ZERO, RefundFraction::HALF, weights)
            .expect_err("zero cost must fail");
        assert!(matches!(err, GachaError::InvalidConfig(_)));

        let mut banner = two_item_banner();
        let err = banner
            .set_pull_cost(Credits::new(-5))
            .expect_err("negative cost must fail");
        assert!(matches!(err, GachaError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_roundtrip_preserves_the_banner() {
        let mut banner = two_item_banner();
        banner.set_draw_mode(DrawMode::Proportional);
        banner.set_funds_policy(FundsPolicy::RequireBalance);

        let config = banner.to_config();
        let rebuilt = Banner::from_config(&config).expect("config is valid");

        assert_eq!(rebuilt.to_config(), config);
        assert_eq!(rebuilt.pool(), banner.pool());
        assert_eq!(rebuilt.draw_mode(), DrawMode::Proportional);
        assert_eq!(rebuilt.funds_policy(), FundsPolicy::RequireBalance);
        assert_eq!(rebuilt.pull_cost(), Credits::new(1000));
        assert_eq!(rebuilt.refund_fraction(), RefundFraction::HALF);
    }

    #[test]
    fn test_every_notifier_sees_the_same_snapshot() {
        let mut banner = two_item_banner();
        let first = Arc::new(RecordingNotifier::default());
        let second = Arc::new(RecordingNotifier::default());
        banner.attach_notifier(first.clone());
        banner.attach_notifier(second.clone());

        let mut account = PlayerAccount::new(9, Credits::new(5000));
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let result = banner.pull(&mut account, &mut rng).expect("pull succeeds");

        let from_first = first.events();
        let from_second = second.events();
        assert_eq!(from_first.len(), 1);
        assert_eq!(from_first, from_second);
        assert_eq!(from_first[0].banner_id, "launch");
        assert_eq!(from_first[0].pull.snapshot, result.snapshot);
    }

    #[test]
    fn test_failed_pull_publishes_nothing() {
        let weights =
            RarityWeights::from_entries([(Rarity::Common, 10)]).expect("weights are valid");
        let mut banner = Banner::new("empty", Credits::new(1000), RefundFraction::HALF, weights)
            .expect("banner config is valid");
        let recorder = Arc::new(RecordingNotifier::default());
        banner.attach_notifier(recorder.clone());

        let mut account = PlayerAccount::new(1, Credits::new(5000));
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        banner
            .pull(&mut account, &mut rng)
            .expect_err("empty pool must fail");

        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_balance_identity_over_random_runs() {
        let mut banner = two_item_banner();
        banner.set_draw_mode(DrawMode::Proportional);
        banner
            .set_weight(Rarity::UltraRare, 1)
            .expect("weight is positive");
        banner
            .add_item(Item::new("c", Rarity::UltraRare))
            .expect("tier weighted");

        let start = Credits::new(500_000);
        let mut account = PlayerAccount::new(4, start);
        let mut rng = ChaCha8Rng::seed_from_u64(1234);

        let pulls: i64 = 200;
        let mut refunded = Credits::ZERO;
        for _ in 0..pulls {
            let result = banner.pull(&mut account, &mut rng).expect("pull succeeds");
            refunded += result.refund;
            if result.duplicate {
                assert_eq!(result.refund, Credits::new(500));
            } else {
                assert_eq!(result.refund, Credits::ZERO);
            }
        }

        // start - pulls * cost + total refunds
        let spent = Credits::new(banner.pull_cost().amount() * pulls);
        assert_eq!(account.economy.credits(), start - spent + refunded);

        // The collection never exceeds the pool and never duplicates.
        assert!(account.economy.owned_count() <= banner.pool().len());
        for id in account.economy.owned_sorted() {
            assert!(banner.pool().iter().any(|item| item.id == id));
        }
    }

    #[test]
    fn test_simulate_histograms_without_state() {
        let mut banner = two_item_banner();
        banner.set_draw_mode(DrawMode::Proportional);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        let stats = banner.simulate(1000, &mut rng).expect("pool is populated");
        assert_eq!(stats.total_draws, 1000);
        assert_eq!(stats.count_of("a") + stats.count_of("b"), 1000);
    }
}
