//! # Credit Arithmetic
//!
//! **CRITICAL: NO FLOATING POINT IN THE MONEY PATH**
//!
//! All balances, costs and refunds are whole credits stored as signed
//! integers. The refund fraction is expressed in basis points and applied
//! with a single integer rounding rule.
//!
//! ## Why Integer Credits?
//!
//! - Deterministic: same pull sequence = same balances on all hardware
//! - No drift: repeated refunds never accumulate sub-credit dust
//! - Auditable: every balance is reproducible from the pull log
//!
//! ## Signedness
//!
//! Balances are signed because the default funds policy debits
//! unconditionally. A requester who pulls without cover goes negative and
//! the ledger must represent that honestly.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::{GachaError, GachaResult};

/// Basis points in one whole (10000 = 100%).
const BP_SCALE: i128 = 10_000;

/// Half of one whole in basis points, the round-half-up bias.
const BP_HALF: i128 = 5_000;

/// A whole-credit amount. May be negative for balances in debt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Credits(i64);

impl Credits {
    /// Zero credits.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(i64::MAX);

    /// Minimum representable amount (deepest possible debt).
    pub const MIN: Self = Self(i64::MIN);

    /// Creates a credit amount.
    #[inline]
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the raw amount.
    #[inline]
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Returns true if this amount is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this amount is below zero.
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Safe addition with error on overflow.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::ArithmeticOverflow` if the addition would overflow.
    #[inline]
    pub fn safe_add(self, rhs: Self) -> GachaResult<Self> {
        self.checked_add(rhs).ok_or(GachaError::ArithmeticOverflow)
    }

    /// Safe subtraction with error on overflow.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::ArithmeticOverflow` if the subtraction would overflow.
    #[inline]
    pub fn safe_sub(self, rhs: Self) -> GachaResult<Self> {
        self.checked_sub(rhs).ok_or(GachaError::ArithmeticOverflow)
    }
}

impl Add for Credits {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Credits {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Credits {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Credits {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fraction of the pull cost returned for a duplicate, in basis points.
///
/// The fraction is fixed at banner construction and bounded to
/// `0..=10000`. Refunds are computed as
/// `(cost * bp + 5000) / 10000` in integer arithmetic, which rounds
/// half-credit results up. Every deployment reproduces identical refunds
/// from the same config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefundFraction(u32);

impl RefundFraction {
    /// No refund for duplicates.
    pub const NONE: Self = Self(0);

    /// Half of the pull cost back.
    pub const HALF: Self = Self(5_000);

    /// The full pull cost back.
    pub const FULL: Self = Self(10_000);

    /// Creates a refund fraction from basis points.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if `bp` exceeds 10000; a banner
    /// must never refund more than the pull cost.
    pub fn from_bp(bp: u32) -> GachaResult<Self> {
        if bp > 10_000 {
            return Err(GachaError::InvalidConfig(format!(
                "refund fraction {bp} bp exceeds 10000 (100%)"
            )));
        }
        Ok(Self(bp))
    }

    /// Returns the fraction in basis points.
    #[inline]
    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// Computes the duplicate refund for a pull cost, rounding half up.
    ///
    /// The cost is positive by banner construction; the intermediate
    /// product is taken in 128 bits so the scale multiply cannot wrap.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::ArithmeticOverflow` if the rounded refund does
    /// not fit a credit amount.
    pub fn refund_of(self, cost: Credits) -> GachaResult<Credits> {
        let scaled = i128::from(cost.amount()) * i128::from(self.0) + BP_HALF;
        let refund = scaled / BP_SCALE;
        i64::try_from(refund)
            .map(Credits::new)
            .map_err(|_| GachaError::ArithmeticOverflow)
    }
}

impl Default for RefundFraction {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for RefundFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_refund_of_even_cost() {
        let refund = RefundFraction::HALF
            .refund_of(Credits::new(1000))
            .expect("refund should compute");
        assert_eq!(refund, Credits::new(500));
    }

    #[test]
    fn test_half_credit_rounds_up() {
        // 999 * 0.5 = 499.5, rounds to 500
        let refund = RefundFraction::HALF
            .refund_of(Credits::new(999))
            .expect("refund should compute");
        assert_eq!(refund, Credits::new(500));

        // 1 * 0.5 = 0.5, rounds to 1
        let refund = RefundFraction::HALF
            .refund_of(Credits::new(1))
            .expect("refund should compute");
        assert_eq!(refund, Credits::new(1));
    }

    #[test]
    fn test_below_half_credit_rounds_down() {
        // 1 * 0.25 = 0.25, rounds to 0
        let quarter = RefundFraction::from_bp(2_500).expect("valid fraction");
        let refund = quarter
            .refund_of(Credits::new(1))
            .expect("refund should compute");
        assert_eq!(refund, Credits::ZERO);
    }

    #[test]
    fn test_full_and_zero_fractions() {
        let cost = Credits::new(777);
        assert_eq!(
            RefundFraction::FULL.refund_of(cost).expect("full refund"),
            cost
        );
        assert_eq!(
            RefundFraction::NONE.refund_of(cost).expect("zero refund"),
            Credits::ZERO
        );
    }

    #[test]
    fn test_fraction_above_full_rejected() {
        let err = RefundFraction::from_bp(10_001).expect_err("must reject");
        assert!(matches!(err, GachaError::InvalidConfig(_)));
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        let balance = Credits::new(100)
            .checked_sub(Credits::new(250))
            .expect("no overflow");
        assert_eq!(balance, Credits::new(-150));
        assert!(balance.is_negative());
    }

    #[test]
    fn test_safe_ops_surface_overflow() {
        assert_eq!(
            Credits::MAX.safe_add(Credits::new(1)),
            Err(GachaError::ArithmeticOverflow)
        );
        assert_eq!(
            Credits::MIN.safe_sub(Credits::new(1)),
            Err(GachaError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_serde_transparent() {
        let credits: Credits = toml::from_str::<std::collections::HashMap<String, Credits>>(
            "balance = -150\n",
        )
        .expect("credits should deserialize")["balance"];
        assert_eq!(credits, Credits::new(-150));
    }
}
