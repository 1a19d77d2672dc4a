//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Why not integer cents?                                                 │
//! │    10% campaign on $9.99 remaining = $0.999                             │
//! │    Cents would force a rounding step here, and the pipeline only        │
//! │    rounds at the tax and total steps.                                   │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    0.1 + 0.2 = 0.3 exactly                                              │
//! │    Intermediate discounts keep full precision                           │
//! │    round2() is explicit and happens exactly twice per checkout          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let doubled = price * 2u32;          // $21.98
//! let total = price + Money::from_cents(500);
//! assert_eq!(total, Money::from_cents(1599));
//! assert_eq!(doubled.to_string(), "$21.98");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::TaxRate;

/// Number of decimal places every charged amount is rounded to.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in major currency units (dollars for USD).
///
/// ## Design Decisions
/// - **Decimal (signed)**: exact base-10, negative values allowed for refunds
/// - **Single field tuple struct**: serialises as the bare decimal string
/// - **No implicit rounding**: arithmetic keeps full precision, callers
///   decide when to [`Money::round2`]
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► LineItem.unit_price ──► LineItem.adjusted_price      │
/// │                                                   │                     │
/// │                                                   ▼                     │
/// │  subtotal ──► loyalty ──► campaign ──► tax (round2) ──► total (round2) │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Creates a Money value from a decimal amount in major units.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_DECIMAL_PLACES))
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to two decimal places, half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let tax: Money = "7.128".parse().unwrap();
    /// assert_eq!(tax.round2(), Money::from_cents(713));
    ///
    /// let half: Money = "0.125".parse().unwrap();
    /// assert_eq!(half.round2(), Money::from_cents(13));
    /// ```
    pub fn round2(&self) -> Money {
        let mut rounded = self
            .0
            .round_dp_with_strategy(CURRENCY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        // Always two places so "22" serializes as "22.00".
        rounded.rescale(CURRENCY_DECIMAL_PLACES);
        Money(rounded)
    }

    /// Floors negative values at zero.
    #[inline]
    pub fn non_negative(self) -> Money {
        self.max(Money::zero())
    }

    /// Clamps the value into `[low, high]`.
    ///
    /// `high` wins when `low > high`, so a cap is never exceeded.
    pub fn clamp_between(self, low: Money, high: Money) -> Money {
        self.max(low).min(high)
    }

    /// Multiplies money by a cart quantity.
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Money {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns `pct` percent of this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::money::Money;
    ///
    /// let remaining = Money::from_cents(9900);
    /// let discount = remaining.percent(Decimal::TEN);
    /// assert_eq!(discount, Money::from_cents(990));
    /// ```
    pub fn percent(&self, pct: Decimal) -> Money {
        Money(self.0 * pct / Decimal::ONE_HUNDRED)
    }

    /// Calculates tax on this amount, rounded to cents.
    ///
    /// ## User Workflow
    /// ```text
    /// Subtotal after discounts: $89.10
    ///      │
    ///      ▼
    /// calculate_tax(8%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// 7.128 → Tax: $7.13
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(self.0 * rate.fraction()).round2()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money rounded to cents, e.g. `$10.99` or `-$5.50`.
///
/// ## Note
/// This is for logs and receipts in tests. The UI formats its own amounts
/// to handle localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.round2().0.abs();
        write!(f, "{}${:.2}", sign, abs)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a cart quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Multiplication by an exact factor (point counts, rates).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.amount(), Decimal::new(1099, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
        assert_eq!(format!("{}", money("0.999")), "$1.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a + b, Money::from_cents(1500));
        assert_eq!(a - b, Money::from_cents(500));
        assert_eq!(a * 3u32, Money::from_cents(3000));
        assert_eq!(a * Decimal::new(5, 1), Money::from_cents(500));
    }

    #[test]
    fn test_decimal_is_exact() {
        assert_eq!(money("0.1") + money("0.2"), money("0.3"));
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(money("7.128").round2(), Money::from_cents(713));
        assert_eq!(money("0.125").round2(), Money::from_cents(13));
        assert_eq!(money("0.124").round2(), Money::from_cents(12));
        assert_eq!(money("-0.125").round2(), Money::from_cents(-13));
    }

    #[test]
    fn test_percent_keeps_precision() {
        let discount = money("9.99").percent(Decimal::TEN);
        assert_eq!(discount, money("0.999"));
    }

    #[test]
    fn test_tax_calculation_rounds() {
        let amount = money("89.1");
        let tax = amount.calculate_tax(TaxRate::from_fraction(Decimal::new(8, 2)));
        assert_eq!(tax, Money::from_cents(713));
    }

    #[test]
    fn test_clamps() {
        assert_eq!(Money::from_cents(-100).non_negative(), Money::zero());
        assert_eq!(
            Money::from_cents(1500).clamp_between(Money::zero(), Money::from_cents(1000)),
            Money::from_cents(1000)
        );
        assert_eq!(
            Money::from_cents(-1).clamp_between(Money::zero(), Money::from_cents(1000)),
            Money::zero()
        );
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_cents(100), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(350));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Money::from_cents(1099)).unwrap();
        assert_eq!(json, "\"10.99\"");
        let back: Money = serde_json::from_str("10.99").unwrap();
        assert_eq!(back, Money::from_cents(1099));
    }
}
