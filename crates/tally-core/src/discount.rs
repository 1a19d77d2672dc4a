//! # Discount Engine
//!
//! Loyalty redemption and campaign discounts, applied in a fixed order.
//!
//! ## Order Matters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal $100.00                                                       │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  1. loyalty  = min(points × point_value, subtotal)      100 pts → $1.00 │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  remaining   = max(0, subtotal − loyalty)                        $99.00 │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  2. campaign = min(10% of remaining, remaining)                   $9.90 │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  after discounts                                                 $89.10 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Points are the customer's earned credit and are redeemed against full
//! price; the campaign stacks on the reduced amount. Swapping the steps
//! changes the result and is not allowed.
//!
//! Nothing in this module rounds.

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::campaign::{Campaign, CampaignDiscountType};
use crate::money::Money;

// =============================================================================
// Loyalty Program
// =============================================================================

/// Loyalty program configuration for the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyProgram {
    /// Currency value of one redeemed point.
    pub point_value: Money,

    /// Points earned per currency unit of the final total.
    #[serde(default)]
    pub points_per_dollar: Decimal,
}

impl LoyaltyProgram {
    /// Points earned on a final total: `floor(total × points_per_dollar)`.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::discount::LoyaltyProgram;
    /// use tally_core::Money;
    ///
    /// let program = LoyaltyProgram {
    ///     point_value: Money::from_cents(1),
    ///     points_per_dollar: Decimal::ONE,
    /// };
    /// assert_eq!(program.points_earned(Money::from_cents(9623)), 96);
    /// ```
    pub fn points_earned(&self, total: Money) -> u64 {
        match total.amount().checked_mul(self.points_per_dollar) {
            Some(points) if points > Decimal::ZERO => points.floor().to_u64().unwrap_or(u64::MAX),
            Some(_) => 0,
            None => u64::MAX,
        }
    }
}

/// Largest point redemption that is still useful: the customer's balance,
/// capped at the points needed to cover `subtotal`.
pub fn max_redeemable_points(balance: u64, subtotal: Money, point_value: Money) -> u64 {
    if !point_value.is_positive() || !subtotal.is_positive() {
        return 0;
    }
    // Overflow means more points than any balance could hold are needed.
    let needed = subtotal
        .amount()
        .checked_div(point_value.amount())
        .and_then(|points| points.ceil().to_u64())
        .unwrap_or(u64::MAX);
    balance.min(needed)
}

// =============================================================================
// Loyalty Redemption
// =============================================================================

/// Points the customer chose to redeem in this checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyRedemption {
    pub points_to_redeem: u64,
    pub point_value: Money,
}

impl LoyaltyRedemption {
    pub fn new(points_to_redeem: u64, point_value: Money) -> Self {
        LoyaltyRedemption {
            points_to_redeem,
            point_value,
        }
    }

    /// No points redeemed.
    pub fn none(point_value: Money) -> Self {
        LoyaltyRedemption::new(0, point_value)
    }

    /// Face value of the redeemed points, before capping. Saturates
    /// instead of overflowing.
    pub fn value(&self) -> Money {
        let points = Decimal::from(self.points_to_redeem);
        match self.point_value.amount().checked_mul(points) {
            Some(value) => Money::new(value),
            None if self.point_value.is_negative() => Money::new(Decimal::MIN),
            None => Money::new(Decimal::MAX),
        }
    }
}

// =============================================================================
// Discount Engine
// =============================================================================

/// Cart-level discounts for one totals computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscountOutcome {
    pub loyalty_discount: Money,
    pub campaign_discount: Money,
    /// `max(0, subtotal − loyalty − campaign)`.
    pub subtotal_after_discounts: Money,
}

/// Stateless discount calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountEngine;

impl DiscountEngine {
    /// `min(points × point_value, subtotal)`, never negative.
    pub fn loyalty_discount(subtotal: Money, redemption: &LoyaltyRedemption) -> Money {
        redemption
            .value()
            .clamp_between(Money::zero(), subtotal.non_negative())
    }

    /// Campaign discount against the post-loyalty `remaining` amount,
    /// capped at `remaining`. The caller decides applicability.
    pub fn campaign_discount(remaining: Money, campaign: &Campaign) -> Money {
        let remaining = remaining.non_negative();
        let raw = match campaign.discount_type {
            CampaignDiscountType::Percentage => remaining.percent(campaign.discount_value),
            CampaignDiscountType::Fixed => Money::new(campaign.discount_value),
        };
        raw.clamp_between(Money::zero(), remaining)
    }

    /// Applies loyalty then campaign.
    ///
    /// A campaign that is not applicable at `now` contributes zero.
    pub fn apply(
        subtotal: Money,
        redemption: &LoyaltyRedemption,
        campaign: Option<&Campaign>,
        now: NaiveDateTime,
    ) -> DiscountOutcome {
        let loyalty_discount = Self::loyalty_discount(subtotal, redemption);
        let remaining = (subtotal - loyalty_discount).non_negative();

        let campaign_discount = match campaign {
            Some(c) => {
                let status = c.status(now);
                if status.is_applicable() {
                    Self::campaign_discount(remaining, c)
                } else {
                    debug!(campaign_id = %c.id, %status, "Selected campaign not applicable, skipping");
                    Money::zero()
                }
            }
            None => Money::zero(),
        };

        DiscountOutcome {
            loyalty_discount,
            campaign_discount,
            subtotal_after_discounts: (subtotal - loyalty_discount - campaign_discount)
                .non_negative(),
        }
    }
}
