//! # Checkout Totals Pipeline
//!
//! Pure recomputation of the final charge from current inputs.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal        Σ (adjusted_price ?? unit_price) × quantity         │
//! │  2. loyalty         min(points × point_value, subtotal)                 │
//! │  3. campaign        on max(0, subtotal − loyalty), capped               │
//! │  4. after discounts max(0, subtotal − loyalty − campaign)               │
//! │  5. tax             TaxAdapter(after discounts, location)    ── round2  │
//! │  6. total           after discounts + tax                    ── round2  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Rounding happens at steps 5 and 6 only. There is no memory of previous
//! totals: the same inputs always give the same [`CheckoutTotals`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::campaign::Campaign;
use crate::cart::LineItem;
use crate::discount::{DiscountEngine, LoyaltyProgram, LoyaltyRedemption};
use crate::money::Money;
use crate::tax::TaxAdapter;
use crate::types::TaxRate;

/// One row of the receipt / checkout summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub label: String,
    pub amount: Money,
    /// Discount rows are shown as deductions.
    #[serde(default)]
    pub is_discount: bool,
}

impl BreakdownLine {
    fn charge(label: impl Into<String>, amount: Money) -> Self {
        BreakdownLine {
            label: label.into(),
            amount,
            is_discount: false,
        }
    }

    fn discount(label: impl Into<String>, amount: Money) -> Self {
        BreakdownLine {
            label: label.into(),
            amount,
            is_discount: true,
        }
    }
}

/// Everything the pipeline reads.
#[derive(Debug, Clone, Copy)]
pub struct TotalsInput<'a> {
    pub lines: &'a [LineItem],
    pub redemption: &'a LoyaltyRedemption,
    /// Selected campaign; its applicability is re-checked at `now`.
    pub campaign: Option<&'a Campaign>,
    /// Earn-side only; does not affect the charge.
    pub loyalty_program: Option<&'a LoyaltyProgram>,
    pub location_id: Option<&'a str>,
    pub now: NaiveDateTime,
}

/// The pipeline's only output. Derived, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub loyalty_discount: Money,
    pub campaign_discount: Money,
    pub subtotal_after_discounts: Money,
    pub tax_amount: Money,
    pub tax_rate: TaxRate,
    pub tax_name: String,
    pub total: Money,
    /// Points the customer earns on `total` (receipt display).
    #[ts(type = "number")]
    pub points_earned: u64,
    /// Campaign that actually contributed a discount.
    pub applied_campaign_id: Option<String>,
    pub breakdown: Vec<BreakdownLine>,
}

impl CheckoutTotals {
    /// Totals of an empty cart.
    pub fn empty(tax_rate: TaxRate, tax_name: impl Into<String>) -> CheckoutTotals {
        let tax_name = tax_name.into();
        CheckoutTotals {
            subtotal: Money::zero(),
            loyalty_discount: Money::zero(),
            campaign_discount: Money::zero(),
            subtotal_after_discounts: Money::zero(),
            tax_amount: Money::zero(),
            tax_rate,
            tax_name: tax_name.clone(),
            total: Money::zero(),
            points_earned: 0,
            applied_campaign_id: None,
            breakdown: vec![
                BreakdownLine::charge("Subtotal", Money::zero()),
                BreakdownLine::charge(format!("{} ({}%)", tax_name, tax_rate.percentage()), Money::zero()),
                BreakdownLine::charge("Total", Money::zero()),
            ],
        }
    }

    /// Runs the six-step pipeline.
    ///
    /// ## Example
    /// ```text
    /// subtotal 100, 100 points @ 0.01, 10% campaign, 8% tax
    ///   loyalty 1.00 → campaign 9.90 → after 89.10 → tax 7.13 → total 96.23
    /// ```
    pub fn compute(input: &TotalsInput<'_>, tax: &dyn TaxAdapter) -> CheckoutTotals {
        let subtotal: Money = input.lines.iter().map(LineItem::line_total).sum();

        let discounts = DiscountEngine::apply(subtotal, input.redemption, input.campaign, input.now);

        let quote = tax.quote(discounts.subtotal_after_discounts, input.location_id);
        let tax_amount = quote.tax_amount.round2();
        let total = (discounts.subtotal_after_discounts + tax_amount).round2();

        let points_earned = input
            .loyalty_program
            .map(|p| p.points_earned(total))
            .unwrap_or(0);

        let applied_campaign_id = input
            .campaign
            .filter(|_| discounts.campaign_discount.is_positive())
            .map(|c| c.id.clone());

        let mut breakdown = vec![BreakdownLine::charge("Subtotal", subtotal)];
        if discounts.loyalty_discount.is_positive() {
            breakdown.push(BreakdownLine::discount(
                "Loyalty Discount",
                discounts.loyalty_discount,
            ));
        }
        if discounts.campaign_discount.is_positive() {
            breakdown.push(BreakdownLine::discount(
                "Campaign Discount",
                discounts.campaign_discount,
            ));
        }
        breakdown.push(BreakdownLine::charge(
            format!("{} ({}%)", quote.tax_name, quote.tax_rate.percentage()),
            tax_amount,
        ));
        breakdown.push(BreakdownLine::charge("Total", total));

        debug!(
            subtotal = %subtotal,
            loyalty = %discounts.loyalty_discount,
            campaign = %discounts.campaign_discount,
            tax = %tax_amount,
            total = %total,
            "Checkout totals recomputed"
        );

        CheckoutTotals {
            subtotal,
            loyalty_discount: discounts.loyalty_discount,
            campaign_discount: discounts.campaign_discount,
            subtotal_after_discounts: discounts.subtotal_after_discounts,
            tax_amount,
            tax_rate: quote.tax_rate,
            tax_name: quote.tax_name,
            total,
            points_earned,
            applied_campaign_id,
            breakdown,
        }
    }
}
