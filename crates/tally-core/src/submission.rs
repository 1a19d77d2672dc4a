//! # Checkout Submission
//!
//! The payload handed to the sale-processing backend once the cashier
//! confirms payment. Prices here are advisory: the server re-prices and may
//! reject.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::LineItem;
use crate::money::Money;
use crate::totals::CheckoutTotals;

/// One submitted cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: String,
    pub inventory_id: String,
    pub quantity: u32,
    #[ts(type = "string")]
    pub tier_quantity: Decimal,
    /// `quantity × tier_quantity`, the stock this line consumes.
    #[ts(type = "string")]
    pub inventory_deduction: Decimal,
    /// Effective unit price after any manual discount.
    pub unit_price: Money,
    pub line_total: Money,
}

impl From<&LineItem> for CheckoutLine {
    fn from(item: &LineItem) -> Self {
        CheckoutLine {
            product_id: item.product_id.clone(),
            inventory_id: item.inventory_id.clone(),
            quantity: item.quantity,
            tier_quantity: item.tier_quantity,
            inventory_deduction: item.inventory_deduction(),
            unit_price: item.effective_price(),
            line_total: item.line_total(),
        }
    }
}

/// A validated checkout, ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSubmission {
    #[ts(type = "string")]
    pub session_id: Uuid,
    pub customer_id: Option<String>,
    /// Only set when the campaign actually discounted this sale.
    pub campaign_id: Option<String>,
    #[ts(type = "number")]
    pub points_redeemed: u64,
    pub location_id: Option<String>,
    pub lines: Vec<CheckoutLine>,
    pub totals: CheckoutTotals,
}

impl CheckoutSubmission {
    /// Total stock consumed for one inventory record across all lines.
    pub fn deduction_for(&self, inventory_id: &str) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.inventory_id == inventory_id)
            .map(|l| l.inventory_deduction)
            .sum()
    }
}
