//! # Domain Types
//!
//! Catalog-side records consumed by the pricing core, plus the small value
//! types shared between modules.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  PricingTier    │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  label / weight │   │  id             │       │
//! │  │  regular_price  │   │  qty (3.5, 28)  │   │  loyalty_points │       │
//! │  │  price          │   │  price          │   └─────────────────┘       │
//! │  │  inventory      │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │    Discount     │   │ LocationTax     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  0.08 = 8%      │   │  Percentage(v)  │   │  location_id    │       │
//! │  └─────────────────┘   │  Fixed(amount)  │   │  sales_tax_rate │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! The catalog owns product truth. Everything here is a point-in-time copy
//! handed to the core; nothing in this crate writes it back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{DEFAULT_POINT_VALUE_CENTS, DEFAULT_TAX_NAME, DEFAULT_TAX_RATE_BPS};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate stored as a fraction of the taxable amount.
///
/// ## Representation
/// `0.08` = 8%. Location records carry the fraction directly
/// (`sales_tax_rate`), so no conversion happens on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(#[ts(type = "string")] Decimal);

impl TaxRate {
    /// Creates a tax rate from a fraction (`0.0825` = 8.25%).
    #[inline]
    pub const fn from_fraction(fraction: Decimal) -> Self {
        TaxRate(fraction)
    }

    /// Creates a tax rate from basis points (825 = 8.25%).
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        TaxRate(Decimal::new(i64::from(bps), 4))
    }

    /// Returns the rate as a fraction.
    #[inline]
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a percentage without trailing zeros
    /// (`0.0800` → `8`, `0.0825` → `8.25`). Display only.
    pub fn percentage(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product record as delivered by the catalog for the active location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: String,

    /// Inventory row this product deducts from. Defaults to the product id.
    #[serde(default)]
    pub inventory_id: Option<String>,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// List price.
    #[serde(default)]
    pub regular_price: Option<Money>,

    /// Current selling price; wins over `regular_price` when present.
    #[serde(default)]
    pub price: Option<Money>,

    /// Stock observed at the active location (units, grams, ...).
    #[serde(default)]
    pub inventory_quantity_at_location: Decimal,

    /// Bulk / weight pricing options.
    #[serde(default)]
    pub pricing_tiers: Vec<PricingTier>,
}

impl Product {
    /// Returns the selling price, falling back to the list price.
    pub fn base_price(&self) -> Option<Money> {
        self.price.or(self.regular_price)
    }

    /// Returns the inventory row id used for deduction.
    pub fn inventory_id(&self) -> &str {
        self.inventory_id.as_deref().unwrap_or(&self.id)
    }

    /// Finds a tier by its discriminator (see [`PricingTier::key`]).
    pub fn find_tier(&self, key: &str) -> Option<&PricingTier> {
        self.pricing_tiers.iter().find(|t| t.key() == key)
    }
}

// =============================================================================
// Pricing Tier
// =============================================================================

/// A bulk or weight pricing option, e.g. "Eighth" = 3.5g for $35.
///
/// ## Tier vs Cart Quantity
/// ```text
/// Tier "Eighth": qty = 3.5 (grams), price = $35
/// Cart line quantity = 2
///      │
///      ▼
/// Charged: 2 × $35 = $70
/// Deducted from inventory: 2 × 3.5 = 7 grams
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    /// Display label ("Eighth", "Ounce").
    #[serde(default)]
    pub label: Option<String>,

    /// Weight label ("3.5g"), used when no label is set.
    #[serde(default)]
    pub weight: Option<String>,

    /// Inventory consumed per cart unit. A missing value reads as zero and
    /// is rejected at checkout.
    #[serde(default)]
    pub qty: Decimal,

    /// Price for one unit of this tier.
    pub price: Money,
}

impl PricingTier {
    /// Stable discriminator for this tier within its product.
    ///
    /// Label first, then weight, then the tier quantity itself.
    pub fn key(&self) -> String {
        self.label
            .clone()
            .or_else(|| self.weight.clone())
            .unwrap_or_else(|| self.qty.normalize().to_string())
    }

    /// Label shown on the cart line.
    pub fn display_label(&self) -> Option<String> {
        self.label.clone().or_else(|| self.weight.clone())
    }
}

// =============================================================================
// Customer
// =============================================================================

/// The customer attached to the checkout, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Redeemable point balance.
    #[serde(default)]
    pub loyalty_points: u64,
}

// =============================================================================
// Location Tax Configuration
// =============================================================================

/// Tax settings for one store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationTaxConfig {
    pub location_id: String,
    pub sales_tax_rate: TaxRate,
    #[serde(default = "default_tax_name")]
    pub tax_name: String,
}

fn default_tax_name() -> String {
    DEFAULT_TAX_NAME.to_string()
}

// =============================================================================
// Manual Discount
// =============================================================================

/// A cashier-applied discount on a single line.
///
/// ## Serialization
/// ```json
/// { "type": "percentage", "value": "10" }
/// { "type": "fixed", "value": "15.00" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percent off the unit price, 0–100.
    Percentage(#[ts(type = "string")] Decimal),
    /// Absolute amount off the unit price.
    Fixed(Money),
}

impl Discount {
    /// Applies the discount to a unit price, clamped to `[0, unit_price]`.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::{Discount, Money};
    ///
    /// let price = Money::from_cents(10000);
    /// assert_eq!(Discount::Percentage(Decimal::TEN).apply(price), Money::from_cents(9000));
    /// assert_eq!(Discount::Fixed(Money::from_cents(1500)).apply(price), Money::from_cents(8500));
    /// assert_eq!(Discount::Fixed(Money::from_cents(20000)).apply(price), Money::zero());
    /// ```
    pub fn apply(&self, unit_price: Money) -> Money {
        let off = match self {
            Discount::Percentage(pct) => unit_price.percent(*pct),
            Discount::Fixed(amount) => *amount,
        };
        (unit_price - off).clamp_between(Money::zero(), unit_price)
    }
}

// =============================================================================
// Pricing Defaults
// =============================================================================

/// Fallback values used when upstream configuration is missing.
///
/// ## Graceful Degradation
/// Checkout is never blocked by a missing tax location or loyalty program;
/// these values stand in instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingDefaults {
    /// Rate used when no location tax configuration applies.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: TaxRate,

    /// Name shown next to the fallback rate.
    #[serde(default = "default_tax_name")]
    pub tax_name: String,

    /// Currency value of one loyalty point when no program is loaded.
    #[serde(default = "default_point_value")]
    pub point_value: Money,
}

fn default_tax_rate() -> TaxRate {
    TaxRate::from_bps(DEFAULT_TAX_RATE_BPS)
}

fn default_point_value() -> Money {
    Money::from_cents(DEFAULT_POINT_VALUE_CENTS)
}

impl Default for PricingDefaults {
    fn default() -> Self {
        PricingDefaults {
            tax_rate: default_tax_rate(),
            tax_name: default_tax_name(),
            point_value: default_point_value(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
