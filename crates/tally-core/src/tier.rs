//! # Pricing Tier Resolver
//!
//! Derives the unit price and inventory multiplier for a cart line.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  resolve(product, None)                                                 │
//! │    unit_price    = product.price ?? product.regular_price ?? 0          │
//! │    tier_quantity = 1                                                    │
//! │                                                                         │
//! │  resolve(product, Some(tier))                                           │
//! │    unit_price    = tier.price                                           │
//! │    tier_quantity = tier.qty            (3.5, 28, ...)                   │
//! │    tier_label    = tier.label ?? tier.weight                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here fails. A missing price resolves to zero and a missing tier
//! quantity to zero; both come back as [`DataQualityWarning`]s for the
//! caller to surface.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::money::Money;
use crate::types::{PricingTier, Product};

/// Outcome of resolving a product (and optional tier) to line pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrice {
    pub unit_price: Money,
    pub tier_quantity: Decimal,
    pub tier_label: Option<String>,
    /// Tier discriminator, `None` when no tier was selected.
    pub tier_key: Option<String>,
    pub warning: Option<DataQualityWarning>,
}

/// Catalog data problems noticed while pricing. Never fatal here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Neither `price` nor `regular_price` was set.
    MissingPrice { product_id: String },
    /// Tier has a missing or non-positive `qty`.
    InvalidTierQuantity { product_id: String, tier: String },
}

/// Resolves the unit price and tier quantity for a product.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::tier::resolve;
/// use tally_core::{Money, PricingTier, Product};
///
/// let product = Product {
///     id: "p-1".into(),
///     inventory_id: None,
///     name: "Blue Dream".into(),
///     regular_price: Some(Money::from_cents(1200)),
///     price: None,
///     inventory_quantity_at_location: Decimal::from(28),
///     pricing_tiers: vec![PricingTier {
///         label: Some("Eighth".into()),
///         weight: None,
///         qty: Decimal::new(35, 1),
///         price: Money::from_cents(3500),
///     }],
/// };
///
/// let unit = resolve(&product, None);
/// assert_eq!(unit.tier_quantity, Decimal::ONE);
///
/// let eighth = resolve(&product, product.pricing_tiers.first());
/// assert_eq!(eighth.tier_quantity, Decimal::new(35, 1));
/// assert_eq!(eighth.unit_price, Money::from_cents(3500));
/// ```
pub fn resolve(product: &Product, tier: Option<&PricingTier>) -> ResolvedPrice {
    match tier {
        None => {
            let (unit_price, warning) = match product.base_price() {
                Some(price) => (price, None),
                None => {
                    warn!(product_id = %product.id, "Product has no price, pricing at zero");
                    (
                        Money::zero(),
                        Some(DataQualityWarning::MissingPrice {
                            product_id: product.id.clone(),
                        }),
                    )
                }
            };
            ResolvedPrice {
                unit_price,
                tier_quantity: Decimal::ONE,
                tier_label: None,
                tier_key: None,
                warning,
            }
        }
        Some(tier) => {
            let key = tier.key();
            let warning = if tier.qty <= Decimal::ZERO {
                warn!(product_id = %product.id, tier = %key, qty = %tier.qty, "Tier has no usable quantity");
                Some(DataQualityWarning::InvalidTierQuantity {
                    product_id: product.id.clone(),
                    tier: key.clone(),
                })
            } else {
                None
            };
            ResolvedPrice {
                unit_price: tier.price,
                tier_quantity: tier.qty,
                tier_label: tier.display_label(),
                tier_key: Some(key),
                warning,
            }
        }
    }
}

/// Builds the cart line id for a product and optional tier key.
///
/// Ids are `product` or `product_tier`. Backslashes and underscores inside
/// either part are backslash-escaped, so no two `(product, tier)` pairs
/// ever share an id.
pub fn line_id(product_id: &str, tier_key: Option<&str>) -> String {
    match tier_key {
        Some(key) => format!("{}_{}", escape_id_part(product_id), escape_id_part(key)),
        None => escape_id_part(product_id),
    }
}

fn escape_id_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        if c == '\\' || c == '_' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
