//! # Cart Ledger
//!
//! Owns the cart lines and every rule about how they change.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Ledger Operations                               │
//! │                                                                         │
//! │  Cashier Action           Ledger Call                 Line Change       │
//! │  ──────────────           ───────────                 ───────────       │
//! │                                                                         │
//! │  Scan / tap product ─────► add_item() ──────────────► push or qty += 1 │
//! │                                                                         │
//! │  +/- buttons ────────────► update_quantity() ───────► clamp to [0,cap] │
//! │                                                                         │
//! │  Discount modal ─────────► apply_manual_discount() ─► adjusted_price   │
//! │                                                                         │
//! │  Clear ──────────────────► clear_cart() ────────────► items.clear()    │
//! │                                                                         │
//! │  Realtime stock push ────► refresh_from_catalog() ──► prices / caps    │
//! │                                                                         │
//! │  NOTE: over-inventory adds and increments are silent no-ops / clamps.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Inventory Deduction
//! The one number the backend deducts is `quantity × tier_quantity`, and it
//! is only ever computed by [`LineItem::inventory_deduction`].

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tier::{line_id, resolve, DataQualityWarning};
use crate::types::{Discount, PricingTier, Product};
use crate::validation::validate_discount;

// =============================================================================
// Line Item
// =============================================================================

/// A line in the cart.
///
/// ## Design Notes
/// - `id`: product id plus tier discriminator, so two tiers of one product
///   are two lines
/// - Catalog fields (`name`, `unit_price`, `available_inventory`) are a
///   point-in-time copy; the catalog stays the owner of truth
/// - `adjusted_price` is derived from `manual_discount` and `unit_price`,
///   never set on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// `tier::line_id(product_id, tier_key)`; unique per `(product, tier)`.
    pub id: String,

    pub product_id: String,

    pub inventory_id: String,

    /// Product name at time of adding.
    pub name: String,

    /// Price for one unit of `tier_quantity`.
    pub unit_price: Money,

    /// How many tier units are in the cart.
    pub quantity: u32,

    /// Inventory consumed per unit of `quantity`. Missing or null on the
    /// wire reads as zero, which checkout validation rejects.
    #[ts(type = "string")]
    #[serde(default, deserialize_with = "tier_quantity_or_zero")]
    pub tier_quantity: Decimal,

    /// Display only.
    #[serde(default)]
    pub tier_label: Option<String>,

    /// Tier discriminator used to re-find the tier after a catalog refresh.
    #[serde(default)]
    pub tier_key: Option<String>,

    #[serde(default)]
    pub manual_discount: Option<Discount>,

    /// `clamp(unit_price - discount, 0, unit_price)` while a discount is set.
    #[serde(default)]
    pub adjusted_price: Option<Money>,

    /// Stock observed when the line was last touched. Advisory only.
    #[ts(type = "string")]
    #[serde(default)]
    pub available_inventory: Decimal,
}

fn tier_quantity_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Decimal>::deserialize(deserializer)?.unwrap_or(Decimal::ZERO))
}

impl LineItem {
    /// Price charged per unit: the adjusted price when discounted.
    pub fn effective_price(&self) -> Money {
        self.adjusted_price.unwrap_or(self.unit_price)
    }

    /// Calculates the line total (effective price × quantity).
    pub fn line_total(&self) -> Money {
        self.effective_price().multiply_quantity(self.quantity)
    }

    /// Inventory amount the backend deducts for this line.
    ///
    /// ## Example
    /// ```text
    /// quantity 2 × tier_quantity 3.5 = 7 (grams)
    /// ```
    pub fn inventory_deduction(&self) -> Decimal {
        Decimal::from(self.quantity) * self.tier_quantity
    }

    /// Largest quantity the inventory snapshot allows when no other line
    /// draws on the same stock.
    ///
    /// A line with a non-positive tier quantity cannot grow.
    pub fn max_quantity(&self) -> u32 {
        self.quantity_cap(Decimal::ZERO)
    }

    /// Largest quantity left once `committed_elsewhere` of the same stock
    /// is held by other lines.
    fn quantity_cap(&self, committed_elsewhere: Decimal) -> u32 {
        if self.tier_quantity <= Decimal::ZERO {
            return self.quantity;
        }
        let remaining = self.available_inventory - committed_elsewhere;
        if remaining <= Decimal::ZERO {
            return 0;
        }
        (remaining / self.tier_quantity)
            .floor()
            .to_u32()
            .unwrap_or(u32::MAX)
    }

    fn is_line_for(&self, product_id: &str, tier_key: Option<&str>) -> bool {
        self.product_id == product_id && self.tier_key.as_deref() == tier_key
    }

    fn reprice(&mut self) {
        self.adjusted_price = self.manual_discount.map(|d| d.apply(self.unit_price));
    }
}

fn within_inventory(quantity: u32, tier_quantity: Decimal, available: Decimal) -> bool {
    Decimal::from(quantity) * tier_quantity <= available
}

// =============================================================================
// Add Outcome
// =============================================================================

/// What an [`CartLedger::add_item`] call did.
///
/// None of these are errors; callers that want to show "out of stock" can
/// inspect the outcome, the ledger itself stays quiet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Added { line_id: String },
    /// An existing line was incremented.
    Merged { line_id: String, quantity: u32 },
    /// One more unit would exceed the inventory snapshot; cart unchanged.
    AtInventoryLimit { line_id: String },
    /// Nothing in stock at this location; no line created.
    OutOfStock { product_id: String },
}

impl AddOutcome {
    /// True when the cart changed.
    pub fn changed(&self) -> bool {
        matches!(self, AddOutcome::Added { .. } | AddOutcome::Merged { .. })
    }
}

// =============================================================================
// Cart Ledger
// =============================================================================

/// The cart.
///
/// ## Invariants
/// - Lines are unique by `(product_id, tier_key)` and so by `id` (adding
///   the same product + tier merges)
/// - `quantity > 0` for every line (reaching 0 removes it)
/// - Mutations never push the summed `quantity × tier_quantity` of all
///   lines sharing an `inventory_id` above the inventory snapshot; a later
///   snapshot refresh may make it stale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLedger {
    items: Vec<LineItem>,

    /// Line currently open in the discount dialog.
    #[serde(default)]
    discounting_line: Option<String>,

    #[serde(default)]
    warnings: Vec<DataQualityWarning>,
}

impl CartLedger {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        CartLedger::default()
    }

    /// Adds one unit of a product (optionally a tier) to the cart.
    ///
    /// ## Behavior
    /// - Nothing in stock: no line is created
    /// - Line exists: quantity + 1, unless that exceeds inventory
    /// - Line missing: new line with quantity 1, unless one tier unit
    ///   already exceeds inventory
    ///
    /// Other tiers of the same stock already in the cart count against the
    /// inventory.
    ///
    /// ## User Workflow
    /// ```text
    /// Inventory = 2
    /// add_item() → Added          quantity 1
    /// add_item() → Merged         quantity 2
    /// add_item() → AtInventoryLimit   quantity stays 2
    /// ```
    pub fn add_item(&mut self, product: &Product, tier: Option<&PricingTier>) -> AddOutcome {
        let resolved = resolve(product, tier);
        if let Some(warning) = resolved.warning.clone() {
            self.record_warning(warning);
        }

        let id = line_id(&product.id, resolved.tier_key.as_deref());
        let inventory_id = product.inventory_id();
        let available = product.inventory_quantity_at_location;

        if available <= Decimal::ZERO {
            debug!(product_id = %product.id, "add_item: out of stock, ignoring");
            return AddOutcome::OutOfStock {
                product_id: product.id.clone(),
            };
        }

        let existing = self
            .items
            .iter()
            .position(|i| i.is_line_for(&product.id, resolved.tier_key.as_deref()));
        let except_line = existing.map(|index| self.items[index].id.as_str());
        let committed = self.committed_elsewhere(inventory_id, except_line);
        let remaining = available - committed;

        if let Some(index) = existing {
            let item = &mut self.items[index];
            let proposed = item.quantity.saturating_add(1);
            if !within_inventory(proposed, item.tier_quantity, remaining) {
                debug!(line_id = %id, proposed, %available, %committed, "add_item: at inventory limit, ignoring");
                return AddOutcome::AtInventoryLimit { line_id: id };
            }
            item.quantity = proposed;
            item.available_inventory = available;
            debug!(line_id = %id, quantity = proposed, "add_item: merged");
            return AddOutcome::Merged {
                line_id: id,
                quantity: proposed,
            };
        }

        if !within_inventory(1, resolved.tier_quantity, remaining) {
            debug!(line_id = %id, %available, %committed, "add_item: one tier unit exceeds stock, ignoring");
            return AddOutcome::AtInventoryLimit { line_id: id };
        }

        self.items.push(LineItem {
            id: id.clone(),
            product_id: product.id.clone(),
            inventory_id: inventory_id.to_string(),
            name: product.name.clone(),
            unit_price: resolved.unit_price,
            quantity: 1,
            tier_quantity: resolved.tier_quantity,
            tier_label: resolved.tier_label,
            tier_key: resolved.tier_key,
            manual_discount: None,
            adjusted_price: None,
            available_inventory: available,
        });
        debug!(line_id = %id, "add_item: added");
        AddOutcome::Added { line_id: id }
    }

    /// Changes a line's quantity by `delta`.
    ///
    /// ## Behavior
    /// - Result is clamped to `[0, cap]`, where the cap is what the line's
    ///   inventory snapshot leaves after other lines of the same stock
    /// - An increment never shrinks a line that a stale snapshot left above
    ///   its cap
    /// - Reaching 0 removes the line
    ///
    /// ## Returns
    /// The new quantity (0 when the line was removed).
    pub fn update_quantity(&mut self, line_id: &str, delta: i64) -> CoreResult<u32> {
        let item = self.line(line_id)?;
        let current = item.quantity;
        let requested = i64::from(current).saturating_add(delta).max(0);
        let requested = u32::try_from(requested).unwrap_or(u32::MAX);
        self.apply_quantity(line_id, requested)
    }

    /// Sets a line's quantity outright, with the same clamping as
    /// [`CartLedger::update_quantity`].
    pub fn set_quantity(&mut self, line_id: &str, quantity: u32) -> CoreResult<u32> {
        self.line(line_id)?;
        self.apply_quantity(line_id, quantity)
    }

    fn apply_quantity(&mut self, line_id: &str, requested: u32) -> CoreResult<u32> {
        let inventory_id = self.line(line_id)?.inventory_id.clone();
        let committed = self.committed_elsewhere(&inventory_id, Some(line_id));
        let item = self.line_mut(line_id)?;

        let current = item.quantity;
        let new_qty = if requested > current {
            let cap = item.quantity_cap(committed).max(current);
            if requested > cap {
                debug!(line_id, requested, cap, "Quantity clamped to inventory");
            }
            requested.min(cap)
        } else {
            requested
        };

        if new_qty == 0 {
            self.remove_item(line_id)?;
            return Ok(0);
        }

        item.quantity = new_qty;
        Ok(new_qty)
    }

    /// Removes a line by id.
    pub fn remove_item(&mut self, line_id: &str) -> CoreResult<LineItem> {
        let position = self
            .items
            .iter()
            .position(|i| i.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;

        if self.discounting_line.as_deref() == Some(line_id) {
            self.discounting_line = None;
        }
        debug!(line_id, "Removing cart line");
        Ok(self.items.remove(position))
    }

    /// Marks a line as open in the discount dialog.
    pub fn begin_discount(&mut self, line_id: &str) -> CoreResult<()> {
        self.line(line_id)?;
        self.discounting_line = Some(line_id.to_string());
        Ok(())
    }

    /// Closes the discount dialog without changing anything.
    pub fn cancel_discount(&mut self) {
        self.discounting_line = None;
    }

    /// Line currently open in the discount dialog, if it still exists.
    pub fn discounting_line(&self) -> Option<&LineItem> {
        self.discounting_line.as_deref().and_then(|id| self.get(id))
    }

    /// Attaches a manual discount to a line.
    ///
    /// ## Example
    /// ```text
    /// $100 item, Percentage(10) → adjusted $90
    /// $100 item, Fixed(15)      → adjusted $85
    /// $100 item, Fixed(150)     → adjusted $0
    /// ```
    ///
    /// ## Returns
    /// The adjusted unit price.
    pub fn apply_manual_discount(&mut self, line_id: &str, discount: Discount) -> CoreResult<Money> {
        validate_discount(&discount)?;
        let item = self.line_mut(line_id)?;
        item.manual_discount = Some(discount);
        item.reprice();
        let adjusted = item.effective_price();

        if self.discounting_line.as_deref() == Some(line_id) {
            self.discounting_line = None;
        }
        debug!(line_id, ?discount, adjusted = %adjusted, "Manual discount applied");
        Ok(adjusted)
    }

    /// Clears a line's manual discount, restoring the unit price.
    pub fn remove_manual_discount(&mut self, line_id: &str) -> CoreResult<()> {
        let item = self.line_mut(line_id)?;
        item.manual_discount = None;
        item.reprice();
        Ok(())
    }

    /// Empties the cart lines.
    pub fn clear_cart(&mut self) {
        self.items.clear();
    }

    /// Empties the cart and drops all transient state.
    pub fn reset(&mut self) {
        self.items.clear();
        self.discounting_line = None;
        self.warnings.clear();
    }

    /// Applies a fresh catalog snapshot to existing lines.
    ///
    /// ## What Changes
    /// - `name`, `inventory_id`, `unit_price` (tier price when tiered),
    ///   `available_inventory`, `tier_label`
    /// - `adjusted_price` is re-derived from the kept manual discount
    ///
    /// ## What Never Changes
    /// - `quantity`, `manual_discount`, `tier_quantity`, line order
    ///
    /// Lines whose product is missing from the snapshot are left untouched.
    /// When only the line's tier is gone, the old price and label stay but
    /// the product fields and stock are still refreshed.
    ///
    /// ## Returns
    /// Number of lines refreshed.
    pub fn refresh_from_catalog(&mut self, catalog: &HashMap<String, Product>) -> usize {
        let mut refreshed = 0;
        let mut warnings = Vec::new();

        for item in &mut self.items {
            let Some(product) = catalog.get(&item.product_id) else {
                continue;
            };

            item.name = product.name.clone();
            item.inventory_id = product.inventory_id().to_string();
            item.available_inventory = product.inventory_quantity_at_location;
            refreshed += 1;

            let tier = match item.tier_key.as_deref() {
                Some(key) => match product.find_tier(key) {
                    Some(tier) => Some(tier),
                    None => {
                        warn!(line_id = %item.id, tier = key, "Tier missing from catalog refresh, keeping old price");
                        continue;
                    }
                },
                None => None,
            };

            let resolved = resolve(product, tier);
            if let Some(warning) = resolved.warning {
                warnings.push(warning);
            }

            item.unit_price = resolved.unit_price;
            item.tier_label = resolved.tier_label;
            item.reprice();
        }

        for warning in warnings {
            self.record_warning(warning);
        }
        debug!(refreshed, "Cart refreshed from catalog");
        refreshed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up a line by id.
    pub fn get(&self, line_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == line_id)
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of line totals, before any cart-level discount.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Data-quality problems seen while pricing lines.
    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    /// Stock held by lines of `inventory_id` other than `except_line`.
    fn committed_elsewhere(&self, inventory_id: &str, except_line: Option<&str>) -> Decimal {
        self.items
            .iter()
            .filter(|i| i.inventory_id == inventory_id && Some(i.id.as_str()) != except_line)
            .map(LineItem::inventory_deduction)
            .sum()
    }

    fn record_warning(&mut self, warning: DataQualityWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    fn line(&self, line_id: &str) -> CoreResult<&LineItem> {
        self.get(line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))
    }

    fn line_mut(&mut self, line_id: &str) -> CoreResult<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn test_product(id: &str, price_cents: i64, inventory: &str) -> Product {
        Product {
            id: id.to_string(),
            inventory_id: Some(format!("inv-{}", id)),
            name: format!("Product {}", id),
            regular_price: Some(Money::from_cents(price_cents)),
            price: None,
            inventory_quantity_at_location: d(inventory),
            pricing_tiers: vec![
                PricingTier {
                    label: Some("Eighth".to_string()),
                    weight: Some("3.5g".to_string()),
                    qty: d("3.5"),
                    price: Money::from_cents(3500),
                },
                PricingTier {
                    label: Some("Ounce".to_string()),
                    weight: Some("28g".to_string()),
                    qty: d("28"),
                    price: Money::from_cents(20000),
                },
            ],
        }
    }

    #[test]
    fn test_add_without_tier_has_unit_tier_quantity() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "10");

        let outcome = cart.add_item(&product, None);

        assert_eq!(outcome, AddOutcome::Added { line_id: "1".to_string() });
        let line = cart.get("1").unwrap();
        assert_eq!(line.tier_quantity, Decimal::ONE);
        assert_eq!(line.quantity, 1);
        assert_eq!(line.inventory_id, "inv-1");
    }

    #[test]
    fn test_add_with_tier_keeps_tier_quantity() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "100");

        cart.add_item(&product, product.pricing_tiers.first());
        cart.add_item(&product, product.pricing_tiers.get(1));

        assert_eq!(cart.get("1_Eighth").unwrap().tier_quantity, d("3.5"));
        assert_eq!(cart.get("1_Ounce").unwrap().tier_quantity, d("28"));
        assert_eq!(cart.get("1_Eighth").unwrap().tier_label.as_deref(), Some("Eighth"));
    }

    #[test]
    fn test_same_product_and_tier_merges() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "100");
        let eighth = product.pricing_tiers.first();

        cart.add_item(&product, eighth);
        let outcome = cart.add_item(&product, eighth);

        assert_eq!(
            outcome,
            AddOutcome::Merged {
                line_id: "1_Eighth".to_string(),
                quantity: 2
            }
        );
        assert_eq!(cart.item_count(), 1);
        let line = cart.get("1_Eighth").unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.tier_quantity, d("3.5"));
        assert_eq!(line.inventory_deduction(), d("7"));
    }

    #[test]
    fn test_different_tiers_are_distinct_lines() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "100");

        cart.add_item(&product, product.pricing_tiers.first());
        cart.add_item(&product, product.pricing_tiers.get(1));
        cart.add_item(&product, None);

        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_third_add_with_inventory_two_is_noop() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "2");

        assert!(cart.add_item(&product, None).changed());
        assert!(cart.add_item(&product, None).changed());
        let third = cart.add_item(&product, None);

        assert!(!third.changed());
        assert_eq!(cart.get("1").unwrap().quantity, 2);
    }

    #[test]
    fn test_out_of_stock_never_creates_line() {
        let mut cart = CartLedger::new();
        for stock in ["0", "-3"] {
            let product = test_product("1", 999, stock);
            assert!(matches!(
                cart.add_item(&product, None),
                AddOutcome::OutOfStock { .. }
            ));
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_tier_larger_than_stock_is_noop() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "20");

        let outcome = cart.add_item(&product, product.pricing_tiers.get(1));

        assert!(matches!(outcome, AddOutcome::AtInventoryLimit { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_clamps_to_inventory() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "10");
        cart.add_item(&product, product.pricing_tiers.first());

        // 10 / 3.5 = 2.857 → at most 2 eighths
        let qty = cart.update_quantity("1_Eighth", 5).unwrap();

        assert_eq!(qty, 2);
        let line = cart.get("1_Eighth").unwrap();
        assert!(line.inventory_deduction() <= line.available_inventory);
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "10");
        cart.add_item(&product, None);
        cart.add_item(&product, None);

        assert_eq!(cart.update_quantity("1", -1).unwrap(), 1);
        assert_eq!(cart.update_quantity("1", -5).unwrap(), 0);
        assert!(cart.get("1").is_none());
    }

    #[test]
    fn test_set_quantity_clamps_and_removes() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "4");
        cart.add_item(&product, None);

        assert_eq!(cart.set_quantity("1", 9).unwrap(), 4);
        assert_eq!(cart.set_quantity("1", 3).unwrap(), 3);
        assert_eq!(cart.set_quantity("1", 0).unwrap(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_line_errors() {
        let mut cart = CartLedger::new();
        assert!(matches!(
            cart.update_quantity("missing", 1),
            Err(CoreError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_manual_discounts() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 10000, "10");
        cart.add_item(&product, None);

        let adjusted = cart
            .apply_manual_discount("1", Discount::Percentage(Decimal::TEN))
            .unwrap();
        assert_eq!(adjusted, Money::from_cents(9000));
        assert_eq!(cart.get("1").unwrap().adjusted_price, Some(Money::from_cents(9000)));

        let adjusted = cart
            .apply_manual_discount("1", Discount::Fixed(Money::from_cents(1500)))
            .unwrap();
        assert_eq!(adjusted, Money::from_cents(8500));

        cart.remove_manual_discount("1").unwrap();
        let line = cart.get("1").unwrap();
        assert_eq!(line.adjusted_price, None);
        assert_eq!(line.manual_discount, None);
        assert_eq!(line.effective_price(), Money::from_cents(10000));
    }

    #[test]
    fn test_manual_discount_clamps_at_zero() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 1000, "10");
        cart.add_item(&product, None);

        let adjusted = cart
            .apply_manual_discount("1", Discount::Fixed(Money::from_cents(5000)))
            .unwrap();
        assert_eq!(adjusted, Money::zero());
    }

    #[test]
    fn test_manual_discount_rejects_out_of_range() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 1000, "10");
        cart.add_item(&product, None);

        assert!(matches!(
            cart.apply_manual_discount("1", Discount::Percentage(Decimal::from(150))),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.get("1").unwrap().manual_discount.is_none());
    }

    #[test]
    fn test_discount_selection_lifecycle() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 1000, "10");
        cart.add_item(&product, None);

        cart.begin_discount("1").unwrap();
        assert_eq!(cart.discounting_line().map(|l| l.id.as_str()), Some("1"));

        cart.apply_manual_discount("1", Discount::Percentage(Decimal::TEN))
            .unwrap();
        assert!(cart.discounting_line().is_none());

        cart.begin_discount("1").unwrap();
        cart.reset();
        assert!(cart.discounting_line().is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_cart() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 999, "10");
        cart.add_item(&product, None);
        assert!(!cart.is_empty());

        cart.clear_cart();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_subtotal_uses_adjusted_price() {
        let mut cart = CartLedger::new();
        let a = test_product("a", 1000, "10");
        let b = test_product("b", 500, "10");
        cart.add_item(&a, None);
        cart.add_item(&a, None);
        cart.add_item(&b, None);
        cart.apply_manual_discount("b", Discount::Fixed(Money::from_cents(100)))
            .unwrap();

        assert_eq!(cart.subtotal(), Money::from_cents(2400));
        assert_eq!(cart.total_units(), 3);
    }

    #[test]
    fn test_refresh_keeps_quantities_and_discounts() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 10000, "10");
        cart.add_item(&product, None);
        cart.add_item(&product, None);
        cart.apply_manual_discount("1", Discount::Percentage(Decimal::TEN))
            .unwrap();

        let mut updated = product.clone();
        updated.price = Some(Money::from_cents(20000));
        updated.inventory_quantity_at_location = d("1");
        let catalog = HashMap::from([(updated.id.clone(), updated)]);

        assert_eq!(cart.refresh_from_catalog(&catalog), 1);

        let line = cart.get("1").unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, Money::from_cents(20000));
        assert_eq!(line.adjusted_price, Some(Money::from_cents(18000)));
        assert_eq!(line.available_inventory, d("1"));
    }

    #[test]
    fn test_increment_never_shrinks_stale_line() {
        let mut cart = CartLedger::new();
        let product = test_product("1", 1000, "5");
        for _ in 0..4 {
            cart.add_item(&product, None);
        }

        let mut updated = product.clone();
        updated.inventory_quantity_at_location = d("2");
        cart.refresh_from_catalog(&HashMap::from([(updated.id.clone(), updated)]));

        assert_eq!(cart.update_quantity("1", 1).unwrap(), 4);
        assert_eq!(cart.update_quantity("1", -1).unwrap(), 3);
    }

    #[test]
    fn test_product_id_matching_another_line_id_gets_its_own_line() {
        let mut cart = CartLedger::new();
        let mut a = test_product("a", 999, "100");
        a.pricing_tiers[1].label = Some("b".to_string());
        let a_b = test_product("a_b", 500, "100");

        cart.add_item(&a, a.pricing_tiers.get(1));
        let outcome = cart.add_item(&a_b, None);

        assert!(matches!(outcome, AddOutcome::Added { .. }));
        assert_eq!(cart.item_count(), 2);
        let ounce = cart.get("a_b").unwrap();
        assert_eq!((ounce.product_id.as_str(), ounce.quantity), ("a", 1));
        assert_eq!(ounce.inventory_deduction(), d("28"));
        let plain = cart.get("a\\_b").unwrap();
        assert_eq!((plain.product_id.as_str(), plain.quantity), ("a_b", 1));
        assert_eq!(plain.inventory_deduction(), Decimal::ONE);
        assert_eq!(cart.subtotal(), Money::from_cents(20500));
    }

    #[test]
    fn test_tiers_of_one_product_share_its_stock() {
        let mut cart = CartLedger::new();
        let product = test_product("f", 1000, "10");

        cart.add_item(&product, product.pricing_tiers.first());
        cart.add_item(&product, product.pricing_tiers.first());
        cart.add_item(&product, None);
        // 7 of 10 held by the eighths, so the plain line tops out at 3
        assert_eq!(cart.set_quantity("f", 10).unwrap(), 3);
        assert!(matches!(
            cart.add_item(&product, None),
            AddOutcome::AtInventoryLimit { .. }
        ));
        assert!(matches!(
            cart.add_item(&product, product.pricing_tiers.first()),
            AddOutcome::AtInventoryLimit { .. }
        ));

        let held: Decimal = cart.items().iter().map(LineItem::inventory_deduction).sum();
        assert_eq!(held, d("10"));
    }

    #[test]
    fn test_refresh_tiered_line_picks_up_tier_price_and_stock() {
        let mut cart = CartLedger::new();
        let product = test_product("f", 1000, "10");
        cart.add_item(&product, product.pricing_tiers.first());

        let mut updated = product.clone();
        updated.pricing_tiers[0].price = Money::from_cents(4000);
        updated.inventory_quantity_at_location = d("3");
        assert_eq!(cart.refresh_from_catalog(&HashMap::from([(updated.id.clone(), updated)])), 1);

        let line = cart.get("f_Eighth").unwrap();
        assert_eq!(line.unit_price, Money::from_cents(4000));
        assert_eq!(line.tier_quantity, d("3.5"));
        assert_eq!(line.available_inventory, d("3"));
        assert_eq!(line.max_quantity(), 0);
    }

    #[test]
    fn test_refresh_with_missing_tier_still_updates_stock() {
        let mut cart = CartLedger::new();
        let product = test_product("f", 1000, "10");
        cart.add_item(&product, product.pricing_tiers.first());

        let mut updated = product.clone();
        updated.name = "Renamed".to_string();
        updated.inventory_quantity_at_location = Decimal::ZERO;
        updated.pricing_tiers[0].label = Some("1/8 oz".to_string());
        updated.pricing_tiers[0].price = Money::from_cents(9900);
        assert_eq!(cart.refresh_from_catalog(&HashMap::from([(updated.id.clone(), updated)])), 1);

        let line = cart.get("f_Eighth").unwrap();
        assert_eq!(line.unit_price, Money::from_cents(3500));
        assert_eq!(line.tier_label.as_deref(), Some("Eighth"));
        assert_eq!(line.name, "Renamed");
        assert_eq!(line.available_inventory, Decimal::ZERO);
        assert_eq!(cart.update_quantity("f_Eighth", 1).unwrap(), 1);
    }

    #[test]
    fn test_missing_price_is_recorded_as_warning() {
        let mut cart = CartLedger::new();
        let mut product = test_product("1", 0, "5");
        product.regular_price = None;

        cart.add_item(&product, None);
        cart.add_item(&product, None);

        assert_eq!(cart.warnings().len(), 1);
        assert_eq!(cart.get("1").unwrap().unit_price, Money::zero());
    }
}
