//! # Checkout Session
//!
//! One in-progress checkout: the cart plus every selection that feeds the
//! totals pipeline.
//!
//! ## Recompute on Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI action / catalog event                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutSession::<mutation>()                                          │
//! │       │  cart / customer / points / campaign / location / snapshot     │
//! │       ▼                                                                 │
//! │  recompute()  ──► CheckoutTotals::compute(..)  ──► self.totals          │
//! │                                                                         │
//! │  No debounce. A reader never sees totals that lag the inputs.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is the single writer. It is `Send`, so a host shell can keep
//! it behind `Arc<Mutex<CheckoutSession>>`.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::campaign::{Campaign, CampaignStatus};
use crate::cart::{AddOutcome, CartLedger, LineItem};
use crate::discount::{max_redeemable_points, LoyaltyProgram, LoyaltyRedemption};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::submission::{CheckoutLine, CheckoutSubmission};
use crate::tax::{LocationTaxTable, TaxAdapter};
use crate::totals::{CheckoutTotals, TotalsInput};
use crate::types::{Customer, Discount, LocationTaxConfig, PricingDefaults, PricingTier, Product};
use crate::validation::validate_checkout_lines;

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for campaign schedules, in store-local time.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the machine's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Always returns the same instant. Used for replays and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// =============================================================================
// Catalog Events
// =============================================================================

/// Upstream data changes pushed into an open checkout.
///
/// Events refresh derived values only. Quantities, manual discounts and
/// selections made by the cashier survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// Some products changed; merged into the catalog snapshot.
    ProductsChanged(Vec<Product>),
    /// Full catalog reload.
    CatalogReplaced(Vec<Product>),
    LoyaltyProgramChanged(Option<LoyaltyProgram>),
    /// Full campaign list. A selected campaign that disappears is deselected.
    CampaignsChanged(Vec<Campaign>),
    /// Full location tax list.
    TaxConfigChanged(Vec<LocationTaxConfig>),
}

/// One entry of the campaign picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignOption {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub selectable: bool,
}

// =============================================================================
// Checkout Session
// =============================================================================

/// State of one checkout, with totals kept current.
#[derive(Debug)]
pub struct CheckoutSession {
    id: Uuid,
    defaults: PricingDefaults,
    catalog: HashMap<String, Product>,
    cart: CartLedger,
    customer: Option<Customer>,
    points_to_redeem: u64,
    loyalty_program: Option<LoyaltyProgram>,
    campaigns: Vec<Campaign>,
    selected_campaign: Option<String>,
    location_id: Option<String>,
    tax: Box<dyn TaxAdapter>,
    totals: CheckoutTotals,
    clock: Box<dyn Clock>,
}

impl CheckoutSession {
    /// Creates an empty session on the system clock.
    pub fn new(defaults: PricingDefaults) -> Self {
        Self::with_clock(defaults, SystemClock)
    }

    /// Creates an empty session on the given clock, taxing from a location
    /// table seeded with the default rate.
    pub fn with_clock(defaults: PricingDefaults, clock: impl Clock + 'static) -> Self {
        let tax = LocationTaxTable::new(&defaults);
        Self::with_tax_adapter(defaults, clock, tax)
    }

    /// Creates an empty session that resolves tax through `tax`.
    pub fn with_tax_adapter(
        defaults: PricingDefaults,
        clock: impl Clock + 'static,
        tax: impl TaxAdapter + 'static,
    ) -> Self {
        let totals = CheckoutTotals::empty(defaults.tax_rate, defaults.tax_name.clone());
        let session = CheckoutSession {
            id: Uuid::new_v4(),
            defaults,
            catalog: HashMap::new(),
            cart: CartLedger::new(),
            customer: None,
            points_to_redeem: 0,
            loyalty_program: None,
            campaigns: Vec::new(),
            selected_campaign: None,
            location_id: None,
            tax: Box::new(tax),
            totals,
            clock: Box::new(clock),
        };
        info!(session_id = %session.id, "Checkout session started");
        session
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds one unit of a catalog product, optionally a specific tier.
    pub fn add_product(&mut self, product_id: &str, tier_key: Option<&str>) -> CoreResult<AddOutcome> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let tier = match tier_key {
            Some(key) => Some(product.find_tier(key).ok_or_else(|| CoreError::TierNotFound {
                product_id: product_id.to_string(),
                tier: key.to_string(),
            })?),
            None => None,
        };

        let outcome = self.cart.add_item(product, tier);
        self.recompute();
        Ok(outcome)
    }

    /// Adds one unit of a product record that need not be in the catalog.
    pub fn add_item(&mut self, product: &Product, tier: Option<&PricingTier>) -> AddOutcome {
        let outcome = self.cart.add_item(product, tier);
        self.recompute();
        outcome
    }

    pub fn update_quantity(&mut self, line_id: &str, delta: i64) -> CoreResult<u32> {
        let quantity = self.cart.update_quantity(line_id, delta)?;
        self.recompute();
        Ok(quantity)
    }

    pub fn set_quantity(&mut self, line_id: &str, quantity: u32) -> CoreResult<u32> {
        let quantity = self.cart.set_quantity(line_id, quantity)?;
        self.recompute();
        Ok(quantity)
    }

    pub fn remove_item(&mut self, line_id: &str) -> CoreResult<LineItem> {
        let removed = self.cart.remove_item(line_id)?;
        self.recompute();
        Ok(removed)
    }

    pub fn begin_discount(&mut self, line_id: &str) -> CoreResult<()> {
        self.cart.begin_discount(line_id)
    }

    pub fn cancel_discount(&mut self) {
        self.cart.cancel_discount();
    }

    pub fn apply_manual_discount(&mut self, line_id: &str, discount: Discount) -> CoreResult<Money> {
        let adjusted = self.cart.apply_manual_discount(line_id, discount)?;
        self.recompute();
        Ok(adjusted)
    }

    pub fn remove_manual_discount(&mut self, line_id: &str) -> CoreResult<()> {
        self.cart.remove_manual_discount(line_id)?;
        self.recompute();
        Ok(())
    }

    /// Empties the cart. Customer and selections stay.
    pub fn clear_cart(&mut self) {
        self.cart.clear_cart();
        self.recompute();
    }

    /// Starts over for the next sale: empty cart, no customer, no points,
    /// no campaign and a fresh session id. Catalog snapshots and location
    /// are kept.
    pub fn reset(&mut self) {
        self.cart.reset();
        self.customer = None;
        self.points_to_redeem = 0;
        self.selected_campaign = None;
        self.id = Uuid::new_v4();
        debug!(session_id = %self.id, "Checkout session reset");
        self.recompute();
    }

    // =========================================================================
    // Customer & Loyalty
    // =========================================================================

    /// Attaches or detaches the customer. Redemption always goes back to 0.
    pub fn select_customer(&mut self, customer: Option<Customer>) {
        debug!(customer_id = ?customer.as_ref().map(|c| c.id.as_str()), "Customer selected");
        self.customer = customer;
        self.points_to_redeem = 0;
        self.recompute();
    }

    /// Sets the points to redeem, clamped to the customer's balance.
    ///
    /// ## Returns
    /// The points actually set.
    pub fn set_points_to_redeem(&mut self, points: u64) -> CoreResult<u64> {
        let customer = self.customer.as_ref().ok_or(CoreError::NoCustomerSelected)?;
        let clamped = points.min(customer.loyalty_points);
        if clamped < points {
            debug!(requested = points, balance = customer.loyalty_points, "Redemption clamped to balance");
        }
        self.points_to_redeem = clamped;
        self.recompute();
        Ok(clamped)
    }

    /// Point value of the loaded program, or the configured default.
    pub fn point_value(&self) -> Money {
        self.loyalty_program
            .as_ref()
            .map(|p| p.point_value)
            .unwrap_or(self.defaults.point_value)
    }

    pub fn redemption(&self) -> LoyaltyRedemption {
        LoyaltyRedemption::new(self.points_to_redeem, self.point_value())
    }

    /// Most points worth redeeming against the current subtotal.
    pub fn max_redeemable_points(&self) -> u64 {
        let balance = self.customer.as_ref().map_or(0, |c| c.loyalty_points);
        max_redeemable_points(balance, self.cart.subtotal(), self.point_value())
    }

    // =========================================================================
    // Campaigns
    // =========================================================================

    /// Selects a campaign by id, or clears the selection with `None`.
    ///
    /// Applicability is checked now and again on every recompute.
    pub fn select_campaign(&mut self, campaign_id: Option<&str>) -> CoreResult<()> {
        let Some(id) = campaign_id else {
            self.selected_campaign = None;
            self.recompute();
            return Ok(());
        };

        let campaign = self
            .campaigns
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::CampaignNotFound(id.to_string()))?;

        let status = campaign.status(self.clock.now());
        if !status.is_applicable() {
            return Err(CoreError::CampaignNotApplicable {
                campaign_id: id.to_string(),
                status,
            });
        }

        self.selected_campaign = Some(id.to_string());
        self.recompute();
        Ok(())
    }

    /// Loaded campaigns with their current status.
    pub fn campaign_options(&self) -> Vec<CampaignOption> {
        let now = self.clock.now();
        self.campaigns
            .iter()
            .map(|c| {
                let status = c.status(now);
                CampaignOption {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    status,
                    selectable: status.is_applicable(),
                }
            })
            .collect()
    }

    // =========================================================================
    // Location & Catalog
    // =========================================================================

    pub fn set_location(&mut self, location_id: Option<String>) {
        self.location_id = location_id;
        self.recompute();
    }

    /// Applies an upstream change and recomputes.
    pub fn handle_event(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::ProductsChanged(products) => {
                debug!(count = products.len(), "Products changed");
                for product in products {
                    self.catalog.insert(product.id.clone(), product);
                }
                self.cart.refresh_from_catalog(&self.catalog);
            }
            CatalogEvent::CatalogReplaced(products) => {
                debug!(count = products.len(), "Catalog replaced");
                self.catalog = products.into_iter().map(|p| (p.id.clone(), p)).collect();
                self.cart.refresh_from_catalog(&self.catalog);
            }
            CatalogEvent::LoyaltyProgramChanged(program) => {
                debug!(loaded = program.is_some(), "Loyalty program changed");
                self.loyalty_program = program;
            }
            CatalogEvent::CampaignsChanged(campaigns) => {
                debug!(count = campaigns.len(), "Campaigns changed");
                self.campaigns = campaigns;
                let still_loaded = self
                    .selected_campaign
                    .as_ref()
                    .map_or(true, |id| self.campaigns.iter().any(|c| &c.id == id));
                if !still_loaded {
                    debug!(campaign_id = ?self.selected_campaign, "Selected campaign removed, deselecting");
                    self.selected_campaign = None;
                }
            }
            CatalogEvent::TaxConfigChanged(configs) => {
                debug!(count = configs.len(), "Tax configuration changed");
                self.tax.replace_locations(configs);
            }
        }
        self.recompute();
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Recomputes totals at the clock's current time.
    pub fn recompute(&mut self) -> &CheckoutTotals {
        let now = self.clock.now();
        self.recompute_at(now)
    }

    /// Recomputes totals as of `now`. Same inputs, same result.
    pub fn recompute_at(&mut self, now: NaiveDateTime) -> &CheckoutTotals {
        let redemption = self.redemption();
        let campaign = self
            .selected_campaign
            .as_ref()
            .and_then(|id| self.campaigns.iter().find(|c| &c.id == id));

        self.totals = CheckoutTotals::compute(
            &TotalsInput {
                lines: self.cart.items(),
                redemption: &redemption,
                campaign,
                loyalty_program: self.loyalty_program.as_ref(),
                location_id: self.location_id.as_deref(),
                now,
            },
            self.tax.as_ref(),
        );
        &self.totals
    }

    /// Validates the cart and builds the payload for the sale backend.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`]
    /// - [`CoreError::InvalidTierQuantity`] naming the offending item
    pub fn prepare_submission(&mut self) -> CoreResult<CheckoutSubmission> {
        validate_checkout_lines(self.cart.items())?;
        self.recompute();

        let points_redeemed =
            max_redeemable_points(self.points_to_redeem, self.totals.subtotal, self.point_value());

        let submission = CheckoutSubmission {
            session_id: self.id,
            customer_id: self.customer.as_ref().map(|c| c.id.clone()),
            campaign_id: self.totals.applied_campaign_id.clone(),
            points_redeemed,
            location_id: self.location_id.clone(),
            lines: self.cart.items().iter().map(CheckoutLine::from).collect(),
            totals: self.totals.clone(),
        };
        info!(
            session_id = %submission.session_id,
            lines = submission.lines.len(),
            total = %submission.totals.total,
            "Checkout prepared"
        );
        Ok(submission)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn totals(&self) -> &CheckoutTotals {
        &self.totals
    }

    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn points_to_redeem(&self) -> u64 {
        self.points_to_redeem
    }

    pub fn selected_campaign(&self) -> Option<&Campaign> {
        self.selected_campaign
            .as_ref()
            .and_then(|id| self.campaigns.iter().find(|c| &c.id == id))
    }

    pub fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.catalog.get(product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::{CampaignDiscountType, CampaignSchedule};
    use crate::types::TaxRate;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn product(id: &str, cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            inventory_id: None,
            name: format!("Product {}", id),
            regular_price: Some(Money::from_cents(cents)),
            price: None,
            inventory_quantity_at_location: Decimal::from(stock),
            pricing_tiers: vec![PricingTier {
                label: Some("3.5g".to_string()),
                weight: None,
                qty: Decimal::new(35, 1),
                price: Money::from_cents(3500),
            }],
        }
    }

    fn campaign(id: &str, active: bool) -> Campaign {
        Campaign {
            id: id.to_string(),
            name: format!("Campaign {}", id),
            is_active: active,
            discount_type: CampaignDiscountType::Percentage,
            discount_value: Decimal::TEN,
            schedule: CampaignSchedule::Always,
            max_total_uses: None,
            current_uses: 0,
        }
    }

    fn customer(points: u64) -> Customer {
        Customer {
            id: "cust-1".to_string(),
            name: "Ada".to_string(),
            loyalty_points: points,
        }
    }

    fn session() -> CheckoutSession {
        let mut s = CheckoutSession::with_clock(PricingDefaults::default(), FixedClock(noon()));
        s.handle_event(CatalogEvent::CatalogReplaced(vec![
            product("a", 6000, 10),
            product("b", 2000, 10),
        ]));
        s
    }

    #[test]
    fn test_every_mutation_recomputes() {
        let mut s = session();
        assert!(s.totals().total.is_zero());

        s.add_product("a", None).unwrap();
        assert_eq!(s.totals().subtotal, Money::from_cents(6000));

        s.update_quantity("a", 1).unwrap();
        assert_eq!(s.totals().subtotal, Money::from_cents(12000));

        s.apply_manual_discount("a", Discount::Percentage(Decimal::new(50, 0)))
            .unwrap();
        assert_eq!(s.totals().subtotal, Money::from_cents(6000));

        s.remove_item("a").unwrap();
        assert!(s.totals().subtotal.is_zero());
    }

    #[test]
    fn test_add_product_unknowns() {
        let mut s = session();
        assert!(matches!(s.add_product("zzz", None), Err(CoreError::ProductNotFound(_))));
        assert!(matches!(
            s.add_product("a", Some("1oz")),
            Err(CoreError::TierNotFound { .. })
        ));
        assert!(s.add_product("a", Some("3.5g")).unwrap().changed());
        assert!(s.cart().get("a_3.5g").is_some());
    }

    #[test]
    fn test_reference_scenario() {
        let mut s = session();
        s.handle_event(CatalogEvent::CampaignsChanged(vec![campaign("c-10", true)]));
        s.add_product("a", None).unwrap();
        s.add_product("b", None).unwrap();
        s.add_product("b", None).unwrap();
        s.select_customer(Some(customer(500)));
        s.set_points_to_redeem(100).unwrap();
        s.select_campaign(Some("c-10")).unwrap();

        let totals = s.totals();
        assert_eq!(totals.subtotal, Money::from_cents(10000));
        assert_eq!(totals.subtotal_after_discounts, Money::from_cents(8910));
        assert_eq!(totals.tax_amount, Money::from_cents(713));
        assert_eq!(totals.total, Money::from_cents(9623));
    }

    #[test]
    fn test_points_require_customer_and_clamp() {
        let mut s = session();
        assert!(matches!(s.set_points_to_redeem(10), Err(CoreError::NoCustomerSelected)));

        s.select_customer(Some(customer(40)));
        assert_eq!(s.set_points_to_redeem(100).unwrap(), 40);
        assert_eq!(s.points_to_redeem(), 40);
    }

    #[test]
    fn test_customer_change_resets_points() {
        let mut s = session();
        s.add_product("a", None).unwrap();
        s.select_customer(Some(customer(500)));
        s.set_points_to_redeem(300).unwrap();
        assert_eq!(s.totals().loyalty_discount, Money::from_cents(300));

        let mut other = customer(900);
        other.id = "cust-2".to_string();
        s.select_customer(Some(other));
        assert_eq!(s.points_to_redeem(), 0);
        assert!(s.totals().loyalty_discount.is_zero());
    }

    #[test]
    fn test_select_campaign_errors() {
        let mut s = session();
        s.handle_event(CatalogEvent::CampaignsChanged(vec![
            campaign("on", true),
            campaign("off", false),
        ]));

        assert!(matches!(
            s.select_campaign(Some("missing")),
            Err(CoreError::CampaignNotFound(_))
        ));
        match s.select_campaign(Some("off")) {
            Err(CoreError::CampaignNotApplicable { status, .. }) => {
                assert_eq!(status, CampaignStatus::Inactive)
            }
            other => panic!("unexpected: {:?}", other),
        }

        let options = s.campaign_options();
        assert_eq!(options.len(), 2);
        assert!(options[0].selectable);
        assert!(!options[1].selectable);
    }

    #[test]
    fn test_campaign_removed_is_deselected() {
        let mut s = session();
        s.add_product("a", None).unwrap();
        s.handle_event(CatalogEvent::CampaignsChanged(vec![campaign("c-10", true)]));
        s.select_campaign(Some("c-10")).unwrap();
        assert_eq!(s.totals().campaign_discount, Money::from_cents(600));

        s.handle_event(CatalogEvent::CampaignsChanged(vec![]));
        assert!(s.selected_campaign().is_none());
        assert!(s.totals().campaign_discount.is_zero());
    }

    #[test]
    fn test_campaign_deactivated_stops_discounting() {
        let mut s = session();
        s.add_product("a", None).unwrap();
        s.handle_event(CatalogEvent::CampaignsChanged(vec![campaign("c-10", true)]));
        s.select_campaign(Some("c-10")).unwrap();

        s.handle_event(CatalogEvent::CampaignsChanged(vec![campaign("c-10", false)]));
        assert!(s.selected_campaign().is_some());
        assert!(s.totals().campaign_discount.is_zero());
        assert!(s.totals().applied_campaign_id.is_none());
    }

    #[test]
    fn test_price_change_keeps_cart_edits() {
        let mut s = session();
        s.add_product("a", None).unwrap();
        s.set_quantity("a", 3).unwrap();
        s.apply_manual_discount("a", Discount::Fixed(Money::from_cents(1000)))
            .unwrap();

        let mut repriced = product("a", 7000, 10);
        repriced.name = "Renamed".to_string();
        s.handle_event(CatalogEvent::ProductsChanged(vec![repriced]));

        let line = s.cart().get("a").unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.name, "Renamed");
        assert_eq!(line.effective_price(), Money::from_cents(6000));
        assert_eq!(s.totals().subtotal, Money::from_cents(18000));
        assert!(s.product("b").is_some());
    }

    #[test]
    fn test_location_tax_change() {
        let mut s = session();
        s.add_product("a", None).unwrap();
        s.set_location(Some("loc-1".to_string()));
        assert_eq!(s.totals().tax_rate, TaxRate::from_bps(800));

        s.handle_event(CatalogEvent::TaxConfigChanged(vec![LocationTaxConfig {
            location_id: "loc-1".to_string(),
            sales_tax_rate: TaxRate::from_bps(1000),
            tax_name: "VAT".to_string(),
        }]));
        assert_eq!(s.totals().tax_amount, Money::from_cents(600));
        assert_eq!(s.totals().tax_name, "VAT");
    }

    #[test]
    fn test_external_tax_adapter() {
        #[derive(Debug)]
        struct RemoteRates;
        impl TaxAdapter for RemoteRates {
            fn quote(&self, amount: Money, location_id: Option<&str>) -> crate::tax::TaxQuote {
                let rate = match location_id {
                    Some("duty-free") => TaxRate::zero(),
                    _ => TaxRate::from_bps(500),
                };
                crate::tax::TaxQuote {
                    tax_amount: amount.calculate_tax(rate),
                    tax_rate: rate,
                    tax_name: "Remote".to_string(),
                }
            }
        }

        let mut s = CheckoutSession::with_tax_adapter(
            PricingDefaults::default(),
            FixedClock(noon()),
            RemoteRates,
        );
        s.handle_event(CatalogEvent::CatalogReplaced(vec![product("a", 6000, 10)]));
        s.add_product("a", None).unwrap();
        assert_eq!(s.totals().tax_amount, Money::from_cents(300));
        assert_eq!(s.totals().tax_name, "Remote");

        s.handle_event(CatalogEvent::TaxConfigChanged(vec![LocationTaxConfig {
            location_id: "duty-free".to_string(),
            sales_tax_rate: TaxRate::from_bps(1000),
            tax_name: "VAT".to_string(),
        }]));
        assert_eq!(s.totals().tax_amount, Money::from_cents(300));

        s.set_location(Some("duty-free".to_string()));
        assert!(s.totals().tax_amount.is_zero());
        assert_eq!(s.totals().total, Money::from_cents(6000));
    }

    #[test]
    fn test_loyalty_program_drives_point_value_and_earn() {
        let mut s = session();
        s.add_product("b", None).unwrap();
        s.select_customer(Some(customer(100)));
        s.set_points_to_redeem(100).unwrap();
        assert_eq!(s.totals().loyalty_discount, Money::from_cents(100));
        assert_eq!(s.totals().points_earned, 0);

        s.handle_event(CatalogEvent::LoyaltyProgramChanged(Some(LoyaltyProgram {
            point_value: Money::from_cents(5),
            points_per_dollar: Decimal::ONE,
        })));
        assert_eq!(s.totals().loyalty_discount, Money::from_cents(500));
        // (20 − 5) × 1.08 = 16.20
        assert_eq!(s.totals().points_earned, 16);
    }

    #[test]
    fn test_recompute_at_is_deterministic() {
        let mut s = session();
        s.add_product("a", None).unwrap();
        let first = s.recompute_at(noon()).clone();
        let second = s.recompute_at(noon()).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_prepare_submission() {
        let mut s = session();
        assert!(matches!(s.prepare_submission(), Err(CoreError::EmptyCart)));

        s.add_product("a", Some("3.5g")).unwrap();
        s.update_quantity("a_3.5g", 1).unwrap();
        s.select_customer(Some(customer(100_000)));
        s.set_points_to_redeem(100_000).unwrap();

        let submission = s.prepare_submission().unwrap();
        assert_eq!(submission.session_id, s.id());
        assert_eq!(submission.customer_id.as_deref(), Some("cust-1"));
        assert_eq!(submission.lines[0].inventory_deduction, Decimal::from(7));
        assert_eq!(submission.points_redeemed, 7000);
        assert!(submission.totals.total.is_zero());
    }

    #[test]
    fn test_reset_starts_new_sale() {
        let mut s = session();
        let first_id = s.id();
        s.add_product("a", None).unwrap();
        s.select_customer(Some(customer(10)));
        s.set_location(Some("loc-1".to_string()));

        s.reset();

        assert_ne!(s.id(), first_id);
        assert!(s.cart().is_empty());
        assert!(s.customer().is_none());
        assert_eq!(s.location_id(), Some("loc-1"));
        assert!(s.totals().total.is_zero());
    }
}
