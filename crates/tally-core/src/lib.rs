//! # tally-core: Cart Ledger & Checkout Pricing for Tally POS
//!
//! Everything between "cashier scans a product" and "payment is handed to
//! the sale backend": cart lines, tier pricing, manual and cart-level
//! discounts, tax and the final total. Pure logic, zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Checkout                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Checkout UI / tally-checkout CLI (scenario replay)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ mutations, catalog events              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   session ──► cart ──► tier          campaign                   │   │
//! │  │      │                                   │                      │   │
//! │  │      └──► totals ──► discount ◄──────────┘                      │   │
//! │  │              └─────► tax                                        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CheckoutSubmission (advisory)         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              Sale backend (re-prices, deducts stock)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Decimal money, rounded only at tax and total
//! - [`types`] - Catalog records, tax rates, manual discounts, defaults
//! - [`tier`] - Product/tier to unit price and tier quantity
//! - [`cart`] - The cart ledger with inventory caps
//! - [`campaign`] - Campaign records and their applicability predicate
//! - [`discount`] - Loyalty then campaign discounts
//! - [`tax`] - Location tax lookup behind the [`TaxAdapter`] seam
//! - [`totals`] - The checkout totals pipeline
//! - [`session`] - One checkout, recomputed on every write
//! - [`submission`] - Payload for the sale backend
//! - [`validation`] - Input rules and the checkout gate
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::session::{CatalogEvent, CheckoutSession};
//! use tally_core::{Money, PricingDefaults, Product};
//! use rust_decimal::Decimal;
//!
//! let mut session = CheckoutSession::new(PricingDefaults::default());
//! session.handle_event(CatalogEvent::CatalogReplaced(vec![Product {
//!     id: "p1".to_string(),
//!     inventory_id: None,
//!     name: "Pre-roll".to_string(),
//!     regular_price: Some(Money::from_cents(1000)),
//!     price: None,
//!     inventory_quantity_at_location: Decimal::from(5),
//!     pricing_tiers: vec![],
//! }]));
//!
//! session.add_product("p1", None).unwrap();
//!
//! // $10.00 + 8% default tax
//! assert_eq!(session.totals().total, Money::from_cents(1080));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod campaign;
pub mod cart;
pub mod discount;
pub mod error;
pub mod money;
pub mod session;
pub mod submission;
pub mod tax;
pub mod tier;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use campaign::{Campaign, CampaignDiscountType, CampaignSchedule, CampaignStatus};
pub use cart::{AddOutcome, CartLedger, LineItem};
pub use discount::{DiscountEngine, LoyaltyProgram, LoyaltyRedemption};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use session::{CatalogEvent, CheckoutSession, Clock, FixedClock, SystemClock};
pub use submission::{CheckoutLine, CheckoutSubmission};
pub use tax::{LocationTaxTable, TaxAdapter, TaxQuote};
pub use totals::{BreakdownLine, CheckoutTotals, TotalsInput};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax rate used when no location configuration applies (8%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

/// Label shown next to the fallback tax rate.
pub const DEFAULT_TAX_NAME: &str = "Tax";

/// Value of one loyalty point when no program is loaded ($0.01).
pub const DEFAULT_POINT_VALUE_CENTS: i64 = 1;
