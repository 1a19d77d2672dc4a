//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Failure Classes                                 │
//! │                                                                         │
//! │  BLOCKING (this file, CoreError::InvalidTierQuantity)                  │
//! │  └── corrupted tier quantity on a line → checkout refused              │
//! │                                                                         │
//! │  SILENT CAPPING (no error type at all)                                 │
//! │  ├── add / increment beyond inventory → no-op or clamp                 │
//! │  └── discount beyond remaining value → capped                          │
//! │                                                                         │
//! │  GRACEFUL DEGRADATION (no error type at all)                           │
//! │  └── missing loyalty program / tax config → PricingDefaults            │
//! │                                                                         │
//! │  CALLER MISTAKES (CoreError / ValidationError)                         │
//! │  └── unknown line id, out-of-range discount, unknown campaign, ...     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item name, line id)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::campaign::CampaignStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No cart line has this id.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Product is not in the current catalog snapshot.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product has no pricing tier with this discriminator.
    #[error("Product {product_id} has no pricing tier '{tier}'")]
    TierNotFound { product_id: String, tier: String },

    /// Campaign is not in the loaded campaign list.
    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    /// Campaign exists but fails its activity, schedule, or usage predicate.
    #[error("Campaign {campaign_id} cannot be applied: {status}")]
    CampaignNotApplicable {
        campaign_id: String,
        status: CampaignStatus,
    },

    /// Loyalty points can only be redeemed against a selected customer.
    #[error("Select a customer before redeeming loyalty points")]
    NoCustomerSelected,

    /// Nothing to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// A line carries a missing or non-positive tier quantity.
    ///
    /// ## Why This Blocks Checkout
    /// ```text
    /// Line "Blue Dream (Eighth)" quantity 2, tier_quantity 0
    ///      │
    ///      ▼
    /// inventory deduction = 2 × 0 = 0 grams  ← WRONG, 7 grams left the store
    ///      │
    ///      ▼
    /// InvalidTierQuantity { item_name: "Blue Dream", .. }
    ///      │
    ///      ▼
    /// Staff removes and re-adds the line
    /// ```
    #[error("Invalid tier quantity {tier_quantity} on '{item_name}' (line {line_id}); remove and re-add the item")]
    InvalidTierQuantity {
        line_id: String,
        item_name: String,
        tier_quantity: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for failures that indicate corrupted cart data rather than a
    /// recoverable caller mistake.
    pub fn is_critical(&self) -> bool {
        matches!(self, CoreError::InvalidTierQuantity { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
