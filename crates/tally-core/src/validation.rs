//! # Validation Module
//!
//! Business-rule checks run before state changes or before submission.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Cart mutation (cart.rs)                                      │
//! │  └── inventory caps, silent clamps                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── discount / rate input ranges                                      │
//! │  └── checkout gate: every line has a positive tier quantity            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Server-side commit (out of scope)                            │
//! │  └── authoritative stock check, may still reject                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use tracing::error;

use crate::cart::LineItem;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Discount, TaxRate};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Input Validators
// =============================================================================

/// Validates a manual discount before it is attached to a line.
///
/// ## Rules
/// - Percentage: 0 to 100 inclusive
/// - Fixed: not negative (amounts above the unit price clamp to zero later)
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::validation::validate_discount;
/// use tally_core::{Discount, Money};
///
/// assert!(validate_discount(&Discount::Percentage(Decimal::TEN)).is_ok());
/// assert!(validate_discount(&Discount::Percentage(Decimal::from(101))).is_err());
/// assert!(validate_discount(&Discount::Fixed(Money::from_cents(-1))).is_err());
/// ```
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match discount {
        Discount::Percentage(pct) => {
            if *pct < Decimal::ZERO || *pct > Decimal::ONE_HUNDRED {
                return Err(ValidationError::OutOfRange {
                    field: "percentage discount".to_string(),
                    min: 0,
                    max: 100,
                });
            }
        }
        Discount::Fixed(amount) => {
            if amount.is_negative() {
                return Err(ValidationError::MustNotBeNegative {
                    field: "discount amount".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Validates a tax rate fraction (0 to 1 inclusive).
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.fraction() < Decimal::ZERO || rate.fraction() > Decimal::ONE {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: 1,
        });
    }

    Ok(())
}

// =============================================================================
// Checkout Gate
// =============================================================================

/// Validates the tier quantity of a single line.
pub fn validate_tier_quantity(line: &LineItem) -> CoreResult<()> {
    if line.tier_quantity <= Decimal::ZERO {
        return Err(CoreError::InvalidTierQuantity {
            line_id: line.id.clone(),
            item_name: line.name.clone(),
            tier_quantity: line.tier_quantity.to_string(),
        });
    }

    Ok(())
}

/// Walks every line before submission.
///
/// ## Rules
/// - The cart must not be empty
/// - Every line must have `tier_quantity > 0`; the first offending line is
///   reported by name so staff can find it
///
/// ## User Workflow
/// ```text
/// Cashier presses "Charge"
///      │
///      ▼
/// validate_checkout_lines() ← THIS FUNCTION
///      │
///      ├── empty? ──────────────► EmptyCart
///      ├── tier_quantity <= 0? ─► InvalidTierQuantity (blocking)
///      │
///      └── OK → build submission
/// ```
pub fn validate_checkout_lines(lines: &[LineItem]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    for line in lines {
        if let Err(err) = validate_tier_quantity(line) {
            error!(
                line_id = %line.id,
                item = %line.name,
                tier_quantity = %line.tier_quantity,
                "Blocking checkout: invalid tier quantity"
            );
            return Err(err);
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn line(tier_quantity: Decimal) -> LineItem {
        LineItem {
            id: "p-1".to_string(),
            product_id: "p-1".to_string(),
            inventory_id: "p-1".to_string(),
            name: "Blue Dream".to_string(),
            unit_price: Money::from_cents(1000),
            quantity: 1,
            tier_quantity,
            tier_label: None,
            tier_key: None,
            manual_discount: None,
            adjusted_price: None,
            available_inventory: Decimal::from(10),
        }
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(&Discount::Percentage(Decimal::ZERO)).is_ok());
        assert!(validate_discount(&Discount::Percentage(Decimal::ONE_HUNDRED)).is_ok());
        assert!(validate_discount(&Discount::Percentage(Decimal::NEGATIVE_ONE)).is_err());
        assert!(validate_discount(&Discount::Fixed(Money::zero())).is_ok());
        assert!(validate_discount(&Discount::Fixed(Money::from_cents(-5))).is_err());
    }

    #[test]
    fn test_validate_tax_rate() {
        assert!(validate_tax_rate(TaxRate::from_bps(0)).is_ok());
        assert!(validate_tax_rate(TaxRate::from_bps(825)).is_ok());
        assert!(validate_tax_rate(TaxRate::from_bps(10000)).is_ok());
        assert!(validate_tax_rate(TaxRate::from_bps(10001)).is_err());
    }

    #[test]
    fn test_checkout_accepts_positive_tier_quantities() {
        let lines = vec![line(Decimal::ONE), line(Decimal::new(35, 1))];
        assert!(validate_checkout_lines(&lines).is_ok());
    }

    #[test]
    fn test_checkout_rejects_zero_and_negative_tier_quantity() {
        let err = validate_checkout_lines(&[line(Decimal::ONE), line(Decimal::ZERO)]).unwrap_err();
        assert!(err.is_critical());
        assert!(err.to_string().contains("Blue Dream"));

        let err = validate_checkout_lines(&[line(Decimal::NEGATIVE_ONE)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTierQuantity { .. }));
    }

    #[test]
    fn test_checkout_rejects_missing_and_null_tier_quantity() {
        let missing = r#"{
            "id": "p-1", "productId": "p-1", "inventoryId": "p-1", "name": "Blue Dream",
            "unitPrice": "10", "quantity": 1, "availableInventory": "5"
        }"#;
        let null = r#"{
            "id": "p-1", "productId": "p-1", "inventoryId": "p-1", "name": "Blue Dream",
            "unitPrice": "10", "quantity": 1, "tierQuantity": null, "availableInventory": "5"
        }"#;

        for raw in [missing, null] {
            let restored: LineItem = serde_json::from_str(raw).unwrap();
            let err = validate_checkout_lines(&[restored]).unwrap_err();
            assert!(matches!(err, CoreError::InvalidTierQuantity { .. }));
        }
    }

    #[test]
    fn test_checkout_rejects_empty_cart() {
        assert!(matches!(
            validate_checkout_lines(&[]),
            Err(CoreError::EmptyCart)
        ));
    }
}
