//! # Validation Module
//!
//! Input validation for cart candidates and decoded snapshots.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  addToCart(candidate)                                                  │
//! │  └── validate_candidate ── id non-blank, price finite and >= 0         │
//! │                                                                         │
//! │  snapshot::decode(text)                                                │
//! │  └── validate_items ────── per-line checks + unique ids + qty >= 1     │
//! │                                                                         │
//! │  increment / decrement need no validation: they only touch lines       │
//! │  that already passed one of the two gates above                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{LineItem, NewLineItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a line id.
///
/// ## Example
/// ```rust
/// use cartkeep_core::validation::validate_item_id;
///
/// assert!(validate_item_id("sku-42").is_ok());
/// assert!(validate_item_id("   ").is_err());
/// ```
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free items).
pub fn validate_unit_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::NegativeOrNotFinite {
            field: "unitPrice".to_string(),
        });
    }

    Ok(())
}

/// Validates a stored quantity.
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an `addToCart` candidate.
pub fn validate_candidate(candidate: &NewLineItem) -> ValidationResult<()> {
    validate_item_id(&candidate.id)?;
    validate_unit_price(candidate.unit_price)
}

/// Validates a full item sequence against every cart invariant.
pub fn validate_items(items: &[LineItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_item_id(&item.id)?;
        validate_unit_price(item.unit_price)?;
        validate_quantity(item.quantity)?;

        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: item.id.clone(),
            });
        }
    }

    Ok(())
}
