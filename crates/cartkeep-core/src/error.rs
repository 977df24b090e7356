//! # Error Types
//!
//! Domain-specific error types for cartkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cartkeep-core errors (this file)                                      │
//! │  ├── CoreError        - Cart transition failures                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── SnapshotError    - Snapshot encode / decode failures              │
//! │                                                                         │
//! │  cartkeep-db errors (separate crate)                                   │
//! │  └── StorageError     - Key-value medium failures                      │
//! │                                                                         │
//! │  cartkeep-sync errors                                                  │
//! │  ├── CartError        - What CartSync callers see                      │
//! │  └── ApiError         - What a UI shell sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → ApiError → UI         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart transition errors.
///
/// Raised synchronously by the pure transitions in [`crate::store`]. The cart
/// state is never changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No line item with this id is in the cart.
    ///
    /// ## When This Occurs
    /// - `increment` or `decrement` for an id the user never added
    /// - A UI holding a stale list after the item was decremented away
    #[error("Item not found in cart: {0}")]
    ItemNotFound(String),

    /// Incrementing would overflow the quantity counter.
    #[error("Quantity for {0} cannot grow any further")]
    QuantityOverflow(String),

    /// Candidate item failed validation (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value must be finite and non-negative.
    #[error("{field} must be a finite, non-negative number")]
    NegativeOrNotFinite { field: String },

    /// Value must be at least one.
    #[error("{field} must be at least 1")]
    MustBePositive { field: String },

    /// Duplicate value where uniqueness is required.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Snapshot Error
// =============================================================================

/// Errors produced by the snapshot codec.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Stored text is not a JSON array of line items.
    #[error("Snapshot does not parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Stored text parses but breaks a cart invariant.
    #[error("Snapshot violates cart invariants: {0}")]
    Invalid(#[from] ValidationError),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
