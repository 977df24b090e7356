//! # Cart Error Types
//!
//! Errors returned by [`crate::CartSync`] and their UI-facing form.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Each Error Comes From                          │
//! │                                                                         │
//! │  CoreError::ItemNotFound ─────────► CartError::ItemNotFound            │
//! │  CoreError::Validation ───────────► CartError::Validation              │
//! │      (raised before any write; state untouched)                        │
//! │                                                                         │
//! │  StorageError on get ─────────────► CartError::StorageUnavailable      │
//! │  StorageError on set (incl. busy) ► CartError::PersistenceFailed       │
//! │      (in-memory state rolled back to the pre-operation value)          │
//! │                                                                         │
//! │  SnapshotError on decode ─────────► CartError::MalformedSnapshot       │
//! │      (initialize: logged, cart starts empty; read_persisted: returned) │
//! │                                                                         │
//! │  CartError ──► ApiError { code, message } ──► UI shell                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use cartkeep_core::{CoreError, SnapshotError, ValidationError};

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Every failure a CartSync caller can observe.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Cart Errors (synchronous, no write attempted)
    // =========================================================================
    /// increment / decrement referenced a line that is not in the cart.
    #[error("Item not found in cart: {0}")]
    ItemNotFound(String),

    /// Quantity counter would overflow.
    #[error("Quantity for {0} cannot grow any further")]
    QuantityOverflow(String),

    /// Candidate item failed validation.
    #[error("Invalid cart item: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// The persisted medium could not be read.
    #[error("Cart storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Writing the snapshot failed; the operation was rolled back.
    #[error("Failed to persist cart: {0}")]
    PersistenceFailed(String),

    /// Stored data exists but is not a valid cart snapshot.
    #[error("Stored cart snapshot is malformed: {0}")]
    MalformedSnapshot(#[from] SnapshotError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for CartError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => CartError::ItemNotFound(id),
            CoreError::QuantityOverflow(id) => CartError::QuantityOverflow(id),
            CoreError::Validation(e) => CartError::Validation(e),
        }
    }
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

impl CartError {
    /// True when the cart rejected the command itself (nothing was written).
    pub fn is_cart_error(&self) -> bool {
        matches!(
            self,
            CartError::ItemNotFound(_) | CartError::QuantityOverflow(_) | CartError::Validation(_)
        )
    }

    /// True when the persisted medium was at fault.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            CartError::StorageUnavailable(_) | CartError::PersistenceFailed(_)
        )
    }
}

// =============================================================================
// API Error (UI-facing)
// =============================================================================

/// Error shape handed to a UI shell.
///
/// ## Serialization
/// ```json
/// {
///   "code": "ITEM_NOT_FOUND",
///   "message": "Item not found in cart: A"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Line item not in cart
    ItemNotFound,

    /// Input validation failed
    ValidationError,

    /// Cart could not be read
    StorageUnavailable,

    /// Cart change could not be saved and was undone
    PersistenceFailed,

    /// Misconfiguration or other internal fault
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ItemNotFound(_) => ApiError::new(ErrorCode::ItemNotFound, err.to_string()),
            CartError::QuantityOverflow(_) | CartError::Validation(_) => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            CartError::StorageUnavailable(ref e) => {
                tracing::error!("Cart storage unavailable: {}", e);
                ApiError::new(ErrorCode::StorageUnavailable, "Cart could not be loaded")
            }
            CartError::PersistenceFailed(ref e) => {
                tracing::error!("Cart persistence failed: {}", e);
                ApiError::new(
                    ErrorCode::PersistenceFailed,
                    "Cart change could not be saved and was undone",
                )
            }
            CartError::MalformedSnapshot(ref e) => {
                tracing::warn!("Malformed cart snapshot: {}", e);
                ApiError::new(ErrorCode::StorageUnavailable, "Saved cart is unreadable")
            }
            CartError::InvalidConfig(_)
            | CartError::ConfigLoadFailed(_)
            | CartError::ConfigSaveFailed(_) => {
                ApiError::new(ErrorCode::Internal, err.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
