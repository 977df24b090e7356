//! # cartkeep-core: Pure Cart Logic
//!
//! This crate is the leaf of the cartkeep workspace. It owns the cart domain
//! types and every state transition as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        cartkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI Shell (external)                          │   │
//! │  │    Product list ──► addToCart ──► Cart screen (+ / -)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands / subscribe                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cartkeep-sync (CartSync)                     │   │
//! │  │         compute ──► persist ──► publish                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cartkeep-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   store   │  │ snapshot  │  │ validation│  │   │
//! │  │   │ LineItem  │  │ CartStore │  │  encode   │  │   rules   │  │   │
//! │  │   │ CartState │  │Transition │  │  decode   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, NewLineItem, CartState, CartOperation)
//! - [`store`] - CartStore and the add / increment / decrement transitions
//! - [`snapshot`] - JSON codec for the persisted snapshot
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use cartkeep_core::store::{add_to_cart, decrement, increment};
//! use cartkeep_core::{CartState, NewLineItem};
//!
//! let shoe = NewLineItem::new("A", "Shoe", "u", 10.0);
//!
//! let state = add_to_cart(&CartState::empty(), &shoe).unwrap();
//! let state = increment(&state, "A").unwrap();
//! assert_eq!(state.get("A").unwrap().quantity, 2);
//!
//! let state = decrement(&state, "A").unwrap();
//! let state = decrement(&state, "A").unwrap();
//! assert!(state.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, SnapshotError, ValidationError};
pub use store::{CartStore, Transition};
pub use types::{CartOperation, CartState, LineItem, NewLineItem};
