//! # cartkeep-sync: Cart Persistence Orchestration
//!
//! Bridges the pure [`cartkeep_core::CartStore`] to the persisted medium and
//! to state observers.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartSync Architecture                            │
//! │                                                                         │
//! │  UI shell                                                              │
//! │  ├── subscribe() ◄──────────────────── watch::Receiver<CartState>      │
//! │  └── add_to_cart / increment / decrement                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 CartSync (one Mutex around the cart)             │  │
//! │  │                                                                  │  │
//! │  │   Idle ──► Computing ──► Persisting ──┬──► Committed ──► publish │  │
//! │  │              │                        └──► RolledBack ──► Err    │  │
//! │  │              └── ItemNotFound / Validation ──► Err (no write)    │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ set(key, snapshot)                      │
//! │                               ▼                                         │
//! │                 KeyValueStore (cartkeep-db)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`sync`] - The `CartSync` orchestrator
//! - [`config`] - Storage key, database path, medium wait bound
//! - [`error`] - `CartError` and the UI-facing `ApiError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartkeep_sync::{CartSync, CartSyncConfig};
//! use cartkeep_core::NewLineItem;
//!
//! let config = CartSyncConfig::load_or_default(None);
//! let cart = CartSync::open(&config).await?;
//! cart.initialize().await?;
//!
//! let mut updates = cart.subscribe();
//! cart.add_to_cart(NewLineItem::new("A", "Shoe", "https://img/a.png", 10.0)).await?;
//! assert!(updates.has_changed()?);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartSyncConfig, StorageSettings, DEFAULT_STORAGE_KEY};
pub use error::{ApiError, CartError, CartResult, ErrorCode};
pub use sync::CartSync;
