//! # cartkeep-db: Key-Value Medium
//!
//! The persisted medium the cart is mirrored to. Everything above this crate
//! only sees the [`KeyValueStore`] trait: `get`, `set`, `remove` by string key.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        cartkeep Data Flow                               │
//! │                                                                         │
//! │  CartSync::apply(increment "A")                                        │
//! │       │ set("@GoMktPlace:Products", "[...]")                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cartkeep-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │  MemoryStore  │    │ SqliteStore  │  │   │
//! │  │   │    (trait)    │◄───│  RwLock<Map>  │    │  kv_store    │  │   │
//! │  │   │ get/set/remove│◄───┼───────────────┼────│  table       │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────┬───────┘  │   │
//! │  │                                                    │          │   │
//! │  │                              Database (pool.rs) ◄──┘          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - The medium trait and its memory / SQLite implementations
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartkeep_db::{Database, DbConfig, KeyValueStore};
//!
//! let db = Database::new(DbConfig::new("cart.db")).await?;
//! let kv = db.kv();
//! kv.set("greeting", "hello").await?;
//! assert_eq!(kv.get("greeting").await?.as_deref(), Some("hello"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StorageError, StorageResult};
pub use kv::memory::MemoryStore;
pub use kv::sqlite::SqliteStore;
pub use kv::KeyValueStore;
pub use pool::{Database, DbConfig};
