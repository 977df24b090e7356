//! # Key-Value Medium
//!
//! The contract every persisted medium satisfies.
//!
//! ## Guarantees Required From an Implementation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KeyValueStore Contract                               │
//! │                                                                         │
//! │  get(key)          → Ok(Some(value)) | Ok(None) | Err(StorageError)    │
//! │  set(key, value)   → Ok(()) only once the value is durable             │
//! │  remove(key)       → Ok(()) even if the key was absent                 │
//! │                                                                         │
//! │  • A set either fully replaces the value or leaves the old one         │
//! │  • A get never observes a partially written value                      │
//! │  • Errors are returned, never logged-and-dropped                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Media
//!
//! - [`memory::MemoryStore`] - process-local map, for tests and embedding
//! - [`sqlite::SqliteStore`] - `kv_store` table in a SQLite database

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Async string-keyed storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value atomically.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`. Absent keys are not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key).await
    }
}
