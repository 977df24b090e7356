//! # SQLite Medium
//!
//! [`KeyValueStore`] over the `kv_store` table.
//!
//! ## Atomic Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set(key, value)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)     │
//! │  ON CONFLICT(key) DO UPDATE SET value = excluded.value, ...            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  One statement = one implicit transaction. A concurrent get sees the   │
//! │  old value or the new value, never a mix.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StorageResult;
use crate::kv::KeyValueStore;

/// SQLite-backed key-value medium.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a store over an already-migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    /// When `key` was last written, if it exists.
    pub async fn updated_at(&self, key: &str) -> StorageResult<Option<DateTime<Utc>>> {
        let updated_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(updated_at)
    }

    /// Lists stored keys in lexical order.
    pub async fn keys(&self) -> StorageResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        debug!(key, "Reading key");

        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        debug!(key, bytes = value.len(), "Writing key");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        debug!(key, "Removing key");

        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
