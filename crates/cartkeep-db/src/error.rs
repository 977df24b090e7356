//! # Storage Error Types
//!
//! Error types for the key-value medium.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (this module) ← Adds context and categorization          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartError (cartkeep-sync)                                             │
//! │  ├── read failed  → StorageUnavailable                                 │
//! │  └── write failed → PersistenceFailed (+ in-memory rollback)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Key-value medium errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The medium could not be opened.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool closed during shutdown
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A read or write statement failed at runtime.
    ///
    /// ## When This Occurs
    /// - Disk full
    /// - Database locked longer than the busy timeout
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// The medium refused the operation (used by non-SQLite media).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Returns true if retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::PoolExhausted | StorageError::QueryFailed(_) | StorageError::Unavailable(_)
        )
    }
}

/// Convert sqlx errors to StorageError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → StorageError::QueryFailed
/// sqlx::Error::PoolTimedOut   → StorageError::PoolExhausted
/// sqlx::Error::PoolClosed     → StorageError::ConnectionFailed
/// Other                       → StorageError::Internal
/// ```
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StorageError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolTimedOut => StorageError::PoolExhausted,

            sqlx::Error::PoolClosed => StorageError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(io) => StorageError::QueryFailed(io.to_string()),

            _ => StorageError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
