//! # Cart Configuration
//!
//! Where the cart lives and how long a write may take.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CARTKEEP_STORAGE_KEY=@GoMktPlace:Products                          │
//! │     CARTKEEP_DB_PATH=/var/lib/cartkeep/cart.db                         │
//! │     CARTKEEP_PERSIST_TIMEOUT_MS=2000                                   │
//! │     CARTKEEP_MAX_CONNECTIONS=2                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cartkeep/cart.toml (Linux)                               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     key = "@GoMktPlace:Products", in-memory database, 5s timeout       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! key = "@GoMktPlace:Products"
//! database_path = "/var/lib/cartkeep/cart.db"
//! max_connections = 2
//! persist_timeout_ms = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use cartkeep_db::DbConfig;

use crate::error::{CartError, CartResult};

/// Key the cart snapshot is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMktPlace:Products";

// =============================================================================
// Storage Settings
// =============================================================================

/// Settings for the persisted medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key holding the cart snapshot.
    #[serde(default = "default_key")]
    pub key: String,

    /// SQLite file. `None` keeps the cart in an in-memory database.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Maximum pool connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long the medium may wait for a connection or a write lock before
    /// failing a snapshot write (milliseconds).
    #[serde(default = "default_persist_timeout")]
    pub persist_timeout_ms: u64,
}

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_connections() -> u32 {
    2
}

fn default_persist_timeout() -> u64 {
    5_000
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_key(),
            database_path: None,
            max_connections: default_max_connections(),
            persist_timeout_ms: default_persist_timeout(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSyncConfig {
    #[serde(default)]
    pub storage: StorageSettings,
}

impl CartSyncConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides_from(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(CartError::InvalidConfig("storage key must not be empty".into()));
        }

        if self.storage.persist_timeout_ms == 0 {
            return Err(CartError::InvalidConfig(
                "persist_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(CartError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// [`CartSyncConfig::load`]). Unparseable numbers are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("CARTKEEP_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(path) = lookup("CARTKEEP_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(ms) = lookup("CARTKEEP_PERSIST_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.storage.persist_timeout_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring unparseable CARTKEEP_PERSIST_TIMEOUT_MS"),
            }
        }

        if let Some(max) = lookup("CARTKEEP_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(max) => self.storage.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring unparseable CARTKEEP_MAX_CONNECTIONS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cartkeep", "cartkeep")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key.
    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }

    /// Returns the medium's wait bound for a snapshot write.
    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.persist_timeout_ms)
    }

    /// Pool settings for the configured medium.
    ///
    /// `max_connections` only applies to file databases; an in-memory
    /// database lives on exactly one connection. `persist_timeout` becomes the
    /// pool's acquire timeout and SQLite's busy timeout, so a slow write fails
    /// inside the medium rather than being abandoned mid-flight.
    pub fn db_config(&self) -> DbConfig {
        let config = match self.storage.database_path {
            Some(ref path) => DbConfig::new(path).max_connections(self.storage.max_connections),
            None => DbConfig::in_memory(),
        };
        config
            .acquire_timeout(self.persist_timeout())
            .busy_timeout(self.persist_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CartSyncConfig::default();
        assert_eq!(config.storage_key(), "@GoMktPlace:Products");
        assert_eq!(config.persist_timeout(), Duration::from_secs(5));
        assert!(config.db_config().is_in_memory());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CartSyncConfig::default();

        config.storage.key = "   ".into();
        assert!(matches!(config.validate(), Err(CartError::InvalidConfig(_))));

        config.storage.key = "cart".into();
        config.storage.persist_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.storage.persist_timeout_ms = 100;
        config.storage.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CARTKEEP_STORAGE_KEY", "shop:cart"),
            ("CARTKEEP_DB_PATH", "/tmp/cart.db"),
            ("CARTKEEP_PERSIST_TIMEOUT_MS", "250"),
            ("CARTKEEP_MAX_CONNECTIONS", "lots"),
        ]
        .into_iter()
        .collect();

        let mut config = CartSyncConfig::default();
        config.apply_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage_key(), "shop:cart");
        assert_eq!(config.storage.database_path, Some(PathBuf::from("/tmp/cart.db")));
        assert_eq!(config.persist_timeout(), Duration::from_millis(250));
        assert_eq!(config.db_config().busy_timeout, Duration::from_millis(250));
        assert_eq!(config.db_config().acquire_timeout, Duration::from_millis(250));
        assert_eq!(config.storage.max_connections, 2);
        assert!(!config.db_config().is_in_memory());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CartSyncConfig = toml::from_str("[storage]\nkey = \"other\"\n").unwrap();
        assert_eq!(config.storage_key(), "other");
        assert_eq!(config.storage.persist_timeout_ms, 5_000);
        assert_eq!(config.storage.database_path, None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.toml");

        let mut config = CartSyncConfig::default();
        config.storage.key = "saved".into();
        config.storage.database_path = Some(dir.path().join("cart.db"));
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: CartSyncConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }
}
