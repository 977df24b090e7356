//! # CartSync
//!
//! Owns the canonical [`CartStore`], mirrors every committed state to one key
//! of a [`KeyValueStore`], and publishes committed states to observers.
//!
//! ## Write-Through Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     apply(operation), lock held throughout              │
//! │                                                                         │
//! │  Idle                                                                  │
//! │   │  lock cart                                                         │
//! │   ▼                                                                     │
//! │  Computing ── store.stage(op) ──► Err(ItemNotFound / Validation)       │
//! │   │                               (no write, state untouched)          │
//! │   ▼                                                                     │
//! │  Persisting ── encode(next) ──► set(key, json)                         │
//! │   │                                                                     │
//! │   ├── Ok ──► Committed:  store.commit, watch.send_replace(next)        │
//! │   │                                                                     │
//! │   └── Err ──► RolledBack: store.rollback,                              │
//! │                          Err(PersistenceFailed), observers untouched   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Observers therefore only ever see states that reached the medium. The write
//! is always awaited to completion: the medium bounds it (SQLite busy and
//! acquire timeouts) and reports expiry as an error, so a rollback is only
//! taken for a write that is known not to have landed.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use cartkeep_core::{snapshot, CartOperation, CartState, CartStore, NewLineItem};
use cartkeep_db::{Database, KeyValueStore};

use crate::config::CartSyncConfig;
use crate::error::{CartError, CartResult};

/// Cart plus the flag recording whether the snapshot has been read.
#[derive(Debug, Default)]
struct Inner {
    store: CartStore,
    initialized: bool,
}

/// Persistent, observable cart.
pub struct CartSync {
    storage: Arc<dyn KeyValueStore>,
    key: String,

    /// Serializes every apply from stage to commit/rollback.
    inner: Mutex<Inner>,

    /// Last committed state.
    state_tx: watch::Sender<CartState>,

    /// Held when the medium was opened by [`CartSync::open`].
    database: Option<Database>,
}

impl std::fmt::Debug for CartSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSync")
            .field("key", &self.key)
            .field("items", &self.state_tx.borrow().len())
            .finish_non_exhaustive()
    }
}

impl CartSync {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates a cart over any medium. Nothing is read until
    /// [`CartSync::initialize`] or the first command.
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &CartSyncConfig) -> Self {
        let (state_tx, _) = watch::channel(CartState::empty());
        CartSync {
            storage,
            key: config.storage_key().to_string(),
            inner: Mutex::new(Inner::default()),
            state_tx,
            database: None,
        }
    }

    /// Opens the SQLite medium described by `config` and builds a cart on it.
    pub async fn open(config: &CartSyncConfig) -> CartResult<Self> {
        config.validate()?;

        let database = Database::new(config.db_config())
            .await
            .map_err(|e| CartError::StorageUnavailable(e.to_string()))?;

        let mut cart = CartSync::new(Arc::new(database.kv()), config);
        cart.database = Some(database);

        info!(key = %cart.key, "Cart storage opened");
        Ok(cart)
    }

    /// Closes the underlying pool, if this cart opened one.
    pub async fn close(&self) {
        if let Some(ref database) = self.database {
            database.close().await;
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Seeds the cart from the persisted snapshot.
    ///
    /// An absent or malformed snapshot starts an empty cart. A failed read
    /// returns [`CartError::StorageUnavailable`] and may be retried. Once
    /// loaded, later calls return the current state without reading again.
    pub async fn initialize(&self) -> CartResult<CartState> {
        let mut inner = self.inner.lock().await;
        self.ensure_initialized(&mut inner).await?;
        Ok(inner.store.current().clone())
    }

    async fn ensure_initialized(&self, inner: &mut Inner) -> CartResult<()> {
        if inner.initialized {
            return Ok(());
        }

        let raw = self.storage.get(&self.key).await.map_err(|e| {
            error!(key = %self.key, error = %e, "Failed to read cart snapshot");
            CartError::StorageUnavailable(e.to_string())
        })?;

        let state = match raw {
            None => {
                debug!(key = %self.key, "No saved cart");
                CartState::empty()
            }
            Some(text) => match snapshot::decode(&text) {
                Ok(state) => state,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Ignoring malformed cart snapshot");
                    CartState::empty()
                }
            },
        };

        info!(
            items = state.len(),
            quantity = state.total_quantity(),
            "Cart loaded"
        );

        inner.store.replace(state.clone());
        inner.initialized = true;
        self.state_tx.send_replace(state);
        Ok(())
    }

    /// Reads the persisted snapshot without touching the in-memory cart.
    ///
    /// Unlike [`CartSync::initialize`], a malformed snapshot is an error here.
    pub async fn read_persisted(&self) -> CartResult<Option<CartState>> {
        let raw = self
            .storage
            .get(&self.key)
            .await
            .map_err(|e| CartError::StorageUnavailable(e.to_string()))?;

        match raw {
            None => Ok(None),
            Some(text) => Ok(Some(snapshot::decode(&text)?)),
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Applies one operation and persists the result before publishing it.
    pub async fn apply(&self, op: CartOperation) -> CartResult<CartState> {
        let mut inner = self.inner.lock().await;
        self.ensure_initialized(&mut inner).await?;

        let transition = inner.store.stage(&op).map_err(|e| {
            debug!(operation = op.name(), id = op.target_id(), error = %e, "Cart operation rejected");
            CartError::from(e)
        })?;

        match self.persist(transition.next()).await {
            Ok(()) => {
                let operation = transition.operation();
                let state = inner.store.commit(transition);
                debug!(
                    operation,
                    id = op.target_id(),
                    items = state.len(),
                    "Cart operation committed"
                );
                self.state_tx.send_replace(state.clone());
                Ok(state)
            }
            Err(e) => {
                let operation = transition.operation();
                inner.store.rollback(transition);
                warn!(operation, id = op.target_id(), error = %e, "Cart operation rolled back");
                Err(e)
            }
        }
    }

    /// Adds a product, or bumps its quantity when it is already in the cart.
    pub async fn add_to_cart(&self, item: NewLineItem) -> CartResult<CartState> {
        self.apply(CartOperation::AddToCart { item }).await
    }

    /// Raises a line's quantity by one.
    pub async fn increment(&self, id: impl Into<String>) -> CartResult<CartState> {
        self.apply(CartOperation::Increment { id: id.into() }).await
    }

    /// Lowers a line's quantity by one, removing it at zero.
    pub async fn decrement(&self, id: impl Into<String>) -> CartResult<CartState> {
        self.apply(CartOperation::Decrement { id: id.into() }).await
    }

    async fn persist(&self, state: &CartState) -> CartResult<()> {
        let json = snapshot::encode(state)
            .map_err(|e| CartError::PersistenceFailed(e.to_string()))?;

        self.storage
            .set(&self.key, &json)
            .await
            .map_err(|e| CartError::PersistenceFailed(e.to_string()))
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// The last committed state.
    pub fn current(&self) -> CartState {
        self.state_tx.borrow().clone()
    }

    /// Receiver of committed states; it starts at the current one.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state_tx.subscribe()
    }

    /// Key the snapshot is stored under.
    pub fn storage_key(&self) -> &str {
        &self.key
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_STORAGE_KEY;
    use crate::testing::{init_test_tracing, FlakyStore};
    use cartkeep_db::MemoryStore;
    use std::time::Duration;

    fn shoe() -> NewLineItem {
        NewLineItem::new("A", "Shoe", "https://img/a.png", 10.0)
    }

    fn quantities(state: &CartState) -> Vec<(String, u32)> {
        state
            .items()
            .iter()
            .map(|item| (item.id.clone(), item.quantity))
            .collect()
    }

    fn cart_over(storage: Arc<FlakyStore>) -> CartSync {
        init_test_tracing();
        CartSync::new(storage, &CartSyncConfig::default())
    }

    async fn persisted(storage: &FlakyStore) -> Option<String> {
        storage.get(DEFAULT_STORAGE_KEY).await.unwrap()
    }

    #[tokio::test]
    async fn test_shoe_scenario_is_mirrored() {
        let storage = Arc::new(FlakyStore::new());
        let cart = cart_over(storage.clone());
        assert!(cart.initialize().await.unwrap().is_empty());

        cart.add_to_cart(shoe()).await.unwrap();
        cart.add_to_cart(shoe()).await.unwrap();
        let state = cart.increment("A").await.unwrap();
        assert_eq!(quantities(&state), vec![("A".to_string(), 3)]);

        let mirrored = snapshot::decode(&persisted(&storage).await.unwrap()).unwrap();
        assert_eq!(mirrored, state);

        for _ in 0..3 {
            cart.decrement("A").await.unwrap();
        }
        assert!(cart.current().is_empty());
        assert_eq!(persisted(&storage).await.as_deref(), Some("[]"));
        assert_eq!(storage.writes(), 6);
    }

    #[tokio::test]
    async fn test_write_failure_rolls_back() {
        let storage = Arc::new(FlakyStore::new());
        let cart = cart_over(storage.clone());
        cart.add_to_cart(shoe()).await.unwrap();
        let before = persisted(&storage).await;

        let mut updates = cart.subscribe();
        storage.fail_writes(true);

        let err = cart.increment("A").await.unwrap_err();
        assert!(matches!(err, CartError::PersistenceFailed(_)));
        assert_eq!(quantities(&cart.current()), vec![("A".to_string(), 1)]);
        assert_eq!(persisted(&storage).await, before);
        assert!(!updates.has_changed().unwrap());

        storage.fail_writes(false);
        let state = cart.increment("A").await.unwrap();
        assert_eq!(quantities(&state), vec![("A".to_string(), 2)]);
        assert!(updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_slow_write_commits_and_matches_storage() {
        init_test_tracing();
        let storage = Arc::new(FlakyStore::new());
        let mut config = CartSyncConfig::default();
        config.storage.persist_timeout_ms = 20;
        let cart = CartSync::new(storage.clone(), &config);

        storage.delay_writes(Duration::from_millis(60));
        let state = cart.add_to_cart(shoe()).await.unwrap();
        assert_eq!(quantities(&state), vec![("A".to_string(), 1)]);
        assert_eq!(storage.writes(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let mirrored = snapshot::decode(&persisted(&storage).await.unwrap()).unwrap();
        assert_eq!(mirrored, cart.current());

        let restarted = CartSync::new(storage.clone(), &config);
        assert_eq!(restarted.initialize().await.unwrap(), cart.current());
    }

    #[tokio::test]
    async fn test_medium_timeout_rolls_back_without_landing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CartSyncConfig::default();
        config.storage.database_path = Some(dir.path().join("cart.db"));
        config.storage.persist_timeout_ms = 50;

        let cart = CartSync::open(&config).await.unwrap();
        cart.add_to_cart(shoe()).await.unwrap();

        // Hold the write lock from another connection so the UPSERT exceeds
        // busy_timeout.
        let blocker = Database::new(config.db_config()).await.unwrap();
        let mut conn = blocker.pool().acquire().await.unwrap();
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await.unwrap();

        let err = cart.increment("A").await.unwrap_err();
        assert!(matches!(err, CartError::PersistenceFailed(_)));
        assert_eq!(quantities(&cart.current()), vec![("A".to_string(), 1)]);

        sqlx::query("ROLLBACK").execute(&mut *conn).await.unwrap();
        drop(conn);
        blocker.close().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mirrored = cart.read_persisted().await.unwrap().unwrap();
        assert_eq!(mirrored, cart.current());
        cart.close().await;

        let restarted = CartSync::open(&config).await.unwrap();
        let state = restarted.initialize().await.unwrap();
        assert_eq!(quantities(&state), vec![("A".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_missing_item_writes_nothing() {
        let storage = Arc::new(FlakyStore::new());
        let cart = cart_over(storage.clone());

        let err = cart.increment("ghost").await.unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(ref id) if id == "ghost"));
        assert!(matches!(
            cart.decrement("ghost").await,
            Err(CartError::ItemNotFound(_))
        ));
        assert_eq!(storage.writes(), 0);
        assert_eq!(persisted(&storage).await, None);
    }

    #[tokio::test]
    async fn test_invalid_candidate_writes_nothing() {
        let storage = Arc::new(FlakyStore::new());
        let cart = cart_over(storage.clone());

        let bad = NewLineItem::new("A", "Shoe", "u", -1.0);
        assert!(matches!(
            cart.add_to_cart(bad).await,
            Err(CartError::Validation(_))
        ));
        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn test_malformed_snapshot_starts_empty() {
        let storage = Arc::new(FlakyStore::with_value(DEFAULT_STORAGE_KEY, "{not valid json"));
        let cart = cart_over(storage.clone());

        assert!(cart.initialize().await.unwrap().is_empty());
        assert!(matches!(
            cart.read_persisted().await,
            Err(CartError::MalformedSnapshot(_))
        ));

        cart.add_to_cart(shoe()).await.unwrap();
        let reread = cart.read_persisted().await.unwrap().unwrap();
        assert_eq!(quantities(&reread), vec![("A".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_legacy_snapshot_is_loaded() {
        let legacy = r#"[{"id":"7","title":"Boot","image_url":"u","price":99.9,"quantity":2}]"#;
        let storage = Arc::new(FlakyStore::with_value(DEFAULT_STORAGE_KEY, legacy));
        let cart = cart_over(storage.clone());

        let state = cart.initialize().await.unwrap();
        assert_eq!(quantities(&state), vec![("7".to_string(), 2)]);
        assert_eq!(state.get("7").unwrap().unit_price, 99.9);

        cart.increment("7").await.unwrap();
        let rewritten = persisted(&storage).await.unwrap();
        assert!(rewritten.contains("\"unitPrice\""));
        assert!(!rewritten.contains("image_url"));
    }

    #[tokio::test]
    async fn test_read_failure_is_retryable() {
        let storage = Arc::new(FlakyStore::with_value(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"A","title":"Shoe","imageUrl":"u","unitPrice":10,"quantity":4}]"#,
        ));
        let cart = cart_over(storage.clone());

        storage.fail_reads(true);
        assert!(matches!(
            cart.initialize().await,
            Err(CartError::StorageUnavailable(_))
        ));
        assert!(matches!(
            cart.increment("A").await,
            Err(CartError::StorageUnavailable(_))
        ));
        assert_eq!(storage.writes(), 0);

        storage.fail_reads(false);
        let state = cart.initialize().await.unwrap();
        assert_eq!(quantities(&state), vec![("A".to_string(), 4)]);
    }

    #[tokio::test]
    async fn test_initialize_reads_once() {
        let storage = Arc::new(FlakyStore::new());
        let cart = cart_over(storage.clone());
        cart.initialize().await.unwrap();
        cart.add_to_cart(shoe()).await.unwrap();

        storage.fail_reads(true);
        let state = cart.initialize().await.unwrap();
        assert_eq!(quantities(&state), vec![("A".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_apply_initializes_lazily() {
        let storage = Arc::new(FlakyStore::with_value(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"A","title":"Shoe","imageUrl":"u","unitPrice":10,"quantity":1}]"#,
        ));
        let cart = cart_over(storage);

        let state = cart.add_to_cart(shoe()).await.unwrap();
        assert_eq!(quantities(&state), vec![("A".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_subscribers_see_committed_states() {
        let cart = cart_over(Arc::new(FlakyStore::new()));
        cart.initialize().await.unwrap();

        let mut updates = cart.subscribe();
        assert!(updates.borrow().is_empty());
        assert!(!updates.has_changed().unwrap());

        cart.add_to_cart(shoe()).await.unwrap();
        updates.changed().await.unwrap();
        assert_eq!(quantities(&updates.borrow_and_update()), vec![("A".to_string(), 1)]);

        let _ = cart.increment("missing").await;
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_commands_are_serialized() {
        let storage = Arc::new(FlakyStore::new());
        let cart = Arc::new(cart_over(storage.clone()));
        cart.add_to_cart(shoe()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let cart = Arc::clone(&cart);
            handles.push(tokio::spawn(async move { cart.increment("A").await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(cart.current().get("A").unwrap().quantity, 51);
        let mirrored = cart.read_persisted().await.unwrap().unwrap();
        assert_eq!(mirrored.get("A").unwrap().quantity, 51);
    }

    #[tokio::test]
    async fn test_custom_key() {
        let storage = Arc::new(MemoryStore::new());
        let mut config = CartSyncConfig::default();
        config.storage.key = "shop:cart".into();
        let cart = CartSync::new(storage.clone(), &config);

        cart.add_to_cart(shoe()).await.unwrap();
        assert_eq!(cart.storage_key(), "shop:cart");
        assert!(storage.get("shop:cart").await.unwrap().is_some());
        assert_eq!(storage.get(DEFAULT_STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_cart_survives_restart() {
        init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        let mut config = CartSyncConfig::default();
        config.storage.database_path = Some(dir.path().join("cart.db"));

        {
            let cart = CartSync::open(&config).await.unwrap();
            cart.initialize().await.unwrap();
            cart.add_to_cart(shoe()).await.unwrap();
            cart.add_to_cart(NewLineItem::new("B", "Sock", "u", 2.5)).await.unwrap();
            cart.increment("A").await.unwrap();
            cart.close().await;
        }

        let cart = CartSync::open(&config).await.unwrap();
        let state = cart.initialize().await.unwrap();
        assert_eq!(
            quantities(&state),
            vec![("A".to_string(), 2), ("B".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        let mut config = CartSyncConfig::default();
        config.storage.key = String::new();
        assert!(matches!(
            CartSync::open(&config).await,
            Err(CartError::InvalidConfig(_))
        ));
    }
}
