//! # Cart Provider
//!
//! Owns the authoritative in-memory cart and hands out [`CartHandle`]s to
//! the screens that read and change it.
//!
//! ## Mutation Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handle.add_to_cart(&product)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  wait for the initial load to settle                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────── cart lock (watch::Sender) ───────────────────┐   │
//! │  │  next = cart.add_to_cart(&product)                              │   │
//! │  │  next == cart?  ──► no-op, nothing notified or written          │   │
//! │  │  json = next.to_json()                                          │   │
//! │  │  queue.persist(revision + 1, json)                              │   │
//! │  │  cart = next                                                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  subscribers see `next`        PersistWriter stores `next`             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snapshot written is always the cart the mutation produced, and the
//! queue order matches the commit order, so the stored record never trails
//! or overtakes the in-memory cart once the queue drains.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use gomarket_core::{Cart, CartSummary, LineItem, Product};
use gomarket_db::KvStore;

use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::writer::{LoadOutcome, LoadStatus, PersistWriter, WriteQueue};

// =============================================================================
// Cart Provider
// =============================================================================

/// Entry point that wires a cart to its store.
pub struct CartProvider;

impl CartProvider {
    /// Mounts a cart backed by `store` and starts restoring it.
    ///
    /// Returns immediately with an empty cart; the persisted record replaces
    /// it once the load completes. Must be called inside a Tokio runtime.
    pub fn mount(store: Arc<dyn KvStore>, config: &CartConfig) -> CartHandle {
        let (writer, handle) = Self::build(store, config);
        tokio::spawn(writer.run());
        handle
    }

    /// Builds the handle and its writer without spawning anything.
    ///
    /// The caller is responsible for driving [`PersistWriter::run`].
    pub fn build(store: Arc<dyn KvStore>, config: &CartConfig) -> (PersistWriter, CartHandle) {
        let state = Arc::new(watch::Sender::new(Cart::new()));
        let (writer, queue) = PersistWriter::new(store, config, state.clone());

        info!(key = %config.key(), "Cart provider mounted");

        let handle = CartHandle {
            inner: Arc::new(Inner {
                state,
                queue,
                revision: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        };

        (writer, handle)
    }
}

// =============================================================================
// Cart Handle
// =============================================================================

struct Inner {
    state: Arc<watch::Sender<Cart>>,
    queue: WriteQueue,
    /// Number of committed mutations. Only advanced under the cart lock.
    revision: AtomicU64,
    closed: AtomicBool,
}

/// Shared access to the cart. Cheap to clone; every clone sees the same cart.
///
/// ## Usage
/// ```rust,ignore
/// let cart = use_cart(&ctx)?;
/// cart.add_to_cart(&product).await?;
/// cart.increment("p1").await?;
/// println!("{} items", cart.summary().total_quantity);
/// ```
#[derive(Clone)]
pub struct CartHandle {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartHandle")
            .field("items", &self.inner.state.borrow().len())
            .field("revision", &self.revision())
            .field("persisted_revision", &self.persisted_revision())
            .finish()
    }
}

impl CartHandle {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the current line items.
    pub fn products(&self) -> Vec<LineItem> {
        self.inner.state.borrow().items().to_vec()
    }

    /// Returns a copy of the current cart.
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().clone()
    }

    /// Returns display totals for the current cart.
    pub fn summary(&self) -> CartSummary {
        self.inner.state.borrow().summary()
    }

    /// Subscribes to cart changes. The receiver sees the load and every
    /// committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.state.subscribe()
    }

    /// Returns true once the initial load has finished.
    pub fn is_loaded(&self) -> bool {
        self.inner.queue.status().borrow().is_settled()
    }

    /// Waits for the initial load and reports how it went.
    ///
    /// A failed load is reported here only; the cart stays usable and starts
    /// empty.
    pub async fn ready(&self) -> CartResult<LoadOutcome> {
        let mut status = self.inner.queue.status();
        let status = status
            .wait_for(LoadStatus::is_settled)
            .await
            .map_err(|_| CartError::ShuttingDown)?
            .clone();

        match status {
            LoadStatus::Loaded(outcome) => Ok(outcome),
            LoadStatus::Failed(e) => Err(e),
            // wait_for only returns settled values
            LoadStatus::Pending => Err(CartError::ShuttingDown),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `product` to the cart.
    pub async fn add_to_cart(&self, product: &Product) -> CartResult<()> {
        debug!(product_id = %product.id, "add_to_cart");
        self.apply(|cart| Ok(cart.add_to_cart(product)?)).await
    }

    /// Adds one unit to the entry with `id`. Unknown ids are ignored.
    pub async fn increment(&self, id: &str) -> CartResult<()> {
        debug!(product_id = %id, "increment");
        self.apply(|cart| Ok(cart.increment(id))).await
    }

    /// Removes one unit from the entry with `id`, dropping it at zero.
    /// Unknown ids are ignored.
    pub async fn decrement(&self, id: &str) -> CartResult<()> {
        debug!(product_id = %id, "decrement");
        self.apply(|cart| Ok(cart.decrement(id))).await
    }

    /// Commits `transition` and enqueues the resulting snapshot.
    async fn apply<F>(&self, transition: F) -> CartResult<()>
    where
        F: FnOnce(&Cart) -> CartResult<Cart>,
    {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(CartError::ShuttingDown);
        }
        self.wait_for_load().await?;

        let inner = &self.inner;
        let mut outcome = Ok(());

        inner.state.send_if_modified(|cart| {
            if inner.closed.load(Ordering::Acquire) {
                outcome = Err(CartError::ShuttingDown);
                return false;
            }

            let next = match transition(cart) {
                Ok(next) => next,
                Err(e) => {
                    outcome = Err(e);
                    return false;
                }
            };

            if next == *cart {
                return false;
            }

            let json = match next.to_json() {
                Ok(json) => json,
                Err(e) => {
                    outcome = Err(CartError::Serialization(e.to_string()));
                    return false;
                }
            };

            let revision = inner.revision.load(Ordering::Acquire) + 1;
            if let Err(e) = inner.queue.persist(revision, json) {
                outcome = Err(e);
                return false;
            }

            inner.revision.store(revision, Ordering::Release);
            *cart = next;
            true
        });

        outcome
    }

    async fn wait_for_load(&self) -> CartResult<()> {
        let mut status = self.inner.queue.status();
        status
            .wait_for(LoadStatus::is_settled)
            .await
            .map_err(|_| CartError::ShuttingDown)?;
        Ok(())
    }

    // =========================================================================
    // Persistence Control
    // =========================================================================

    /// Waits until every committed mutation has been written.
    ///
    /// Returns the first write failure since the previous flush.
    pub async fn flush(&self) -> CartResult<()> {
        self.inner.queue.flush().await
    }

    /// Writes out pending snapshots and stops the writer.
    ///
    /// Later mutations fail with [`CartError::ShuttingDown`]. Calling this
    /// twice is harmless.
    pub async fn shutdown(&self) -> CartResult<()> {
        let inner = &self.inner;
        let mut reply = None;

        // Enqueue under the cart lock so no mutation can slip in behind it.
        inner.state.send_if_modified(|_| {
            if !inner.closed.swap(true, Ordering::AcqRel) {
                reply = Some(inner.queue.begin_shutdown());
            }
            false
        });

        match reply {
            None => Ok(()),
            Some(Err(CartError::ShuttingDown)) => Ok(()),
            Some(Err(e)) => Err(e),
            Some(Ok(rx)) => rx.await.map_err(|_| CartError::ShuttingDown)?,
        }
    }

    /// Number of committed mutations.
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    /// Revision of the newest cart known to be stored.
    pub fn persisted_revision(&self) -> u64 {
        self.inner.queue.persisted_revision()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorruptPolicy;
    use async_trait::async_trait;
    use gomarket_db::{DbError, DbResult, MemoryKvStore};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    const KEY: &str = "@gomarket";

    fn shirt() -> Product {
        Product::new("p1", "Shirt", "https://cdn.example/shirt.png", 10.0)
    }

    fn mug() -> Product {
        Product::new("p2", "Mug", "https://cdn.example/mug.png", 4.5)
    }

    fn strict_order() -> CartConfig {
        let mut config = CartConfig::default();
        config.persistence.coalesce_writes = false;
        config
    }

    async fn stored_items(store: &dyn KvStore) -> Vec<LineItem> {
        let raw = store.get_item(KEY).await.unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    async fn mounted(store: Arc<dyn KvStore>) -> CartHandle {
        let handle = CartProvider::mount(store, &CartConfig::default());
        handle.ready().await.unwrap();
        handle
    }

    /// Records every value written, in order.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryKvStore,
        writes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl KvStore for RecordingStore {
        async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
            self.writes.lock().unwrap().push(value.to_string());
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> DbResult<()> {
            self.inner.remove_item(key).await
        }
    }

    /// Reads succeed, writes fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl KvStore for ReadOnlyStore {
        async fn get_item(&self, _key: &str) -> DbResult<Option<String>> {
            Ok(None)
        }

        async fn set_item(&self, _key: &str, _value: &str) -> DbResult<()> {
            Err(DbError::Unavailable("read-only".into()))
        }

        async fn remove_item(&self, _key: &str) -> DbResult<()> {
            Ok(())
        }
    }

    /// Reads fail.
    struct UnreadableStore;

    #[async_trait]
    impl KvStore for UnreadableStore {
        async fn get_item(&self, _key: &str) -> DbResult<Option<String>> {
            Err(DbError::Unavailable("locked".into()))
        }

        async fn set_item(&self, _key: &str, _value: &str) -> DbResult<()> {
            Ok(())
        }

        async fn remove_item(&self, _key: &str) -> DbResult<()> {
            Ok(())
        }
    }

    /// Holds the first read until released.
    struct GatedStore {
        inner: MemoryKvStore,
        gate: Notify,
    }

    #[async_trait]
    impl KvStore for GatedStore {
        async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
            self.gate.notified().await;
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> DbResult<()> {
            self.inner.remove_item(key).await
        }
    }

    // =========================================================================
    // Transitions through the handle
    // =========================================================================

    #[tokio::test]
    async fn test_add_to_empty_cart() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store.clone()).await;

        cart.add_to_cart(&shirt()).await.unwrap();

        let products = cart.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "p1");
        assert_eq!(products[0].title, "Shirt");
        assert_eq!(products[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_add_existing_increases_quantity() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store).await;

        cart.add_to_cart(&shirt()).await.unwrap();
        cart.add_to_cart(&shirt()).await.unwrap();

        assert_eq!(cart.products().len(), 1);
        assert_eq!(cart.cart().quantity_of("p1"), Some(2));
    }

    #[tokio::test]
    async fn test_decrement_to_removal() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store.clone()).await;

        cart.add_to_cart(&shirt()).await.unwrap();
        cart.add_to_cart(&shirt()).await.unwrap();

        cart.decrement("p1").await.unwrap();
        assert_eq!(cart.cart().quantity_of("p1"), Some(1));

        cart.decrement("p1").await.unwrap();
        assert!(cart.products().is_empty());

        cart.flush().await.unwrap();
        assert!(stored_items(store.as_ref()).await.is_empty());
    }

    #[tokio::test]
    async fn test_increment_existing() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store).await;

        cart.add_to_cart(&shirt()).await.unwrap();
        cart.increment("p1").await.unwrap();

        assert_eq!(cart.cart().quantity_of("p1"), Some(2));
    }

    #[tokio::test]
    async fn test_mount_restores_persisted_record() {
        let json = r#"[{"id":"p2","title":"Mug","image_url":"","price":4.5,"quantity":3}]"#;
        let store = Arc::new(MemoryKvStore::with_item(KEY, json));

        let cart = CartProvider::mount(store, &CartConfig::default());
        let outcome = cart.ready().await.unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Restored {
                items: 1,
                duplicates_dropped: 0
            }
        );
        assert!(cart.is_loaded());
        assert_eq!(cart.products().len(), 1);
        assert_eq!(cart.products()[0].id, "p2");
        assert_eq!(cart.products()[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_mount_restores_record_with_only_id_and_quantity() {
        let store = Arc::new(MemoryKvStore::with_item(KEY, r#"[{"id":"p2","quantity":3}]"#));

        let cart = CartProvider::mount(store.clone(), &CartConfig::default());
        assert_eq!(
            cart.ready().await.unwrap(),
            LoadOutcome::Restored {
                items: 1,
                duplicates_dropped: 0
            }
        );
        assert_eq!(cart.cart().quantity_of("p2"), Some(3));
        assert_eq!(store.get_item("@gomarket.corrupt").await.unwrap(), None);

        cart.increment("p2").await.unwrap();
        cart.flush().await.unwrap();
        assert_eq!(stored_items(store.as_ref()).await[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_noops() {
        let store = Arc::new(RecordingStore::default());
        let cart = mounted(store.clone()).await;

        cart.increment("missing").await.unwrap();
        cart.decrement("missing").await.unwrap();
        cart.flush().await.unwrap();

        assert_eq!(cart.revision(), 0);
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_product_rejected() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store).await;

        let err = cart
            .add_to_cart(&Product::new("", "Ghost", "", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidProduct(_)));

        let err = cart
            .add_to_cart(&Product::new("p9", "Bad", "", f64::NAN))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidProduct(_)));

        assert!(cart.products().is_empty());
        assert_eq!(cart.revision(), 0);
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    #[tokio::test]
    async fn test_stored_record_matches_latest_cart() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store.clone()).await;

        cart.add_to_cart(&shirt()).await.unwrap();
        cart.flush().await.unwrap();
        assert_eq!(stored_items(store.as_ref()).await, cart.products());

        cart.add_to_cart(&mug()).await.unwrap();
        cart.increment("p1").await.unwrap();
        cart.flush().await.unwrap();

        assert_eq!(stored_items(store.as_ref()).await, cart.products());
        assert_eq!(cart.persisted_revision(), cart.revision());
    }

    #[tokio::test]
    async fn test_writes_follow_commit_order() {
        let store = Arc::new(RecordingStore::default());
        let cart = CartProvider::mount(store.clone(), &strict_order());
        cart.ready().await.unwrap();

        cart.add_to_cart(&shirt()).await.unwrap();
        cart.add_to_cart(&mug()).await.unwrap();
        cart.decrement("p1").await.unwrap();
        cart.flush().await.unwrap();

        let writes = store.writes.lock().unwrap().clone();
        let lengths: Vec<usize> = writes
            .iter()
            .map(|w| serde_json::from_str::<Vec<LineItem>>(w).unwrap().len())
            .collect();
        assert_eq!(lengths, vec![1, 2, 1]);
        assert_eq!(cart.persisted_revision(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_all_apply() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store.clone()).await;

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let cart = cart.clone();
            tasks.push(tokio::spawn(async move {
                cart.add_to_cart(&shirt()).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        cart.flush().await.unwrap();

        assert_eq!(cart.cart().quantity_of("p1"), Some(20));
        assert_eq!(cart.revision(), 20);
        assert_eq!(stored_items(store.as_ref()).await[0].quantity, 20);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_on_flush() {
        let cart = mounted(Arc::new(ReadOnlyStore)).await;

        cart.add_to_cart(&shirt()).await.unwrap();
        assert_eq!(cart.cart().quantity_of("p1"), Some(1));

        let err = cart.flush().await.unwrap_err();
        assert!(err.is_storage_error());
        assert_eq!(cart.persisted_revision(), 0);

        // Reported once
        cart.flush().await.unwrap();
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store).await;
        let mut rx = cart.subscribe();

        cart.add_to_cart(&shirt()).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().quantity_of("p1"), Some(1));
    }

    #[tokio::test]
    async fn test_cart_survives_remount() {
        use gomarket_db::{Database, DbConfig};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gomarket.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let cart = mounted(Arc::new(db.kv())).await;
        cart.add_to_cart(&shirt()).await.unwrap();
        cart.add_to_cart(&mug()).await.unwrap();
        cart.increment("p1").await.unwrap();
        let before = cart.products();
        cart.shutdown().await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let cart = CartProvider::mount(Arc::new(db.kv()), &CartConfig::default());
        assert_eq!(
            cart.ready().await.unwrap(),
            LoadOutcome::Restored {
                items: 2,
                duplicates_dropped: 0
            }
        );
        assert_eq!(cart.products(), before);
    }

    // =========================================================================
    // Load edge cases
    // =========================================================================

    #[tokio::test]
    async fn test_corrupt_record_reset() {
        let store = Arc::new(MemoryKvStore::with_item(KEY, "{not json"));
        let cart = CartProvider::mount(store.clone(), &CartConfig::default());

        let outcome = cart.ready().await.unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Reset {
                backup_key: "@gomarket.corrupt".into()
            }
        );
        assert!(cart.products().is_empty());
        assert_eq!(
            store.get_item("@gomarket.corrupt").await.unwrap().as_deref(),
            Some("{not json")
        );

        cart.add_to_cart(&shirt()).await.unwrap();
        cart.flush().await.unwrap();
        assert_eq!(stored_items(store.as_ref()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_fail_policy() {
        let store = Arc::new(MemoryKvStore::with_item(KEY, r#"[{"id":1}]"#));
        let mut config = CartConfig::default();
        config.persistence.on_corrupt = CorruptPolicy::Fail;

        let cart = CartProvider::mount(store.clone(), &config);
        let err = cart.ready().await.unwrap_err();
        assert!(matches!(err, CartError::CorruptSnapshot(_)));
        assert_eq!(
            store.get_item("@gomarket.corrupt").await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );

        // Still usable; the next write replaces the bad record
        cart.add_to_cart(&mug()).await.unwrap();
        cart.flush().await.unwrap();
        assert_eq!(stored_items(store.as_ref()).await[0].id, "p2");
    }

    #[tokio::test]
    async fn test_read_failure_reported() {
        let cart = CartProvider::mount(Arc::new(UnreadableStore), &CartConfig::default());

        let err = cart.ready().await.unwrap_err();
        assert_eq!(err, CartError::Storage("Storage unavailable: locked".into()));

        cart.add_to_cart(&shirt()).await.unwrap();
        assert_eq!(cart.products().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_entries_collapsed_on_load() {
        let json = r#"[
            {"id":"p1","title":"Shirt","image_url":"","price":10,"quantity":2},
            {"id":"p1","title":"Shirt","image_url":"","price":10,"quantity":5}
        ]"#;
        let store = Arc::new(MemoryKvStore::with_item(KEY, json));
        let cart = CartProvider::mount(store, &CartConfig::default());

        assert_eq!(
            cart.ready().await.unwrap(),
            LoadOutcome::Restored {
                items: 1,
                duplicates_dropped: 1
            }
        );
        assert_eq!(cart.cart().quantity_of("p1"), Some(2));
    }

    #[tokio::test]
    async fn test_mutation_before_load_applies_on_top() {
        let json = r#"[{"id":"p2","title":"Mug","image_url":"","price":4.5,"quantity":3}]"#;
        let store = Arc::new(GatedStore {
            inner: MemoryKvStore::with_item(KEY, json),
            gate: Notify::new(),
        });
        let cart = CartProvider::mount(store.clone(), &CartConfig::default());
        assert!(!cart.is_loaded());

        let early = {
            let cart = cart.clone();
            tokio::spawn(async move { cart.add_to_cart(&shirt()).await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(cart.products().is_empty());

        store.gate.notify_one();
        early.await.unwrap().unwrap();
        cart.flush().await.unwrap();

        let products = cart.products();
        assert_eq!(products.len(), 2);
        assert_eq!(cart.cart().quantity_of("p2"), Some(3));
        assert_eq!(cart.cart().quantity_of("p1"), Some(1));
        assert_eq!(stored_items(&store.inner).await, products);
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    #[tokio::test]
    async fn test_shutdown_flushes_and_rejects_later_mutations() {
        let store = Arc::new(MemoryKvStore::new());
        let cart = mounted(store.clone()).await;

        cart.add_to_cart(&shirt()).await.unwrap();
        cart.shutdown().await.unwrap();

        assert_eq!(stored_items(store.as_ref()).await.len(), 1);
        assert_eq!(
            cart.increment("p1").await.unwrap_err(),
            CartError::ShuttingDown
        );
        assert_eq!(cart.cart().quantity_of("p1"), Some(1));

        cart.shutdown().await.unwrap();
        assert_eq!(cart.flush().await.unwrap_err(), CartError::ShuttingDown);
    }
}
