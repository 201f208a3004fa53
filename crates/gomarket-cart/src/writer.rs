//! # Persist Writer
//!
//! Background task that restores the cart on mount and mirrors every
//! committed cart to the key-value store, one write at a time, in commit
//! order.
//!
//! ## Writer Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    PersistWriter::run                                   │
//! │                                                                         │
//! │  1. LOAD                                                               │
//! │     get_item(key)                                                      │
//! │       ├── None ──────────────► Loaded(Empty)                           │
//! │       ├── valid JSON ────────► state = snapshot, Loaded(Restored)      │
//! │       ├── invalid JSON ──┬───► backup to <key>.corrupt, then           │
//! │       │                  ├───► reset: Loaded(Reset)                    │
//! │       │                  └───► fail:  Failed(CorruptSnapshot)          │
//! │       └── read error ────────► Failed(Storage)                         │
//! │                                                                         │
//! │  2. DRAIN (until Shutdown or every handle dropped)                     │
//! │                                                                         │
//! │     ┌──────────────────────────────────────────────────────────────┐   │
//! │     │ mpsc queue (FIFO, filled under the cart lock)                │   │
//! │     │                                                              │   │
//! │     │  Persist{r1} ─ Persist{r2} ─ Persist{r3} ─ Flush ─ Persist{r4}│   │
//! │     └──────────────────────────────────────────────────────────────┘   │
//! │          │                                                              │
//! │          ▼  coalescing on: r1..r3 collapse into one write of r3        │
//! │     set_item(key, json_r3) ──► persisted_revision = 3                  │
//! │     Flush ──► reply with the first write error since the last flush    │
//! │     set_item(key, json_r4) ──► persisted_revision = 4                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots are encoded by the mutating caller while it holds the cart
//! lock, so the queue order is the commit order and the last write to land
//! is always the newest cart.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use gomarket_core::Cart;
use gomarket_db::KvStore;

use crate::config::{CartConfig, CorruptPolicy};
use crate::error::{CartError, CartResult};

// =============================================================================
// Load Status
// =============================================================================

/// How the persisted record was turned into the initial cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No record was stored; the cart starts empty.
    Empty,

    /// The record was decoded and became the cart.
    Restored {
        /// Entries restored.
        items: usize,
        /// Entries dropped because an earlier entry had the same id.
        duplicates_dropped: usize,
    },

    /// The record was unreadable; it was copied to `backup_key` and the
    /// cart starts empty.
    Reset {
        /// Key the unreadable record was copied to.
        backup_key: String,
    },
}

/// Progress of the initial load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The store has not answered yet.
    Pending,

    /// The cart reflects the persisted record.
    Loaded(LoadOutcome),

    /// The record could not be used. The cart starts empty and the next
    /// mutation overwrites the record.
    Failed(CartError),
}

impl LoadStatus {
    /// Returns true once the load has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        !matches!(self, LoadStatus::Pending)
    }
}

// =============================================================================
// Write Commands
// =============================================================================

/// Work items for the writer.
#[derive(Debug)]
pub(crate) enum WriteCommand {
    /// Store the encoded cart committed at `revision`.
    Persist { revision: u64, json: String },

    /// Reply once every earlier command has been handled.
    Flush(oneshot::Sender<CartResult<()>>),

    /// Like `Flush`, then stop the writer.
    Shutdown(oneshot::Sender<CartResult<()>>),
}

/// Sending side of the writer, held by every cart handle.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<WriteCommand>,
    status: watch::Receiver<LoadStatus>,
    persisted_revision: Arc<AtomicU64>,
}

impl WriteQueue {
    /// Enqueues a snapshot. Never blocks, so it is safe under the cart lock.
    pub(crate) fn persist(&self, revision: u64, json: String) -> CartResult<()> {
        self.tx
            .send(WriteCommand::Persist { revision, json })
            .map_err(|_| CartError::ShuttingDown)
    }

    /// Waits until every snapshot enqueued so far has been written.
    ///
    /// Returns the first write error since the previous flush.
    pub async fn flush(&self) -> CartResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(reply_tx))
            .map_err(|_| CartError::ShuttingDown)?;

        reply_rx.await.map_err(|_| CartError::ShuttingDown)?
    }

    /// Enqueues the stop command and returns the reply channel.
    ///
    /// Split from waiting so the command can be enqueued under the cart lock.
    pub(crate) fn begin_shutdown(&self) -> CartResult<oneshot::Receiver<CartResult<()>>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Shutdown(reply_tx))
            .map_err(|_| CartError::ShuttingDown)?;

        Ok(reply_rx)
    }

    /// Returns a receiver for the load status.
    pub fn status(&self) -> watch::Receiver<LoadStatus> {
        self.status.clone()
    }

    /// Revision of the newest snapshot known to be in the store.
    pub fn persisted_revision(&self) -> u64 {
        self.persisted_revision.load(Ordering::Acquire)
    }
}

// =============================================================================
// Persist Writer
// =============================================================================

/// Restores and persists the cart.
pub struct PersistWriter {
    /// Backing store.
    store: Arc<dyn KvStore>,

    /// Key of the cart record.
    key: String,

    /// Key an unreadable record is copied to.
    backup_key: String,

    /// Collapse queued snapshots into the newest.
    coalesce: bool,

    /// What to do with an unreadable record.
    on_corrupt: CorruptPolicy,

    /// The live cart, replaced once by the load.
    state: Arc<watch::Sender<Cart>>,

    /// Publishes load progress.
    status: watch::Sender<LoadStatus>,

    /// Incoming commands.
    rx: mpsc::UnboundedReceiver<WriteCommand>,

    /// A non-persist command pulled off the queue while coalescing.
    pending: Option<WriteCommand>,

    /// First write failure since the last flush.
    last_error: Option<CartError>,

    /// Revision of the last successful write.
    persisted_revision: Arc<AtomicU64>,
}

impl PersistWriter {
    /// Creates a writer for `state` and returns the queue that feeds it.
    ///
    /// The writer holds no sender of its own: once every queue clone is
    /// dropped, `run` finishes.
    pub fn new(
        store: Arc<dyn KvStore>,
        config: &CartConfig,
        state: Arc<watch::Sender<Cart>>,
    ) -> (Self, WriteQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(LoadStatus::Pending);
        let persisted_revision = Arc::new(AtomicU64::new(0));

        let writer = PersistWriter {
            store,
            key: config.key().to_string(),
            backup_key: config.corrupt_backup_key(),
            coalesce: config.persistence.coalesce_writes,
            on_corrupt: config.persistence.on_corrupt,
            state,
            status: status_tx,
            rx,
            pending: None,
            last_error: None,
            persisted_revision: persisted_revision.clone(),
        };

        let queue = WriteQueue {
            tx,
            status: status_rx,
            persisted_revision,
        };

        (writer, queue)
    }

    /// Loads the record, then writes snapshots until shut down.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(key = %self.key, "Cart writer starting");

        let status = self.load().await;
        match &status {
            LoadStatus::Loaded(outcome) => info!(?outcome, "Cart loaded"),
            LoadStatus::Failed(e) => error!(error = %e, "Cart load failed, starting empty"),
            LoadStatus::Pending => {}
        }
        self.status.send_replace(status);

        while let Some(command) = self.next_command().await {
            match command {
                WriteCommand::Persist { revision, json } => {
                    let (revision, json) = if self.coalesce {
                        self.coalesce_from(revision, json)
                    } else {
                        (revision, json)
                    };
                    self.write(revision, &json).await;
                }
                WriteCommand::Flush(reply) => {
                    let _ = reply.send(self.take_result());
                }
                WriteCommand::Shutdown(reply) => {
                    info!("Cart writer shutting down");
                    let _ = reply.send(self.take_result());
                    break;
                }
            }
        }

        info!(
            persisted_revision = self.persisted_revision.load(Ordering::Acquire),
            "Cart writer stopped"
        );
    }

    /// Reads the record and turns it into the initial cart.
    async fn load(&self) -> LoadStatus {
        let raw = match self.store.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No stored cart");
                return LoadStatus::Loaded(LoadOutcome::Empty);
            }
            Err(e) => return LoadStatus::Failed(e.into()),
        };

        match Cart::from_json(&raw) {
            Ok((cart, report)) => {
                if report.duplicates_dropped > 0 {
                    warn!(
                        dropped = report.duplicates_dropped,
                        "Stored cart had duplicate entries"
                    );
                }
                self.state.send_replace(cart);
                LoadStatus::Loaded(LoadOutcome::Restored {
                    items: report.restored,
                    duplicates_dropped: report.duplicates_dropped,
                })
            }
            Err(e) => {
                let err = CartError::from(e);
                warn!(error = %err, backup_key = %self.backup_key, policy = %self.on_corrupt, "Stored cart unreadable");

                // The next mutation overwrites the record under either policy
                if let Err(e) = self.store.set_item(&self.backup_key, &raw).await {
                    warn!(error = %e, "Failed to back up unreadable cart");
                }

                match self.on_corrupt {
                    CorruptPolicy::Fail => LoadStatus::Failed(err),
                    CorruptPolicy::Reset => LoadStatus::Loaded(LoadOutcome::Reset {
                        backup_key: self.backup_key.clone(),
                    }),
                }
            }
        }
    }

    /// Returns the stashed command, or waits for the next one.
    async fn next_command(&mut self) -> Option<WriteCommand> {
        match self.pending.take() {
            Some(command) => Some(command),
            None => self.rx.recv().await,
        }
    }

    /// Skips ahead to the newest snapshot already queued behind this one.
    ///
    /// Stops at the first non-persist command so flush replies keep their
    /// position.
    fn coalesce_from(&mut self, mut revision: u64, mut json: String) -> (u64, String) {
        let mut skipped = 0usize;

        while let Ok(command) = self.rx.try_recv() {
            match command {
                WriteCommand::Persist {
                    revision: next,
                    json: next_json,
                } => {
                    revision = next;
                    json = next_json;
                    skipped += 1;
                }
                other => {
                    self.pending = Some(other);
                    break;
                }
            }
        }

        if skipped > 0 {
            debug!(skipped, revision, "Coalesced queued cart snapshots");
        }

        (revision, json)
    }

    async fn write(&mut self, revision: u64, json: &str) {
        match self.store.set_item(&self.key, json).await {
            Ok(()) => {
                self.persisted_revision.store(revision, Ordering::Release);
                debug!(revision, bytes = json.len(), "Cart persisted");
            }
            Err(e) => {
                warn!(revision, error = %e, "Failed to persist cart");
                if self.last_error.is_none() {
                    self.last_error = Some(e.into());
                }
            }
        }
    }

    fn take_result(&mut self) -> CartResult<()> {
        match self.last_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gomarket_core::{LineItem, Product};
    use gomarket_db::MemoryKvStore;

    fn writer_for(
        store: Arc<dyn KvStore>,
        config: &CartConfig,
    ) -> (PersistWriter, WriteQueue, Arc<watch::Sender<Cart>>) {
        let state = Arc::new(watch::Sender::new(Cart::new()));
        let (writer, queue) = PersistWriter::new(store, config, state.clone());
        (writer, queue, state)
    }

    #[test]
    fn test_load_status_settled() {
        assert!(!LoadStatus::Pending.is_settled());
        assert!(LoadStatus::Loaded(LoadOutcome::Empty).is_settled());
        assert!(LoadStatus::Failed(CartError::Storage("x".into())).is_settled());
    }

    #[tokio::test]
    async fn test_load_restores_state_before_status() {
        let json = r#"[{"id":"p2","title":"Mug","image_url":"","price":4.5,"quantity":3}]"#;
        let store = Arc::new(MemoryKvStore::with_item("@gomarket", json));
        let (writer, queue, state) = writer_for(store, &CartConfig::default());

        let task = tokio::spawn(writer.run());

        let mut status = queue.status();
        let settled = status.wait_for(LoadStatus::is_settled).await.unwrap().clone();
        assert_eq!(
            settled,
            LoadStatus::Loaded(LoadOutcome::Restored {
                items: 1,
                duplicates_dropped: 0
            })
        );
        assert_eq!(state.borrow().quantity_of("p2"), Some(3));

        drop(queue);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_coalesced_writes_land_newest() {
        let store = Arc::new(MemoryKvStore::new());
        let (mut writer, queue, _state) = writer_for(store.clone(), &CartConfig::default());

        let shirt = Product::new("p1", "Shirt", "", 10.0);
        let mut cart = Cart::new();
        for revision in 1..=3 {
            cart = cart.add_to_cart(&shirt).unwrap();
            queue.persist(revision, cart.to_json().unwrap()).unwrap();
        }

        let (revision, json) = match writer.rx.try_recv().unwrap() {
            WriteCommand::Persist { revision, json } => writer.coalesce_from(revision, json),
            other => panic!("unexpected command: {:?}", other),
        };
        assert_eq!(revision, 3);
        writer.write(revision, &json).await;

        let stored: Vec<LineItem> =
            serde_json::from_str(&store.get_item("@gomarket").await.unwrap().unwrap()).unwrap();
        assert_eq!(stored[0].quantity, 3);
        assert_eq!(queue.persisted_revision(), 3);
    }

    #[tokio::test]
    async fn test_coalescing_stops_at_flush() {
        let store = Arc::new(MemoryKvStore::new());
        let (mut writer, queue, _state) = writer_for(store, &CartConfig::default());

        queue.persist(1, "[]".into()).unwrap();
        let (reply_tx, _reply_rx) = oneshot::channel();
        queue.tx.send(WriteCommand::Flush(reply_tx)).unwrap();
        queue.persist(2, "[]".into()).unwrap();

        let _ = writer.rx.try_recv().unwrap();
        let (revision, _) = writer.coalesce_from(1, "[]".into());

        assert_eq!(revision, 1);
        assert!(matches!(writer.pending, Some(WriteCommand::Flush(_))));
    }

    #[tokio::test]
    async fn test_run_stops_when_queue_dropped() {
        let store = Arc::new(MemoryKvStore::new());
        let (writer, queue, _state) = writer_for(store, &CartConfig::default());

        let task = tokio::spawn(writer.run());
        queue.flush().await.unwrap();
        drop(queue);

        task.await.unwrap();
    }
}
