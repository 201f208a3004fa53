//! # Key-Value Store
//!
//! The persistence seam of the cart: a string-keyed store of opaque string
//! values, shaped after the mobile platform's async local storage.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         KvStore                                         │
//! │                 get_item / set_item / remove_item                       │
//! │                              │                                          │
//! │            ┌─────────────────┴─────────────────┐                        │
//! │            ▼                                   ▼                        │
//! │  ┌──────────────────────┐          ┌──────────────────────┐             │
//! │  │   KvRepository       │          │   MemoryKvStore      │             │
//! │  │   (SQLite, durable)  │          │   (process memory)   │             │
//! │  └──────────────────────┘          └──────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::DbResult;

/// Abstraction over key-value storage backends.
///
/// Values are overwritten wholesale by `set_item`; there are no partial
/// updates and no transactions across keys.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get_item(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> DbResult<()>;

    /// Removes `key`. Succeeds even if the key does not exist.
    async fn remove_item(&self, key: &str) -> DbResult<()>;
}

/// A store that keeps everything in process memory.
///
/// Used by tests and by hosts that do not want the cart to survive restarts.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one record.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        MemoryKvStore {
            entries: Mutex::new(entries),
        }
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Checks whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
