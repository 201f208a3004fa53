//! # Key-Value Repository
//!
//! SQLite-backed [`KvStore`]. Each key is one row of `kv_store`; writes are
//! upserts, so a value is always replaced wholesale.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_item("@gomarket", "[{...}]")                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)      │
//! │  ON CONFLICT(key) DO UPDATE SET value = excluded.value, ...             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Single statement → atomic per key (no torn records)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::store::KvStore;

/// Repository for key-value records.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.kv();
/// repo.set_item("@gomarket", "[]").await?;
/// let value = repo.get_item("@gomarket").await?;
/// ```
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Returns when `key` was last written, if it exists.
    pub async fn updated_at(&self, key: &str) -> DbResult<Option<DateTime<Utc>>> {
        let updated_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(updated_at)
    }

    /// Lists all stored keys in lexical order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}

#[async_trait]
impl KvStore for KvRepository {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "kv get");
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

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
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "kv set");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "kv remove");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, KvStore};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let db = test_db().await;
        assert_eq!(db.kv().get_item("@gomarket").await.unwrap(), None);
        assert_eq!(db.kv().updated_at("@gomarket").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_wholesale() {
        let db = test_db().await;
        let kv = db.kv();

        kv.set_item("@gomarket", r#"[{"id":"p1"}]"#).await.unwrap();
        kv.set_item("@gomarket", "[]").await.unwrap();

        assert_eq!(kv.get_item("@gomarket").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.keys().await.unwrap(), vec!["@gomarket".to_string()]);
        assert!(kv.updated_at("@gomarket").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let db = test_db().await;
        let kv = db.kv();

        kv.set_item("a", "1").await.unwrap();
        kv.remove_item("a").await.unwrap();
        kv.remove_item("a").await.unwrap();

        assert!(kv.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gomarket.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.kv().set_item("@gomarket", "[]").await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(
            db.kv().get_item("@gomarket").await.unwrap().as_deref(),
            Some("[]")
        );
    }
}
