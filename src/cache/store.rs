//! Cache Store Module
//!
//! SQLite-backed key/value table with lazy TTL filtering on read and a
//! two-phase TTL+LRU sweep for space reclamation.

use std::str::FromStr;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::debug;

use crate::cache::codec::{self, CodecError};
use crate::cache::entry::{now_millis, CacheEntry};
use crate::cache::stats::{CacheStats, StatsSnapshot};

// == Store Error ==
/// Failures surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage is unavailable or rejected the operation
    #[error("storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),

    /// A stored blob could not be decoded; the row is left in place and
    /// an explicit delete is the only remediation
    #[error("corrupted cache entry for key '{key}': {source}")]
    Corrupted {
        key: String,
        #[source]
        source: CodecError,
    },
}

/// Row counts removed by one [`CacheStore::sweep`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Rows deleted because their TTL elapsed
    pub expired: u64,
    /// Rows deleted because the store exceeded the LRU capacity
    pub evicted: u64,
}

// == Cache Store ==
/// Durable cache table with per-entry expiry and last-access timestamps.
///
/// All persisted mutation goes through this type; nothing else touches the
/// `cache` table directly.
#[derive(Debug)]
pub struct CacheStore {
    pool: SqlitePool,
    default_ttl: Duration,
    lru_capacity: u32,
    stats: CacheStats,
}

impl CacheStore {
    // == Open ==
    /// Opens (creating if necessary) the cache table behind `database_url`.
    ///
    /// The pool is held to a single connection: a pooled `sqlite::memory:`
    /// database exists per connection, and the store assumes a single
    /// writer for file databases as well.
    pub async fn open(
        database_url: &str,
        default_ttl: Duration,
        lru_capacity: u32,
    ) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                expires_at INTEGER NOT NULL,
                last_accessed_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_cache_expires_at ON cache (expires_at)")
            .execute(&pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_cache_last_accessed_at ON cache (last_accessed_at)",
        )
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            default_ttl,
            lru_capacity,
            stats: CacheStats::new(),
        })
    }

    // == Get ==
    /// Looks up `key`, returning `None` when the key is absent or expired.
    ///
    /// On a hit the entry's `last_accessed_at` is refreshed in the same
    /// statement that checks freshness, so a stale entry is never returned
    /// even if no sweep has run yet. Expired entries are left for the sweep.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let now = now_millis();
        let row = sqlx::query(
            r#"
            UPDATE cache SET last_accessed_at = ?1
            WHERE key = ?2 AND expires_at > ?1
            RETURNING value
            "#,
        )
        .bind(now)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let blob: Vec<u8> = row.get("value");
                let value = codec::decode(&blob).map_err(|source| StoreError::Corrupted {
                    key: key.to_string(),
                    source,
                })?;
                self.stats.record_hit();
                Ok(Some(value))
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Peek ==
    /// Reads the raw row for `key` without expiry filtering and without
    /// refreshing the access time. Diagnostic companion to [`Self::get`].
    #[allow(dead_code)]
    pub async fn peek(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let entry = sqlx::query_as::<_, CacheEntry>(
            "SELECT key, value, expires_at, last_accessed_at FROM cache WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    // == Put ==
    /// Upserts `value` under `key`.
    ///
    /// An existing entry is replaced wholesale: value, expiry, and access
    /// time are all overwritten. `ttl` defaults to the configured TTL.
    pub async fn put<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let blob = codec::encode(value).map_err(|source| StoreError::Corrupted {
            key: key.to_string(),
            source,
        })?;
        let now = now_millis();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = now + ttl.as_millis() as i64;

        sqlx::query(
            r#"
            INSERT INTO cache (key, value, expires_at, last_accessed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                last_accessed_at = excluded.last_accessed_at
            "#,
        )
        .bind(key)
        .bind(blob)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // == Delete ==
    /// Removes `key` if present; deleting a missing key is a no-op.
    /// The explicit remediation path for poisoned entries.
    #[allow(dead_code)]
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cache WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // == Sweep ==
    /// Two-phase maintenance pass, run in one transaction so concurrent
    /// reads and writes observe either pre-sweep or post-sweep state:
    ///
    /// 1. delete every row whose `expires_at` has passed;
    /// 2. if an LRU capacity is configured, keep only the capacity
    ///    most-recently-accessed rows (ties broken by `key` so the result
    ///    is deterministic).
    pub async fn sweep(&self) -> Result<SweepOutcome, StoreError> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let expired = sqlx::query("DELETE FROM cache WHERE expires_at <= ?1")
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let evicted = if self.lru_capacity > 0 {
            sqlx::query(
                r#"
                DELETE FROM cache WHERE key IN (
                    SELECT key FROM cache
                    ORDER BY last_accessed_at DESC, key ASC
                    LIMIT -1 OFFSET ?1
                )
                "#,
            )
            .bind(i64::from(self.lru_capacity))
            .execute(&mut *tx)
            .await?
            .rows_affected()
        } else {
            0
        };

        tx.commit().await?;

        self.stats.record_evictions(expired + evicted);
        debug!(expired, evicted, "sweep complete");
        Ok(SweepOutcome { expired, evicted })
    }

    // == Length ==
    /// Returns the current number of rows, expired ones included.
    pub async fn len(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cache")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    // == Stats ==
    /// Returns a snapshot of the hit/miss/eviction counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // == Close ==
    /// Closes the underlying pool. The eviction task must be stopped first
    /// so no sweep runs against a closed store.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
