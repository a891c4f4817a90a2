//! Embedded local cache backend: an on-disk SQLite KV table behind a bounded
//! concurrency gate, grounded on the teacher's `db.rs` search-cache table
//! (same r2d2 pool pattern, generalized from one hardcoded table into a
//! generic namespaced blob store used by all three cache namespaces).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::cache::CachePort;
use crate::error::{Error, Result};

pub struct SqliteCache {
    pool: Pool<SqliteConnectionManager>,
    /// Bounded concurrency gate: rusqlite connections serialize internally,
    /// so fan-out beyond the pool size just queues on lock contention.
    gate: Arc<Semaphore>,
}

impl SqliteCache {
    pub fn open<P: AsRef<Path>>(path: P, max_concurrency: usize) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::new(manager).map_err(|e| Error::CacheUnavailable(e.to_string()))?;

        let conn = pool.get().map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS cache_kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                expires_at DATETIME NOT NULL
            )",
            [],
        )
        .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cache_kv_expires ON cache_kv(expires_at)",
            [],
        )
        .ok();

        Ok(Self { pool, gate: Arc::new(Semaphore::new(max_concurrency.max(1))) })
    }
}

#[async_trait]
impl CachePort for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let _permit = self.gate.acquire().await.map_err(|_| Error::Cancelled)?;
        let pool = self.pool.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| Error::CacheUnavailable(e.to_string()))?;
            conn.query_row(
                "SELECT value FROM cache_kv WHERE key = ?1 AND expires_at > ?2",
                params![key, Utc::now()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(|e| Error::CacheUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| Error::CacheUnavailable(e.to_string()))?
    }

    async fn set(&self, key: &str, value: &[u8], ttl_secs: i64) -> Result<()> {
        let _permit = self.gate.acquire().await.map_err(|_| Error::Cancelled)?;
        let pool = self.pool.clone();
        let key = key.to_string();
        let value = value.to_vec();
        let expires_at: DateTime<Utc> = Utc::now() + chrono::Duration::seconds(ttl_secs);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| Error::CacheUnavailable(e.to_string()))?;
            conn.execute(
                "INSERT OR REPLACE INTO cache_kv (key, value, expires_at) VALUES (?1, ?2, ?3)",
                params![key, value, expires_at],
            )
            .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| Error::CacheUnavailable(e.to_string()))?
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _permit = self.gate.acquire().await.map_err(|_| Error::Cancelled)?;
        let pool = self.pool.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| Error::CacheUnavailable(e.to_string()))?;
            conn.execute("DELETE FROM cache_kv WHERE key = ?1", params![key])
                .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| Error::CacheUnavailable(e.to_string()))?
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn clear(&self, prefix: Option<&str>) -> Result<usize> {
        let _permit = self.gate.acquire().await.map_err(|_| Error::Cancelled)?;
        let pool = self.pool.clone();
        let prefix = prefix.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| Error::CacheUnavailable(e.to_string()))?;
            let deleted = match prefix {
                Some(p) => conn
                    .execute("DELETE FROM cache_kv WHERE key LIKE ?1", params![format!("{p}%")])
                    .map_err(|e| Error::CacheUnavailable(e.to_string()))?,
                None => conn
                    .execute("DELETE FROM cache_kv WHERE expires_at < ?1", params![Utc::now()])
                    .map_err(|e| Error::CacheUnavailable(e.to_string()))?,
            };
            Ok(deleted)
        })
        .await
        .map_err(|e| Error::CacheUnavailable(e.to_string()))?
    }

    async fn close(&self) -> Result<()> {
        // r2d2 connections are returned to the pool on drop; nothing to flush.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let dir = std::env::temp_dir().join(format!("scavengarr-test-{}", uuid::Uuid::new_v4()));
        let cache = SqliteCache::open(dir.join("cache.db"), 4).unwrap();
        cache.set("search:abc", b"hello", 60).await.unwrap();
        let value = cache.get("search:abc").await.unwrap();
        assert_eq!(value, Some(b"hello".to_vec()));
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let dir = std::env::temp_dir().join(format!("scavengarr-test-{}", uuid::Uuid::new_v4()));
        let cache = SqliteCache::open(dir.join("cache.db"), 4).unwrap();
        cache.set("search:abc", b"hello", -1).await.unwrap();
        let value = cache.get("search:abc").await.unwrap();
        assert_eq!(value, None);
        std::fs::remove_dir_all(dir).ok();
    }
}
