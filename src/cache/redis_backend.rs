//! Remote cache backend: a Redis-compatible store accessed through an async
//! connection manager, for the multi-process deployment described in §4.9
//! ("Remote lets several Scavengarr instances share one cache").

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::cache::CachePort;
use crate::error::{Error, Result};

pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl CachePort for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> =
            conn.get(key).await.map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl_secs: i64) -> Result<()> {
        let mut conn = self.manager.clone();
        if ttl_secs <= 0 {
            // Already-expired write: store nothing, mirrors the SQLite
            // backend's treatment of a non-positive TTL as a no-op set.
            return Ok(());
        }
        conn.set_ex::<_, _, ()>(key, value, ttl_secs as u64)
            .await
            .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await.map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        let exists: bool =
            conn.exists(key).await.map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        Ok(exists)
    }

    async fn clear(&self, prefix: Option<&str>) -> Result<usize> {
        let mut conn = self.manager.clone();
        let pattern = format!("{}*", prefix.unwrap_or(""));
        let keys: Vec<String> =
            conn.keys(&pattern).await.map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        if keys.is_empty() {
            return Ok(0);
        }
        let count = keys.len();
        conn.del::<_, ()>(keys).await.map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        Ok(count)
    }

    async fn close(&self) -> Result<()> {
        // ConnectionManager handles reconnection internally; nothing to close.
        Ok(())
    }
}
