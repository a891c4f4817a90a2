//! Shared async KV cache abstraction (C1, §4.9): one `CachePort` trait behind
//! three logical namespaces (`search:`, `crawljob:`, `stream:`), backed by
//! either the embedded SQLite store or a remote Redis-compatible store.

mod redis_backend;
mod sqlite;

pub use redis_backend::RedisCache;
pub use sqlite::SqliteCache;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Async KV with TTL. Values are opaque serialized bytes; callers own framing.
#[async_trait]
pub trait CachePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: &[u8], ttl_secs: i64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
    /// Remove every expired entry. Namespaced callers may also use this to
    /// wipe a specific prefix by passing it as `prefix`.
    async fn clear(&self, prefix: Option<&str>) -> Result<usize>;
    async fn close(&self) -> Result<()>;
}

pub const NS_SEARCH: &str = "search:";
pub const NS_CRAWLJOB: &str = "crawljob:";
pub const NS_STREAM: &str = "stream:";

/// Typed helper over a `CachePort` for one of the three namespaces, doing the
/// JSON (de)serialization so use cases don't repeat it.
#[derive(Clone)]
pub struct NamespacedCache {
    port: Arc<dyn CachePort>,
    prefix: &'static str,
}

impl NamespacedCache {
    pub fn new(port: Arc<dyn CachePort>, prefix: &'static str) -> Self {
        Self { port, prefix }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.port.get(&self.full_key(key)).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set_json<T: serde::Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: i64,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.port.set(&self.full_key(key), &bytes, ttl_secs).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.port.delete(&self.full_key(key)).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.port.exists(&self.full_key(key)).await
    }
}
