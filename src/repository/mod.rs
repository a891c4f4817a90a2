//! CrawlJob repository (C12, §4.9): a TTL-backed store over the shared
//! `CachePort`, keyed `crawljob:<uuid>`. Thin by design — the CrawlJob
//! factory (§4.10) already does the interesting work; this module is just
//! persistence plus the expiry check the HTTP layer needs at serve time.

use uuid::Uuid;

use crate::cache::{CachePort, NS_CRAWLJOB, NamespacedCache};
use crate::error::{Error, Result};
use crate::models::CrawlJob;
use std::sync::Arc;

pub struct CrawlJobRepository {
    cache: NamespacedCache,
    default_ttl_secs: i64,
}

impl CrawlJobRepository {
    pub fn new(port: Arc<dyn CachePort>, default_ttl_secs: i64) -> Self {
        Self { cache: NamespacedCache::new(port, NS_CRAWLJOB), default_ttl_secs }
    }

    /// Store a CrawlJob under its own id, TTL taken from the job's
    /// `created_at`/`expires_at` span (falls back to the repository default
    /// if that span is non-positive).
    pub async fn store(&self, job: &CrawlJob) -> Result<()> {
        let ttl = (job.expires_at - job.created_at).num_seconds();
        let ttl = if ttl > 0 { ttl } else { self.default_ttl_secs };
        self.cache.set_json(&job.job_id.to_string(), job, ttl).await
    }

    /// Fetch a job by id. Returns `None` both when it was never stored and
    /// when the backend already evicted it past its TTL.
    pub async fn get(&self, job_id: Uuid) -> Result<Option<CrawlJob>> {
        match self.cache.get_json::<CrawlJob>(&job_id.to_string()).await? {
            Some(job) if !job.is_expired() => Ok(Some(job)),
            Some(_) => Ok(None),
            None => Ok(None),
        }
    }

    pub async fn get_or_not_found(&self, job_id: Uuid) -> Result<CrawlJob> {
        self.get(job_id).await?.ok_or_else(|| Error::NotFound(format!("crawljob {job_id}")))
    }
}
