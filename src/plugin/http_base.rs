//! HTTP-mode plugin base (C7, §4.2): lazy client construction, domain
//! failover, bounded concurrency, and safe-fetch error classification shared
//! by every HTTP-mode concrete plugin. Grounded on the teacher's
//! `SearchExecutor` (cookie-store client, proxy-aware builder), extended
//! with the failover/semaphore/pagination machinery the teacher never
//! needed (Jackett definitions assume one fixed base URL).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, Semaphore, SemaphorePermit};

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::http_client;

/// Default per-plugin detail-page fan-out bound (§4.2).
pub const DEFAULT_CONCURRENCY: usize = 3;
/// §4.2: plugins paginate until the site's result set or this cap.
pub const MAX_RESULTS: usize = 1000;

pub struct HttpPluginBase {
    client: reqwest::Client,
    domains: Vec<String>,
    active_domain: RwLock<Option<String>>,
    semaphore: Arc<Semaphore>,
}

impl HttpPluginBase {
    pub fn new(domains: Vec<String>, http_config: &HttpConfig) -> Result<Self> {
        Self::with_concurrency(domains, http_config, DEFAULT_CONCURRENCY)
    }

    pub fn with_concurrency(
        domains: Vec<String>,
        http_config: &HttpConfig,
        concurrency: usize,
    ) -> Result<Self> {
        let client = http_client::build_client(http_config)?;
        Ok(Self {
            client,
            domains,
            active_domain: RwLock::new(None),
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Acquire the per-plugin fan-out permit. Callers MUST hold this around
    /// per-URL work and it is released automatically on drop (§4.2).
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore.acquire().await.map_err(|_| Error::Cancelled)
    }

    /// Probes `domains[0]`, then the next, etc, on a cheap HEAD-or-GET. The
    /// first reachable domain is adopted for the remainder of the process.
    /// Verified once per plugin per process.
    pub async fn base_url(&self) -> Result<String> {
        if let Some(domain) = self.active_domain.read().await.clone() {
            return Ok(domain);
        }

        let mut write_guard = self.active_domain.write().await;
        if let Some(domain) = write_guard.clone() {
            return Ok(domain);
        }

        for domain in &self.domains {
            let probe_url = format!("https://{domain}");
            if self.probe_reachable(&probe_url).await {
                *write_guard = Some(probe_url.clone());
                return Ok(probe_url);
            }
        }

        Err(Error::PluginLoad(format!("no reachable domain among {:?}", self.domains)))
    }

    /// Forces re-probing on the next `base_url()` call, used after sustained
    /// failure against the currently adopted domain.
    pub async fn invalidate_domain(&self) {
        *self.active_domain.write().await = None;
    }

    async fn probe_reachable(&self, url: &str) -> bool {
        match self.client.head(url).timeout(Duration::from_secs(8)).send().await {
            Ok(response) => response.status().as_u16() < 500,
            Err(_) => self
                .client
                .get(url)
                .timeout(Duration::from_secs(8))
                .send()
                .await
                .is_ok_and(|r| r.status().as_u16() < 500),
        }
    }

    /// GET with structured error classification; never raises across the
    /// plugin boundary for expected non-success responses (§4.2).
    pub async fn safe_get(&self, url: &str) -> Result<http_client::FetchResponse> {
        http_client::get_with_retry(&self.client, url).await
    }

    pub async fn safe_post(&self, url: &str, body: Vec<u8>) -> Result<http_client::FetchResponse> {
        http_client::post_with_retry(&self.client, url, body).await
    }
}

/// Derives the page cap for a site with a known results-per-page size,
/// bounded by `MAX_RESULTS` (§4.2).
pub fn max_pages(results_per_page: usize) -> usize {
    if results_per_page == 0 {
        return 1;
    }
    MAX_RESULTS.div_ceil(results_per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_pages_caps_at_max_results() {
        assert_eq!(max_pages(50), 20);
        assert_eq!(max_pages(1000), 1);
        assert_eq!(max_pages(0), 1);
    }
}
