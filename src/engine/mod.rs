//! Multi-stage scraping engine (C9, §4.4): the shared post-search pipeline
//! every plugin invocation passes through after `Plugin::search` returns.
//!
//! The *intra-plugin* half of §4.4 — list/detail stage fan-out, visited-URL
//! dedup, rate pacing, retry/backoff, mirror-domain failover — lives inside
//! each concrete plugin, built from `HttpPluginBase` (domain failover,
//! bounded semaphore) and `http_client` (retry/backoff transport), because
//! the actual stage DAG shape (what counts as a "list page" vs a "detail
//! page", what URLs it yields) is irreducibly per-site. Generalizing it
//! further would mean reintroducing the YAML-definition system this
//! codebase deliberately replaced with compiled plugins (§4.1 addendum).
//! See DESIGN.md.
//!
//! This module owns the half that *is* uniform across every plugin: dedup,
//! batch validation, and alternate-link promotion (§4.4 steps 1-3, P1/P7).

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::models::query::Query;
use crate::models::result::SearchResult;
use crate::plugin::Plugin;
use crate::validator::Validator;

pub struct ScrapingEngine {
    validator: Arc<Validator>,
}

impl ScrapingEngine {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }

    /// Run a plugin's `search`, then apply the uniform post-search pipeline
    /// (§4.4): dedup by `(title, download_link)`, batch-validate every
    /// candidate URL, promote a live alternate over a dead primary, and drop
    /// results with zero live links.
    pub async fn search(&self, plugin: &dyn Plugin, query: &Query) -> Result<Vec<SearchResult>> {
        let raw = plugin.search(query).await?;
        let deduped = dedup_preserve_order(raw);
        Ok(self.validate_and_promote(deduped).await)
    }

    async fn validate_and_promote(&self, mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut all_urls = Vec::new();
        let mut seen = HashSet::new();
        for result in &results {
            for url in result.all_candidate_urls() {
                if seen.insert(url.clone()) {
                    all_urls.push(url);
                }
            }
        }

        let liveness = self.validator.validate_batch(&all_urls).await;

        results.retain_mut(|result| {
            let candidates = result.all_candidate_urls();
            let live: Vec<String> =
                candidates.into_iter().filter(|url| liveness.get(url).copied().unwrap_or(false)).collect();

            if live.is_empty() {
                tracing::warn!(title = %result.title, "dropping result: no live links");
                return false;
            }

            result.validated_links = live;
            if !result.validated_links.contains(&result.download_link) {
                // Primary is dead but an alternate lives: promote the first
                // live alternate (§4.4 step 3 / scenario 2).
                result.download_link = result.validated_links[0].clone();
            } else {
                // Keep the primary first even if it wasn't the first live
                // alternate discovered, so P1 (`download_link ==
                // validated_links[0]`) holds without reordering on the happy path.
                let primary = result.download_link.clone();
                result.validated_links.retain(|u| u != &primary);
                result.validated_links.insert(0, primary);
            }
            true
        });

        results
    }
}

/// Dedup by `(title, download_link)`, keeping the first occurrence and the
/// original order of the survivors (P7).
fn dedup_preserve_order(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results.into_iter().filter(|r| seen.insert(r.dedup_key())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;

    fn result(title: &str, link: &str) -> SearchResult {
        SearchResult::new(title, link)
    }

    #[test]
    fn dedup_is_idempotent_and_order_preserving() {
        let input = vec![
            result("A", "https://x/1"),
            result("B", "https://x/2"),
            result("A", "https://x/1"),
            result("C", "https://x/3"),
        ];
        let once = dedup_preserve_order(input.clone());
        let titles: Vec<_> = once.iter().map(|r| r.title.clone()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);

        let twice = dedup_preserve_order(once.clone());
        assert_eq!(twice.len(), once.len());
    }

    #[tokio::test]
    async fn promotes_live_alternate_over_dead_primary() {
        // Uses a real Validator against unreachable hosts; both URLs will
        // fail to connect, so this only exercises the drop path here. The
        // promotion path (scenario 2) is covered at the use-case level
        // against a mocked validator; kept here as a cheap sanity check that
        // an all-dead result is dropped without panicking.
        let validator = Arc::new(Validator::new(
            reqwest::Client::new(),
            &ValidatorConfig { timeout_secs: 1, concurrency: 4 },
        ));
        let engine = ScrapingEngine::new(validator);
        let results = vec![result("X", "http://127.0.0.1:1/dead")];
        let out = engine.validate_and_promote(results).await;
        assert!(out.is_empty());
    }
}
