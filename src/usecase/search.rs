//! Search use case (C10, §4.7): the orchestration the Torznab `t=search`
//! endpoint (and the diagnostic CLI) calls into. Cache-first, falls through
//! to the scraping engine, materializes a CrawlJob per result, and applies
//! offset/limit to the cached or freshly scraped list at read time per the
//! §9 open-question resolution (the fingerprint never bakes in pagination).

use std::time::Duration;

use chrono::Duration as ChronoDuration;

use crate::app::AppContext;
use crate::error::{Error, Result};
use crate::models::{CrawlJob, Query, SearchResult};
use crate::util::fingerprint::search_fingerprint;

/// Total deadline for one plugin's scrape (§5: "the search use case applies
/// a total deadline"), distinct from any per-stage pacing the plugin itself
/// does internally.
const TOTAL_SEARCH_DEADLINE: Duration = Duration::from_secs(25);

pub struct SearchOutcome {
    pub items: Vec<SearchResult>,
    pub cache_hit: bool,
}

/// Synthetic item returned by an extended reachability probe (`?extended=1`
/// with empty `q`), scenario 3.
pub fn reachability_probe_item(plugin_name: &str) -> SearchResult {
    SearchResult::new(format!("{plugin_name} test"), String::new())
}

pub async fn search(ctx: &AppContext, query: &Query) -> Result<SearchOutcome> {
    validate(ctx, query).await?;

    let fingerprint = search_fingerprint(&query.plugin_name, &query.normalized_q(), query.category);

    // A reachability probe must always execute live: its fingerprint
    // coincides with any other empty-`q` search against the same category,
    // so a cache hit there would skip the actual liveness check.
    if !query.is_reachability_probe()
        && let Some(cached) = ctx.search_cache.get_json::<Vec<SearchResult>>(&fingerprint).await?
    {
        return Ok(SearchOutcome { items: apply_paging(cached, query), cache_hit: true });
    }

    if !ctx.plugin_registry.is_enabled(&query.plugin_name).await {
        return Err(Error::PluginNotFound(query.plugin_name.clone()));
    }

    let plugin = ctx.plugin_registry.get(&query.plugin_name).await?;

    if !ctx.metrics.may_call(&query.plugin_name).await {
        tracing::warn!(plugin = %query.plugin_name, "circuit breaker open, rejecting without execution");
        return Err(Error::HosterOffline(query.plugin_name.clone()));
    }

    let counters = ctx.metrics.counters_for(&query.plugin_name).await;
    counters.attempts.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let started = std::time::Instant::now();

    let scrape_result = match tokio::time::timeout(TOTAL_SEARCH_DEADLINE, ctx.engine.search(plugin.as_ref(), query)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(plugin = %query.plugin_name, "search deadline exceeded");
            Err(Error::Deadline)
        }
    };
    counters.record_latency(started.elapsed()).await;

    let mut results = match scrape_result {
        Ok(results) => {
            counters.successes.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            ctx.metrics.record_success(&query.plugin_name).await;
            results
        }
        Err(Error::Deadline) => {
            counters.timeouts.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            ctx.metrics.record_failure(&query.plugin_name).await;
            return Err(Error::Deadline);
        }
        Err(err) => {
            counters.errors.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            ctx.metrics.record_failure(&query.plugin_name).await;
            return Err(err);
        }
    };

    // Scenario 3 (§6): a reachability probe only cares that the plugin
    // answered at all; the real scrape results are discarded in favor of a
    // synthetic marker item, and no CrawlJob is materialized for it.
    if query.is_reachability_probe() {
        let item = reachability_probe_item(&query.plugin_name);
        return Ok(SearchOutcome { items: vec![item], cache_hit: false });
    }

    for result in &mut results {
        match build_and_store_crawljob(ctx, result).await {
            Ok(job_id) => result.job_id = Some(job_id),
            Err(err) => {
                tracing::warn!(title = %result.title, error = %err, "crawljob build/store failed, skipping item's job_id");
            }
        }
    }

    if let Err(err) = ctx.search_cache.set_json(&fingerprint, &results, ctx.config.cache.search_ttl_secs).await {
        tracing::warn!(error = %err, "search cache write failed, serving live results anyway");
    }

    Ok(SearchOutcome { items: apply_paging(results, query), cache_hit: false })
}

async fn validate(ctx: &AppContext, query: &Query) -> Result<()> {
    if query.q.as_deref().map(str::trim).unwrap_or("").is_empty() && !query.extended {
        return Err(Error::Input("q must be non-empty unless extended=1".into()));
    }
    if !ctx.plugin_registry.list_names().contains(&query.plugin_name.as_str()) {
        return Err(Error::PluginNotFound(query.plugin_name.clone()));
    }
    Ok(())
}

async fn build_and_store_crawljob(ctx: &AppContext, result: &SearchResult) -> Result<uuid::Uuid> {
    let job = CrawlJob::build(
        &result.title,
        result.validated_links.clone(),
        result.release_name.as_deref(),
        result.description.as_deref(),
        result.size,
        result.source_url.as_deref(),
        ChronoDuration::seconds(ctx.config.cache.crawljob_ttl_secs),
    )?;
    ctx.crawljob_repo.store(&job).await?;
    Ok(job.job_id)
}

/// Offset/limit are applied to the already-resolved item list, never baked
/// into the cache key (§9): one cached scrape serves every page.
fn apply_paging(items: Vec<SearchResult>, query: &Query) -> Vec<SearchResult> {
    let offset = query.offset.unwrap_or(0) as usize;
    let items: Vec<SearchResult> = items.into_iter().skip(offset).collect();
    match query.limit {
        Some(limit) => items.into_iter().take(limit as usize).collect(),
        None => items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reachability_probe_item_is_named_after_plugin() {
        let item = reachability_probe_item("example-html");
        assert_eq!(item.title, "example-html test");
    }

    #[test]
    fn paging_applies_offset_then_limit() {
        let items: Vec<SearchResult> =
            (0..5).map(|i| SearchResult::new(format!("r{i}"), format!("https://x/{i}"))).collect();
        let query = Query { offset: Some(2), limit: Some(2), ..Default::default() };
        let paged = apply_paging(items, &query);
        let titles: Vec<_> = paged.iter().map(|r| r.title.clone()).collect();
        assert_eq!(titles, vec!["r2", "r3"]);
    }
}
