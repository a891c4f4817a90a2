//! Stream use case (C11, §4.8): resolve title/year, fan out across candidate
//! plugins with per-plugin deadlines, convert results into ranked streams,
//! and eagerly resolve the top N through the hoster resolver registry.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::error::{Error, Result};
use crate::models::descriptor::Provides;
use crate::models::query::Query;
use crate::models::result::SearchResult;
use crate::models::stream::{BehaviorHints, ProxyHeaders, ProxyHeadersRequest, RankedStream, ResolvedStream};
use crate::plugin::Plugin;
use crate::util::release::{infer_hoster, parse_release_name, quality_rank};

/// Per-plugin deadline for a single stream fan-out call (§4.8 step 3).
const PLUGIN_DEADLINE: Duration = Duration::from_secs(20);
/// How many top-ranked candidates get eagerly resolved into a direct URL;
/// the rest are served lazily through `/play/{stream_id}`.
const EAGER_RESOLVE_COUNT: usize = 3;
const DEFAULT_LANGUAGE_PREFERENCE: &str = "de";

pub struct MediaRequest {
    pub imdb_id: String,
    pub category: i32,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Resolves the top-N ranked streams, plus the mapping `/play/{stream_id}`
/// needs to lazily resolve every remaining candidate on click.
pub struct StreamOutcome {
    pub ranked: Vec<RankedStream>,
    /// `stream_id -> (source_url, hoster_hint)` for lazy resolution, already
    /// persisted to `ctx.stream_cache` under the `play:` sub-key by the time
    /// this is returned.
    pub lazy_sources: std::collections::HashMap<String, (String, Option<String>)>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PlayEntry {
    source_url: String,
    hoster_hint: Option<String>,
}

/// TTL for a lazy `/play/{stream_id}` entry: long enough that a user browsing
/// a stream list and clicking a non-top-N entry minutes later still resolves.
const PLAY_ENTRY_TTL_SECS: i64 = 1800;

pub async fn streams(ctx: &AppContext, request: &MediaRequest, cancel: CancellationToken) -> Result<StreamOutcome> {
    let metadata = ctx.metadata.resolve(&request.imdb_id).await?;

    let query = Query {
        plugin_name: String::new(),
        q: Some(metadata.title.clone()),
        category: Some(request.category),
        season: request.season,
        episode: request.episode,
        extended: false,
        offset: None,
        limit: None,
    };

    let candidates = candidate_plugins(ctx, request.category).await;
    let raw_results = fan_out(ctx, &candidates, &query, cancel).await;

    let mut ranked: Vec<RankedStream> = raw_results
        .into_iter()
        .map(|result| score_result(&result, &metadata.title, metadata.alt_title.as_deref(), metadata.year, request))
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut lazy_sources = std::collections::HashMap::new();
    for (idx, stream) in ranked.iter_mut().enumerate() {
        let stream_id = uuid::Uuid::new_v4().to_string();
        let Some(source_url) = stream.play_url.take() else { continue };
        let hoster_hint = stream.hoster.clone();

        if idx < EAGER_RESOLVE_COUNT {
            match resolve_with_cache(ctx, &source_url, hoster_hint.as_deref()).await {
                Ok(resolved) => {
                    stream.behavior_hints = BehaviorHints {
                        not_web_ready: true,
                        proxy_headers: Some(ProxyHeaders {
                            request: ProxyHeadersRequest {
                                referer: resolved.referer().map(str::to_string),
                                user_agent: resolved.user_agent().map(str::to_string),
                            },
                        }),
                    };
                    stream.direct_url = Some(resolved.direct_url);
                }
                Err(err) => {
                    tracing::warn!(url = %source_url, error = %err, "eager resolve failed, falling back to lazy indirection");
                    persist_play_entry(ctx, &stream_id, &source_url, hoster_hint.as_deref()).await;
                    lazy_sources.insert(stream_id.clone(), (source_url, hoster_hint));
                    stream.play_url = Some(stream_id);
                }
            }
        } else {
            persist_play_entry(ctx, &stream_id, &source_url, hoster_hint.as_deref()).await;
            lazy_sources.insert(stream_id.clone(), (source_url, hoster_hint));
            stream.play_url = Some(stream_id);
        }
    }

    Ok(StreamOutcome { ranked, lazy_sources })
}

async fn persist_play_entry(ctx: &AppContext, stream_id: &str, source_url: &str, hoster_hint: Option<&str>) {
    let entry = PlayEntry { source_url: source_url.to_string(), hoster_hint: hoster_hint.map(str::to_string) };
    if let Err(err) = ctx.stream_cache.set_json(&format!("play:{stream_id}"), &entry, PLAY_ENTRY_TTL_SECS).await {
        tracing::warn!(error = %err, "failed to persist lazy play entry");
    }
}

/// Resolve a single `/play/{stream_id}` click: looks up the persisted
/// source/hint for `stream_id`, then the stream-link cache (§4.9 C14),
/// falling through to the resolver registry on miss.
pub async fn resolve_play(ctx: &AppContext, stream_id: &str) -> Result<String> {
    let entry: PlayEntry = ctx
        .stream_cache
        .get_json(&format!("play:{stream_id}"))
        .await?
        .ok_or_else(|| Error::NotFound(format!("no pending stream for id {stream_id}")))?;
    let resolved = resolve_with_cache(ctx, &entry.source_url, entry.hoster_hint.as_deref()).await?;
    Ok(resolved.direct_url)
}

async fn resolve_with_cache(
    ctx: &AppContext,
    source_url: &str,
    hoster_hint: Option<&str>,
) -> Result<ResolvedStream> {
    let hoster = hoster_hint
        .map(str::to_string)
        .or_else(|| infer_hoster(source_url))
        .unwrap_or_else(|| "unknown".to_string());
    let mut hasher = Sha256::new();
    hasher.update(source_url.as_bytes());
    let cache_key = format!("{hoster}:{}", hex::encode(hasher.finalize()));

    if let Some(cached) = ctx.stream_cache.get_json(&cache_key).await? {
        return Ok(cached);
    }

    let resolved = ctx.resolver_registry.resolve(source_url, hoster_hint).await?;
    if let Err(err) = ctx.stream_cache.set_json(&cache_key, &resolved, ctx.config.cache.stream_ttl_secs).await {
        tracing::warn!(error = %err, "stream-link cache write failed");
    }
    Ok(resolved)
}

async fn candidate_plugins(ctx: &AppContext, category: i32) -> Vec<Arc<dyn Plugin>> {
    let is_series = (5000..6000).contains(&category);
    let mut plugins = Vec::new();
    for name in ctx.plugin_registry.list_names() {
        if !ctx.plugin_registry.is_enabled(name).await {
            continue;
        }
        let Ok(plugin) = ctx.plugin_registry.get(name).await else { continue };
        if plugin.descriptor().provides != Provides::Stream {
            continue;
        }
        let handles_category = plugin.descriptor().categories.values().any(|&c| {
            if is_series { (5000..6000).contains(&c) } else { (2000..3000).contains(&c) }
        });
        if handles_category || plugin.descriptor().categories.is_empty() {
            plugins.push(plugin);
        }
    }
    plugins
}

/// Launch one `search` per candidate plugin with its own deadline;
/// cancelling `cancel` aborts every in-flight task (§5, P8). Each attempt is
/// recorded against the plugin's counters/breaker the same way
/// `usecase::search::search` records its single plugin call (§4.8, §4.12).
async fn fan_out(
    ctx: &AppContext,
    candidates: &[Arc<dyn Plugin>],
    query: &Query,
    cancel: CancellationToken,
) -> Vec<SearchResult> {
    let mut set = JoinSet::new();
    for plugin in candidates {
        let plugin = plugin.clone();
        let query = query.clone();
        let cancel = cancel.clone();
        let counters = ctx.metrics.counters_for(plugin.name()).await;
        let plugin_name = plugin.name().to_string();
        counters.attempts.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        set.spawn(async move {
            let started = std::time::Instant::now();
            let outcome = tokio::select! {
                _ = cancel.cancelled() => Err(Error::Cancelled),
                outcome = tokio::time::timeout(PLUGIN_DEADLINE, plugin.search(&query)) => {
                    match outcome {
                        Ok(result) => result,
                        Err(_) => {
                            tracing::warn!(plugin = %plugin_name, "plugin timed out");
                            Err(Error::Deadline)
                        }
                    }
                }
            };
            counters.record_latency(started.elapsed()).await;
            match &outcome {
                Ok(_) => counters.successes.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
                Err(Error::Deadline) => counters.timeouts.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
                Err(_) => counters.errors.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
            };
            (plugin_name, outcome)
        });
    }

    let mut all_results = Vec::new();
    while let Some(joined) = set.join_next().await {
        let Ok((plugin_name, outcome)) = joined else { continue };
        match outcome {
            Ok(results) => {
                ctx.metrics.record_success(&plugin_name).await;
                all_results.extend(results);
            }
            Err(err) => {
                tracing::warn!(plugin = %plugin_name, error = %err, "stream fan-out attempt failed");
                ctx.metrics.record_failure(&plugin_name).await;
            }
        }
    }
    all_results
}

fn score_result(
    result: &SearchResult,
    title: &str,
    alt_title: Option<&str>,
    year: Option<u32>,
    request: &MediaRequest,
) -> RankedStream {
    let release_name = result.release_name.clone().unwrap_or_else(|| result.title.clone());
    let parsed = parse_release_name(&release_name);

    let title_score = [Some(title), alt_title]
        .into_iter()
        .flatten()
        .map(|candidate| strsim::jaro_winkler(&result.title.to_lowercase(), &candidate.to_lowercase()))
        .fold(0.0_f64, f64::max);

    let year_score = match (year, parsed.year) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(_), Some(_)) => 0.0,
        _ => 0.5,
    };

    let episode_score = match (request.episode, parsed.episode) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(_), Some(_)) => 0.0,
        (None, _) => 1.0,
        _ => 0.5,
    };

    let quality_score = quality_rank(parsed.quality.as_deref()) as f64 / 6.0;

    let language_score = match &parsed.language {
        Some(lang) if lang == DEFAULT_LANGUAGE_PREFERENCE => 1.0,
        Some(_) => 0.5,
        None => 0.3,
    };

    let score = title_score * 0.4 + year_score * 0.15 + episode_score * 0.15 + quality_score * 0.2 + language_score * 0.1;

    let hoster = result.download_links.first().and_then(|l| l.hoster_hint.clone()).or_else(|| infer_hoster(&result.download_link));

    RankedStream {
        title: result.title.clone(),
        release_name,
        quality: parsed.quality,
        language: parsed.language,
        size_bytes: result.size,
        hoster,
        score,
        play_url: Some(result.download_link.clone()),
        direct_url: None,
        behavior_hints: BehaviorHints::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MediaRequest {
        MediaRequest { imdb_id: "tt0371746".to_string(), category: 2000, season: None, episode: None }
    }

    #[test]
    fn ranks_higher_quality_above_cam() {
        let mut hd = SearchResult::new("Iron Man 2008 1080p BluRay x264", "https://hoster/a");
        hd.release_name = Some("Iron Man 2008 1080p BluRay x264".to_string());
        let mut cam = SearchResult::new("Iron Man 2008 CAM", "https://hoster/b");
        cam.release_name = Some("Iron Man 2008 CAM".to_string());

        let hd_score = score_result(&hd, "Iron Man", None, Some(2008), &request());
        let cam_score = score_result(&cam, "Iron Man", None, Some(2008), &request());

        assert!(hd_score.score > cam_score.score);
        assert_eq!(hd_score.quality.as_deref(), Some("1080p"));
    }
}
