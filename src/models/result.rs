//! The SearchResult entity (§3): normalized plugin output, mutated in place by
//! the scraping engine's dedup/validate/promote pipeline (§4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One alternate download/stream location for a result, as produced by a
/// plugin before validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadLink {
    pub url: String,
    /// Hint for the resolver registry when the visible domain is a rotating
    /// alias (e.g. `"streamtape"`), see §4.6.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoster_hint: Option<String>,
}

impl DownloadLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), hoster_hint: None }
    }

    pub fn with_hint(url: impl Into<String>, hint: impl Into<String>) -> Self {
        Self { url: url.into(), hoster_hint: Some(hint.into()) }
    }
}

/// A single normalized scrape result, as produced by a plugin's `search` and
/// then mutated by the scraping engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub download_link: String,

    pub release_name: Option<String>,
    pub description: Option<String>,
    pub size: Option<u64>,
    pub seeders: Option<u32>,
    pub leechers: Option<u32>,
    pub published_date: Option<DateTime<Utc>>,
    pub source_url: Option<String>,
    pub category: Option<i32>,
    pub grabs: Option<u32>,
    pub download_volume_factor: Option<f64>,
    pub upload_volume_factor: Option<f64>,

    /// Ordered alternates, populated by the plugin alongside `download_link`.
    #[serde(default)]
    pub download_links: Vec<DownloadLink>,
    /// Subset of `download_link` + `download_links` known reachable, filled in
    /// by the scraping engine after calling the validator (§4.4 step 2-3).
    #[serde(default)]
    pub validated_links: Vec<String>,
    /// Name of the stage that ultimately produced this result, for tracing.
    pub scraped_from_stage: Option<String>,

    /// Filled in by the search use case once a CrawlJob has been materialized.
    pub job_id: Option<uuid::Uuid>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, download_link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            download_link: download_link.into(),
            release_name: None,
            description: None,
            size: None,
            seeders: None,
            leechers: None,
            published_date: None,
            source_url: None,
            category: None,
            grabs: None,
            download_volume_factor: None,
            upload_volume_factor: None,
            download_links: Vec::new(),
            validated_links: Vec::new(),
            scraped_from_stage: None,
            job_id: None,
        }
    }

    /// All candidate URLs for this result: the primary plus every alternate,
    /// in order, without duplicates. This is what gets handed to the batch
    /// validator (§4.4 step 2).
    pub fn all_candidate_urls(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut urls = Vec::new();
        for url in std::iter::once(self.download_link.clone())
            .chain(self.download_links.iter().map(|l| l.url.clone()))
        {
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
        urls
    }

    /// Dedup key per §4.4 step 1 / P7.
    pub fn dedup_key(&self) -> (String, String) {
        (self.title.clone(), self.download_link.clone())
    }
}
