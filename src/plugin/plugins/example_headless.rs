//! A schematic headless-mode plugin (§4.3): pages behind a JS challenge are
//! rendered via the shared `HeadlessPool` RPC rather than fetched directly.
//! Reference instance for the headless-mode half of the plugin roster.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;

use crate::config::HeadlessConfig;
use crate::error::Result;
use crate::headless::HeadlessPool;
use crate::models::descriptor::{PluginDescriptor, PluginMode, Provides};
use crate::models::query::Query;
use crate::models::result::{DownloadLink, SearchResult};
use crate::plugin::Plugin;
use crate::plugin::headless_base::HeadlessPluginBase;
use crate::plugin::toolkit::field_extractor::{extract_all, extract_attr, extract_text};
use crate::plugin::toolkit::selector::parse_selector_chain;

/// Headless-mode concurrency is capped stricter than HTTP mode (§4.3): this
/// plugin shares a 2-slot pool rather than the HTTP default of 3.
const HEADLESS_CONCURRENCY: usize = 2;

pub struct ExampleHeadlessPlugin {
    base: HeadlessPluginBase,
    descriptor: PluginDescriptor,
}

impl ExampleHeadlessPlugin {
    pub fn new() -> Self {
        let pool = HeadlessPool::new(&HeadlessConfig::default(), HEADLESS_CONCURRENCY)
            .expect("building the plugin's own headless pool client must not fail on static config");

        let domains = vec!["example-streams.example".to_string()];
        let mut categories = std::collections::HashMap::new();
        categories.insert("movies".to_string(), 2000);
        categories.insert("tv".to_string(), 5000);

        Self {
            base: HeadlessPluginBase::new(Arc::new(pool)),
            descriptor: PluginDescriptor {
                name: "example-headless".to_string(),
                provides: Provides::Stream,
                default_language: "en".to_string(),
                mode: PluginMode::Headless,
                domains,
                categories,
            },
        }
    }

    pub fn factory() -> Arc<dyn Plugin> {
        Arc::new(Self::new())
    }
}

impl Default for ExampleHeadlessPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for ExampleHeadlessPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>> {
        let q = query.normalized_q();
        let url = format!(
            "https://{}/search?q={}",
            self.descriptor.domains[0],
            urlencoding::encode(&q)
        );

        let html = self.base.render(&url, Some("div.result")).await?;
        let document = Html::parse_document(&html);
        let root = document.root_element();

        let row_chain = parse_selector_chain("div.result");
        let title_chain = parse_selector_chain("span.title");
        let embed_chain = parse_selector_chain("a.watch");

        let mut results = Vec::new();
        for row in extract_all(&root, &row_chain) {
            let Some(title) = extract_text(&row, &title_chain) else {
                tracing::warn!("headless result missing required title, dropping");
                continue;
            };
            let Some(embed_url) = extract_attr(&row, &embed_chain, "href") else {
                tracing::warn!(title, "headless result missing required embed link, dropping");
                continue;
            };

            let mut result = SearchResult::new(title, embed_url.clone());
            result.category = query.category.or(Some(2000));
            result.scraped_from_stage = Some("list".to_string());
            // Rotating embed domains mean the resolver registry often can't
            // match by host suffix alone; the hoster hint disambiguates it.
            result.download_links.push(DownloadLink::with_hint(embed_url, "streamtape"));
            results.push(result);
        }

        Ok(results)
    }

    async fn cleanup(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_is_headless_and_stream() {
        let plugin = ExampleHeadlessPlugin::new();
        assert_eq!(plugin.descriptor().mode, PluginMode::Headless);
        assert_eq!(plugin.descriptor().provides, Provides::Stream);
    }
}
