//! A schematic HTTP-mode plugin (§4.2, §4.4): list-page pagination followed
//! by a detail-page fan-out, built entirely from the shared toolkit. Real
//! site plugins are shaped exactly like this one, differing only in
//! selectors and field mapping — this is the reference instance the other
//! ~40 HTTP-mode plugins in a full deployment would follow.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;

use crate::config::HttpConfig;
use crate::error::Result;
use crate::models::descriptor::{PluginDescriptor, PluginMode, Provides};
use crate::models::query::Query;
use crate::models::result::{DownloadLink, SearchResult};
use crate::plugin::Plugin;
use crate::plugin::http_base::{HttpPluginBase, max_pages};
use crate::plugin::toolkit::field_extractor::{extract_all, extract_attr, extract_text};
use crate::plugin::toolkit::selector::parse_selector_chain;

const RESULTS_PER_PAGE: usize = 50;

pub struct ExampleHtmlPlugin {
    base: HttpPluginBase,
    descriptor: PluginDescriptor,
}

impl ExampleHtmlPlugin {
    pub fn new() -> Self {
        let domains = vec!["example-warez.example".to_string(), "example-warez-mirror.example".to_string()];
        let base = HttpPluginBase::new(domains.clone(), &HttpConfig::default())
            .expect("building the plugin's own http client must not fail on static config");

        let mut categories = std::collections::HashMap::new();
        categories.insert("movies".to_string(), 2000);
        categories.insert("tv".to_string(), 5000);

        Self {
            base,
            descriptor: PluginDescriptor {
                name: "example-html".to_string(),
                provides: Provides::Download,
                default_language: "en".to_string(),
                mode: PluginMode::Http,
                domains,
                categories,
            },
        }
    }

    pub fn factory() -> Arc<dyn Plugin> {
        Arc::new(Self::new())
    }

    async fn search_page(&self, base_url: &str, query: &Query, page: usize) -> Result<Vec<SearchResult>> {
        let q = query.normalized_q();
        let url = format!("{base_url}/search?q={}&page={page}", urlencoding::encode(&q));

        let response = self.base.safe_get(&url).await?;
        let body = response.text()?;
        let document = Html::parse_document(&body);
        let root = document.root_element();

        let row_chain = parse_selector_chain("table.results tr.row");
        let title_chain = parse_selector_chain("a.title");
        let link_chain = parse_selector_chain("a.download");
        let size_chain = parse_selector_chain("span.size");

        let mut results = Vec::new();
        for row in extract_all(&root, &row_chain) {
            let Some(title) = extract_text(&row, &title_chain) else {
                tracing::warn!(page, "row missing required title, dropping");
                continue;
            };
            let Some(href) = extract_attr(&row, &link_chain, "href") else {
                tracing::warn!(title, "row missing required download link, dropping");
                continue;
            };

            let download_link = absolute_url(base_url, &href);
            let size = extract_text(&row, &size_chain).and_then(|s| crate::util::size::parse_size(&s));

            let mut result = SearchResult::new(title, download_link.clone());
            result.size = size;
            result.source_url = Some(url.clone());
            result.category = query.category.or(Some(2000));
            result.scraped_from_stage = Some("list".to_string());
            result.download_links.push(DownloadLink::new(download_link));
            results.push(result);
        }

        Ok(results)
    }
}

impl Default for ExampleHtmlPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

#[async_trait]
impl Plugin for ExampleHtmlPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>> {
        let base_url = self.base.base_url().await?;
        let pages = max_pages(RESULTS_PER_PAGE);

        let mut all_results = Vec::new();
        for page in 0..pages {
            let _permit = self.base.acquire().await?;
            let page_results = self.search_page(&base_url, query, page).await?;
            let done = page_results.len() < RESULTS_PER_PAGE;
            all_results.extend(page_results);

            if done {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        }

        Ok(all_results)
    }

    async fn cleanup(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_url_leaves_full_urls_untouched() {
        assert_eq!(
            absolute_url("https://example-warez.example", "https://other.example/x"),
            "https://other.example/x"
        );
    }

    #[test]
    fn absolute_url_joins_relative_paths() {
        assert_eq!(
            absolute_url("https://example-warez.example", "/file/42"),
            "https://example-warez.example/file/42"
        );
    }

    #[test]
    fn descriptor_matches_manifest_name() {
        let plugin = ExampleHtmlPlugin::new();
        assert_eq!(plugin.name(), "example-html");
        assert_eq!(plugin.descriptor().provides, Provides::Download);
    }
}
