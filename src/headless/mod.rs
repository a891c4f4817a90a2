//! Headless-browser pool (C3), modeled as a remote Browserless-style HTTP
//! content-rendering service rather than an in-process browser driver (see
//! SPEC_FULL.md §4.3). Grounded directly on
//! `browserless-client::BrowserlessClient`, generalized with the bounded
//! concurrency gate and challenge-page detection the spec requires.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;

use crate::config::HeadlessConfig;
use crate::error::{Error, Result};

/// Known challenge-page markers (title text / body snippets). Plain substring
/// match is enough: these interstitials are not trying to hide from scrapers
/// running in dev tooling, just from naive clients.
const CHALLENGE_MARKERS: &[&str] = &[
    "Just a moment...",
    "Checking your browser before accessing",
    "DDoS-Guard",
    "cf-browser-verification",
];

/// Per-call rendering parameters. A fresh incognito context and a rotated
/// UA/viewport are request-level concerns here, not long-lived browser state,
/// since the browser itself lives outside this process.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub wait_for_selector: Option<String>,
    pub user_agent: Option<String>,
    pub viewport: Option<(u32, u32)>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { wait_for_selector: None, user_agent: None, viewport: Some((1920, 1080)) }
    }
}

#[derive(Serialize)]
struct ContentRequest<'a> {
    url: &'a str,
    #[serde(rename = "waitForSelector", skip_serializing_if = "Option::is_none")]
    wait_for_selector: Option<WaitForSelector<'a>>,
    #[serde(rename = "gotoOptions")]
    goto_options: GotoOptions,
}

#[derive(Serialize)]
struct WaitForSelector<'a> {
    selector: &'a str,
    timeout: u64,
}

#[derive(Serialize)]
struct GotoOptions {
    #[serde(rename = "waitUntil")]
    wait_until: &'static str,
    timeout: u64,
}

pub struct HeadlessPool {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    nav_timeout: Duration,
    /// Concurrency cap stricter than HTTP mode (§4.3: default <= browser-pool size).
    gate: Arc<Semaphore>,
}

impl HeadlessPool {
    pub fn new(config: &HeadlessConfig, max_concurrency: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.nav_timeout_secs + 10))
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            nav_timeout: Duration::from_secs(config.nav_timeout_secs),
            gate: Arc::new(Semaphore::new(max_concurrency.max(1))),
        })
    }

    /// Render `url` and return the fully rendered HTML, waiting on the
    /// requested observable condition (selector presence / network idle)
    /// rather than a fixed sleep, and retrying once past a detected
    /// challenge page up to the navigation timeout.
    pub async fn content(&self, url: &str, options: &RenderOptions) -> Result<String> {
        let _permit = self.gate.acquire().await.map_err(|_| Error::Cancelled)?;

        let deadline = tokio::time::Instant::now() + self.nav_timeout;
        loop {
            let html = self.fetch_content(url, options).await?;

            if !is_challenge_page(&html) {
                return Ok(html);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::Challenge(format!("unresolved challenge at {url}")));
            }

            tracing::warn!(url, "challenge page detected, waiting before retry");
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    async fn fetch_content(&self, url: &str, options: &RenderOptions) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let payload = ContentRequest {
            url,
            wait_for_selector: options.wait_for_selector.as_deref().map(|selector| {
                WaitForSelector { selector, timeout: self.nav_timeout.as_millis() as u64 }
            }),
            goto_options: GotoOptions {
                wait_until: "networkidle2",
                timeout: self.nav_timeout.as_millis() as u64,
            },
        };

        let response = self
            .client
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http5xx { status: status.as_u16(), body });
        }

        response.text().await.map_err(Error::Transport)
    }
}

fn is_challenge_page(html: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| html.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_challenge_markers() {
        assert!(is_challenge_page("<title>Just a moment...</title>"));
        assert!(is_challenge_page("<div class=\"cf-browser-verification\">"));
        assert!(!is_challenge_page("<html><body>Ubuntu 22.04 downloads</body></html>"));
    }
}
