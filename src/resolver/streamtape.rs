//! Streamtape resolver (§4.6): the direct URL is assembled from two page
//! variables (`robotlink`, `token`) split across the HTML to deter naive
//! scraping, joined with a fixed delimiter.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::models::stream::ResolvedStream;
use crate::resolver::Resolver;

static ROBOTLINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"id="robotlink"[^>]*>([^<]+)<"#).unwrap());
static TOKEN_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"token=([A-Za-z0-9]+)&expires"#).unwrap());

pub struct StreamtapeResolver {
    domains: Vec<String>,
    client: reqwest::Client,
}

impl StreamtapeResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { domains: vec!["streamtape.com".to_string()], client }
    }
}

#[async_trait]
impl Resolver for StreamtapeResolver {
    fn name(&self) -> &str {
        "streamtape"
    }

    fn supported_domains(&self) -> &[String] {
        &self.domains
    }

    async fn resolve(&self, url: &str) -> Result<ResolvedStream> {
        let response = self.client.get(url).send().await.map_err(Error::Transport)?;
        let body = response.text().await.map_err(Error::Transport)?;

        let robotlink = ROBOTLINK_RE
            .captures(&body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .ok_or_else(|| Error::ResolverFailed {
                hoster: "streamtape".to_string(),
                reason: "robotlink not found".to_string(),
            })?;

        let token = TOKEN_SUFFIX_RE
            .captures(&body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let direct_url = format!("https:{robotlink}&stream=1&token={token}");

        let mut headers_required = HashMap::new();
        headers_required.insert("Referer".to_string(), url.to_string());
        headers_required.insert(
            "User-Agent".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        );

        Ok(ResolvedStream {
            direct_url,
            headers_required,
            expires_at: None,
            hoster_name: "streamtape".to_string(),
        })
    }
}
