//! XFS-family parametric resolver (§4.6, §9): many file-host scripts share
//! one page layout (a direct-download form POST keyed by a file id extracted
//! from the URL path), so one config-driven resolver covers the whole
//! family instead of one hand-written module per clone.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::models::stream::ResolvedStream;
use crate::resolver::Resolver;

static DOWNLOAD_FORM_ACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<form[^>]+action="([^"]+)"[^>]*id="F1DownloadForm""#).unwrap());

/// Declarative description of one XFS-family hoster clone.
pub struct XfsConfig {
    pub name: String,
    pub domains: Vec<String>,
    /// Pattern extracting the file id from the embed/page URL path.
    pub file_id_pattern: Regex,
    /// Substrings in the page body that mark the file as removed/offline.
    pub offline_markers: Vec<String>,
}

pub struct XfsResolver {
    config: XfsConfig,
    client: reqwest::Client,
}

impl XfsResolver {
    pub fn new(config: XfsConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn extract_file_id(&self, url: &str) -> Option<String> {
        self.config.file_id_pattern.captures(url)?.get(1).map(|m| m.as_str().to_string())
    }
}

#[async_trait]
impl Resolver for XfsResolver {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn supported_domains(&self) -> &[String] {
        &self.config.domains
    }

    async fn resolve(&self, url: &str) -> Result<ResolvedStream> {
        let _file_id = self
            .extract_file_id(url)
            .ok_or_else(|| Error::ResolverFailed {
                hoster: self.config.name.clone(),
                reason: "could not extract file id from url".to_string(),
            })?;

        let response = self.client.get(url).send().await.map_err(Error::Transport)?;
        let body = response.text().await.map_err(Error::Transport)?;

        if self.config.offline_markers.iter().any(|marker| body.contains(marker)) {
            return Err(Error::HosterOffline(self.config.name.clone()));
        }

        let action = DOWNLOAD_FORM_ACTION_RE
            .captures(&body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| Error::ResolverFailed {
                hoster: self.config.name.clone(),
                reason: "download form not found".to_string(),
            })?;

        let mut headers_required = HashMap::new();
        headers_required.insert("Referer".to_string(), url.to_string());
        headers_required.insert(
            "User-Agent".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        );

        Ok(ResolvedStream {
            direct_url: action,
            headers_required,
            expires_at: None,
            hoster_name: self.config.name.clone(),
        })
    }
}
