//! VOE resolver (§4.6, scenario 6): VOE embeds obfuscate the direct `.m3u8`
//! URL behind a base64-reversed JSON blob inside a `<script>` tag. No
//! challenge/attest flow, so this stays a plain fetch-and-decode resolver —
//! the headless fallback is reserved for hosters that gate behind Cloudflare.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::stream::ResolvedStream;
use crate::resolver::Resolver;

static OBFUSCATED_PAYLOAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<script type="application/json">\["(.+?)"\]</script>"#).unwrap());

#[derive(Deserialize)]
struct VoePayload {
    file: Option<String>,
    source: Option<String>,
}

pub struct VoeResolver {
    domains: Vec<String>,
    client: reqwest::Client,
}

impl VoeResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { domains: vec!["voe.sx".to_string(), "voeunblock.com".to_string()], client }
    }

    /// VOE reverses the base64 string before encoding it; reversing it back
    /// yields valid base64 JSON.
    fn decode_payload(raw: &str) -> Option<String> {
        let reversed: String = raw.chars().rev().collect();
        let bytes = base64::engine::general_purpose::STANDARD.decode(reversed).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[async_trait]
impl Resolver for VoeResolver {
    fn name(&self) -> &str {
        "voe"
    }

    fn supported_domains(&self) -> &[String] {
        &self.domains
    }

    async fn resolve(&self, url: &str) -> Result<ResolvedStream> {
        let response = self.client.get(url).send().await.map_err(Error::Transport)?;
        let body = response.text().await.map_err(Error::Transport)?;

        let raw_payload = OBFUSCATED_PAYLOAD_RE
            .captures(&body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| Error::ResolverFailed {
                hoster: "voe".to_string(),
                reason: "embedded payload not found".to_string(),
            })?;

        let decoded = Self::decode_payload(&raw_payload).ok_or_else(|| Error::ResolverFailed {
            hoster: "voe".to_string(),
            reason: "payload decode failed".to_string(),
        })?;

        let payload: VoePayload = serde_json::from_str(&decoded)?;
        let direct_url = payload
            .source
            .or(payload.file)
            .ok_or_else(|| Error::ResolverFailed {
                hoster: "voe".to_string(),
                reason: "payload missing source/file".to_string(),
            })?;

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
            hoster_name: "voe".to_string(),
        })
    }
}
