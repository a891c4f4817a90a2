//! ResolvedStream (produced by hoster resolvers, §4.6) and RankedStream (the
//! Stremio-facing entity produced by the stream use case, §4.8).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A direct, playable URL plus the headers a client must replay to use it
/// without getting a 403 from the hoster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedStream {
    pub direct_url: String,
    pub headers_required: HashMap<String, String>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub hoster_name: String,
}

impl ResolvedStream {
    /// Used when the content-type probe fallback (§4.6) determines a URL is
    /// already directly playable and no resolver needs to run.
    pub fn direct(url: String) -> Self {
        Self {
            direct_url: url,
            headers_required: HashMap::new(),
            expires_at: None,
            hoster_name: "direct".to_string(),
        }
    }

    pub fn referer(&self) -> Option<&str> {
        self.headers_required.get("Referer").map(String::as_str)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers_required.get("User-Agent").map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxyHeadersRequest {
    #[serde(skip_serializing_if = "Option::is_none", rename = "Referer")]
    pub referer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "User-Agent")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxyHeaders {
    pub request: ProxyHeadersRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BehaviorHints {
    #[serde(rename = "notWebReady")]
    pub not_web_ready: bool,
    #[serde(rename = "proxyHeaders", skip_serializing_if = "Option::is_none")]
    pub proxy_headers: Option<ProxyHeaders>,
}

/// One scored, ranked candidate stream, ready for the Stremio presenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedStream {
    pub title: String,
    pub release_name: String,
    pub quality: Option<String>,
    pub language: Option<String>,
    pub size_bytes: Option<u64>,
    pub hoster: Option<String>,
    pub score: f64,
    /// Either a lazy `/play/{stream_id}` indirection or an eagerly resolved
    /// direct URL (top N per §4.8 step 7).
    pub play_url: Option<String>,
    pub direct_url: Option<String>,
    pub behavior_hints: BehaviorHints,
}
