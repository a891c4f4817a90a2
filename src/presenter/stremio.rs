//! Stremio addon JSON (§4.11, §6): manifest, catalog passthrough, and the
//! ranked stream list. The addon's only real resource is `stream`; catalog
//! is declared for protocol completeness but returns an empty list since
//! this project indexes hosters, not its own media library (see DESIGN.md).

use serde::Serialize;
use serde_json::{Value, json};

use crate::models::RankedStream;

pub const ADDON_ID: &str = "org.scavengarr.addon";
pub const ADDON_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn manifest() -> Value {
    json!({
        "id": ADDON_ID,
        "version": ADDON_VERSION,
        "name": "Scavengarr",
        "description": "Self-hosted meta-indexer providing ranked streams from scraped hosters.",
        "resources": ["stream", "catalog"],
        "types": ["movie", "series"],
        "catalogs": [],
        "idPrefixes": ["tt"],
    })
}

/// `catalog/{type}/{id}.json` passthrough: this addon has no catalog of its
/// own, so every request returns an empty result set.
pub fn catalog() -> Value {
    json!({ "metas": [] })
}

#[derive(Debug, Serialize)]
struct StreamEntry {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(rename = "behaviorHints", skip_serializing_if = "is_default_hints")]
    behavior_hints: crate::models::BehaviorHints,
}

fn is_default_hints(hints: &crate::models::BehaviorHints) -> bool {
    !hints.not_web_ready && hints.proxy_headers.is_none()
}

/// `stream/{type}/{id}.json` body (§4.11): one entry per ranked candidate,
/// in the order the stream use case already ranked them.
pub fn stream_list(ranked: &[RankedStream], play_base_url: &str) -> Value {
    let streams: Vec<StreamEntry> = ranked
        .iter()
        .map(|stream| {
            let display_title = match (&stream.quality, &stream.hoster) {
                (Some(quality), Some(hoster)) => format!("{} [{quality}] ({hoster})", stream.title),
                (Some(quality), None) => format!("{} [{quality}]", stream.title),
                (None, Some(hoster)) => format!("{} ({hoster})", stream.title),
                (None, None) => stream.title.clone(),
            };

            let url = stream
                .direct_url
                .clone()
                .or_else(|| stream.play_url.as_ref().map(|id| format!("{play_base_url}/{id}")));

            StreamEntry { title: display_title, url, behavior_hints: stream.behavior_hints.clone() }
        })
        .collect();

    json!({ "streams": streams })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BehaviorHints;

    fn ranked(title: &str, direct: Option<&str>, play: Option<&str>) -> RankedStream {
        RankedStream {
            title: title.to_string(),
            release_name: title.to_string(),
            quality: Some("1080p".to_string()),
            language: Some("de".to_string()),
            size_bytes: None,
            hoster: Some("streamtape".to_string()),
            score: 1.0,
            play_url: play.map(str::to_string),
            direct_url: direct.map(str::to_string),
            behavior_hints: BehaviorHints::default(),
        }
    }

    #[test]
    fn prefers_direct_url_over_play_indirection() {
        let streams = vec![ranked("Iron Man", Some("https://direct/a"), Some("stream-id"))];
        let value = stream_list(&streams, "/api/v1/stremio/play");
        assert_eq!(value["streams"][0]["url"], "https://direct/a");
    }

    #[test]
    fn falls_back_to_play_indirection_when_no_direct_url() {
        let streams = vec![ranked("Iron Man", None, Some("stream-id"))];
        let value = stream_list(&streams, "/api/v1/stremio/play");
        assert_eq!(value["streams"][0]["url"], "/api/v1/stremio/play/stream-id");
    }

    #[test]
    fn manifest_declares_stream_resource() {
        let value = manifest();
        assert_eq!(value["resources"][0], "stream");
    }
}
