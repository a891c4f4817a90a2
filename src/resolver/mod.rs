//! Hoster resolver registry (C5, §4.6): turns a hoster embed/page URL into a
//! `ResolvedStream` with a direct-playable URL and the headers downstream
//! clients must replay. New subsystem with no teacher counterpart (the
//! teacher only proxies torrent trackers); modeled per SPEC_FULL.md's
//! `{predicate, resolve}` registry design note (§9) and the `async-trait`
//! style the teacher uses for its own plugin-shaped traits.

pub mod streamtape;
pub mod voe;
pub mod xfs;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::{Error, Result};
use crate::models::stream::ResolvedStream;

#[async_trait]
pub trait Resolver: Send + Sync {
    fn name(&self) -> &str;
    /// Host suffixes this resolver claims, e.g. `["voe.sx", "voeunblock.com"]`.
    fn supported_domains(&self) -> &[String];
    async fn resolve(&self, url: &str) -> Result<ResolvedStream>;
}

/// Matches resolvers by host suffix in registration-priority order, with a
/// content-type probe fallback for URLs no resolver claims (§4.6, P10).
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn Resolver>>,
    probe_client: reqwest::Client,
}

impl ResolverRegistry {
    pub fn new(probe_client: reqwest::Client) -> Self {
        Self { resolvers: Vec::new(), probe_client }
    }

    pub fn register(&mut self, resolver: Arc<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// First matching resolver by host-suffix priority; ties broken by
    /// registration order (P10).
    fn find_matching(&self, host: &str) -> Option<&Arc<dyn Resolver>> {
        self.resolvers.iter().find(|resolver| {
            resolver.supported_domains().iter().any(|domain| host_matches(host, domain))
        })
    }

    /// Resolve `url`, optionally aided by a plugin-supplied hoster hint used
    /// when the visible domain is a rotating alias (§4.6).
    pub async fn resolve(&self, url: &str, hoster_hint: Option<&str>) -> Result<ResolvedStream> {
        let parsed = Url::parse(url).map_err(Error::Url)?;
        let host = parsed.host_str().unwrap_or_default();

        if let Some(resolver) = self.find_matching(host) {
            return resolver.resolve(url).await;
        }

        // P10: the content-type probe is a fallback for URLs no resolver
        // *or hint* names — a hint that names no registered resolver is a
        // caller/config error, not an invitation to probe.
        if let Some(hint) = hoster_hint {
            return match self.resolvers.iter().find(|r| r.name() == hint) {
                Some(resolver) => resolver.resolve(url).await,
                None => Err(Error::NoResolverMatched(url.to_string())),
            };
        }

        if self.is_already_direct(url).await? {
            return Ok(ResolvedStream::direct(url.to_string()));
        }

        Err(Error::NoResolverMatched(url.to_string()))
    }

    /// Content-type probe fallback: a `video/*` or known manifest MIME means
    /// the URL is already a direct, playable link.
    async fn is_already_direct(&self, url: &str) -> Result<bool> {
        let response = match self.probe_client.head(url).send().await {
            Ok(response) => response,
            Err(_) => return Ok(false),
        };

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        Ok(content_type.starts_with("video/")
            || content_type.contains("mpegurl")
            || content_type.contains("dash+xml"))
    }
}

fn host_matches(host: &str, domain_suffix: &str) -> bool {
    host == domain_suffix || host.ends_with(&format!(".{domain_suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_suffix_matches_exact_and_subdomain() {
        assert!(host_matches("voe.sx", "voe.sx"));
        assert!(host_matches("www.voe.sx", "voe.sx"));
        assert!(!host_matches("notvoe.sx", "voe.sx"));
        assert!(!host_matches("evilvoe.sx.example.com", "voe.sx"));
    }

    struct FakeResolver {
        name: String,
        domains: Vec<String>,
    }

    #[async_trait]
    impl Resolver for FakeResolver {
        fn name(&self) -> &str {
            &self.name
        }
        fn supported_domains(&self) -> &[String] {
            &self.domains
        }
        async fn resolve(&self, url: &str) -> Result<ResolvedStream> {
            Ok(ResolvedStream::direct(url.to_string()))
        }
    }

    #[tokio::test]
    async fn unmatched_hint_errors_without_probing() {
        let mut registry = ResolverRegistry::new(reqwest::Client::new());
        registry.register(Arc::new(FakeResolver {
            name: "streamtape".to_string(),
            domains: vec!["streamtape.com".to_string()],
        }));

        // Host matches no registered resolver, and the hint names one that
        // was never registered either: this must fail fast with
        // `NoResolverMatched` rather than falling through to the content-type
        // probe (P10).
        let result = registry.resolve("https://unknown-host.example/video", Some("does-not-exist")).await;
        assert!(matches!(result, Err(Error::NoResolverMatched(_))));
    }

    #[tokio::test]
    async fn matching_hint_is_used_when_host_is_unrecognized() {
        let mut registry = ResolverRegistry::new(reqwest::Client::new());
        registry.register(Arc::new(FakeResolver {
            name: "streamtape".to_string(),
            domains: vec!["streamtape.com".to_string()],
        }));

        let result = registry.resolve("https://cdn-alias.example/video", Some("streamtape")).await.unwrap();
        assert_eq!(result.direct_url, "https://cdn-alias.example/video");
    }
}
