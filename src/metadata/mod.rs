//! `MetadataPort` (§4.8 addendum): the external TMDB/IMDB lookup the stream
//! use case needs to turn an IMDB id into `{title, year}` is, like the
//! hoster resolvers, an external interface (§1) rather than core logic. This
//! module defines the trait boundary plus a minimal stub client sufficient
//! to exercise steps 4.8.2-4.8.7 without committing to a specific
//! provider's auth scheme — a real deployment swaps in a TMDB- or
//! OMDb-backed implementation behind the same trait.

use async_trait::async_trait;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMetadata {
    pub title: String,
    /// Alternate-language title, used for the fuzzy title-match score (§4.8
    /// step 5) alongside the primary title.
    pub alt_title: Option<String>,
    pub year: Option<u32>,
}

#[async_trait]
pub trait MetadataPort: Send + Sync {
    /// Resolve an IMDB id (e.g. `tt0371746`) to title/year. Implementations
    /// should fall back to a secondary provider internally per §4.8 step 1;
    /// from the use case's perspective this is a single fallible call.
    async fn resolve(&self, imdb_id: &str) -> Result<TitleMetadata>;
}

/// Minimal stub: looks up nothing over the network, just parses whatever the
/// caller already has cached in its local table. Exists so the stream use
/// case and its tests don't depend on a live TMDB/OMDb credential; a real
/// deployment registers a network-backed `MetadataPort` instead.
pub struct StubMetadataClient {
    known: std::collections::HashMap<String, TitleMetadata>,
}

impl StubMetadataClient {
    pub fn new() -> Self {
        Self { known: std::collections::HashMap::new() }
    }

    pub fn with_entry(mut self, imdb_id: impl Into<String>, metadata: TitleMetadata) -> Self {
        self.known.insert(imdb_id.into(), metadata);
        self
    }
}

impl Default for StubMetadataClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataPort for StubMetadataClient {
    async fn resolve(&self, imdb_id: &str) -> Result<TitleMetadata> {
        self.known
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no metadata for {imdb_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_resolves_known_entries_and_errors_on_unknown() {
        let client = StubMetadataClient::new()
            .with_entry("tt0371746", TitleMetadata { title: "Iron Man".into(), alt_title: None, year: Some(2008) });

        let resolved = client.resolve("tt0371746").await.unwrap();
        assert_eq!(resolved.title, "Iron Man");
        assert_eq!(resolved.year, Some(2008));

        assert!(client.resolve("tt9999999").await.is_err());
    }
}
