//! Application context (§9 "Global state"): every process-wide singleton —
//! HTTP client, headless pool, plugin registry, validator, resolver
//! registry, the three cache namespaces, metrics/breaker table — created
//! once at startup and handed to use cases and the HTTP layer by reference.
//! No implicit globals; everything is reachable only through `AppContext`.
//! Grounded on the teacher's `server::AppState`, generalized from a
//! config+db-pool pair into the full set this spec's use cases need.

use std::sync::Arc;

use crate::cache::{CachePort, NS_SEARCH, NS_STREAM, NamespacedCache, RedisCache, SqliteCache};
use crate::config::{CacheBackendKind, Config};
use crate::engine::ScrapingEngine;
use crate::error::Result;
use crate::headless::HeadlessPool;
use crate::http_client;
use crate::metadata::{MetadataPort, StubMetadataClient};
use crate::metrics::Metrics;
use crate::plugin::PluginRegistry;
use crate::plugin::plugins::PLUGIN_MANIFEST;
use crate::repository::CrawlJobRepository;
use crate::resolver::ResolverRegistry;
use crate::resolver::streamtape::StreamtapeResolver;
use crate::resolver::voe::VoeResolver;
use crate::resolver::xfs::{XfsConfig, XfsResolver};
use crate::validator::Validator;

pub struct AppContext {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub plugin_registry: PluginRegistry,
    pub engine: ScrapingEngine,
    pub validator: Arc<Validator>,
    pub resolver_registry: ResolverRegistry,
    pub headless_pool: Option<Arc<HeadlessPool>>,
    pub search_cache: NamespacedCache,
    pub stream_cache: NamespacedCache,
    pub crawljob_repo: CrawlJobRepository,
    pub metrics: Metrics,
    pub metadata: Arc<dyn MetadataPort>,
    cache_port: Arc<dyn CachePort>,
}

impl AppContext {
    pub async fn build(config: Config) -> Result<Self> {
        let http_client = http_client::build_client(&config.http)?;

        let plugin_registry = PluginRegistry::new(PLUGIN_MANIFEST, config.get_plugin_dir().ok());
        plugin_registry.discover().await?;

        let validator = Arc::new(Validator::new(http_client.clone(), &config.validator));
        let engine = ScrapingEngine::new(validator.clone());

        let mut resolver_registry = ResolverRegistry::new(http_client.clone());
        resolver_registry.register(Arc::new(StreamtapeResolver::new(http_client.clone())));
        resolver_registry.register(Arc::new(VoeResolver::new(http_client.clone())));
        for xfs_config in default_xfs_configs() {
            resolver_registry.register(Arc::new(XfsResolver::new(xfs_config, http_client.clone())));
        }

        let headless_pool = if config.headless.enabled {
            Some(Arc::new(HeadlessPool::new(&config.headless, 2)?))
        } else {
            None
        };

        let cache_port: Arc<dyn CachePort> = match config.cache.backend {
            CacheBackendKind::Local => {
                let dir = config
                    .get_cache_dir()
                    .map_err(|e| crate::error::Error::Config(e.to_string()))?;
                std::fs::create_dir_all(&dir).map_err(crate::error::Error::Io)?;
                Arc::new(SqliteCache::open(dir.join("cache.sqlite3"), 8)?)
            }
            CacheBackendKind::Remote => {
                let url = config.cache.redis_url.clone().ok_or_else(|| {
                    crate::error::Error::Config("cache.backend = remote requires cache.redis_url".into())
                })?;
                Arc::new(RedisCache::connect(&url).await?)
            }
        };

        let search_cache = NamespacedCache::new(cache_port.clone(), NS_SEARCH);
        let stream_cache = NamespacedCache::new(cache_port.clone(), NS_STREAM);
        let crawljob_repo = CrawlJobRepository::new(cache_port.clone(), config.cache.crawljob_ttl_secs);

        Ok(Self {
            config,
            http_client,
            plugin_registry,
            engine,
            validator,
            resolver_registry,
            headless_pool,
            search_cache,
            stream_cache,
            crawljob_repo,
            metrics: Metrics::new(),
            metadata: Arc::new(StubMetadataClient::new()),
            cache_port,
        })
    }

    /// Tear down in reverse order of acquisition (§9, §5): only the cache
    /// backend holds a resource (connection/file handle) worth closing
    /// explicitly; the HTTP client and registries drop cleanly.
    pub async fn shutdown(&self) -> Result<()> {
        self.cache_port.close().await
    }
}

fn default_xfs_configs() -> Vec<XfsConfig> {
    vec![XfsConfig {
        name: "rapidgator".to_string(),
        domains: vec!["rapidgator.net".to_string()],
        file_id_pattern: regex::Regex::new(r"/file/([a-zA-Z0-9]+)").unwrap(),
        offline_markers: vec!["File not found".to_string(), "deleted by its owner".to_string()],
    }]
}
