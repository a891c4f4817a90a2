//! Plugin registry and contract (C6, §4.1). Grounded on the teacher's
//! `Indexer` trait + `IndexerManager`, generalized from a dynamically loaded
//! YAML-definition model to a compile-time factory table: plugins here are
//! trusted, compiled-in Rust code, so "discovery" is a manifest lookup
//! rather than a filesystem scan for loadable modules.

pub mod headless_base;
pub mod http_base;
pub mod plugins;
pub mod toolkit;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::models::descriptor::PluginDescriptor;
use crate::models::query::Query;
use crate::models::result::SearchResult;

/// Uniform contract across HTTP and headless plugins (§4.1).
#[async_trait]
pub trait Plugin: Send + Sync {
    fn descriptor(&self) -> &PluginDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Must respect an ambient cancellation/deadline signal carried by the
    /// caller's tokio task (cancellation is cooperative, §5).
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>>;

    /// Releases any long-lived resources. Default no-op: most plugins only
    /// hold a pooled HTTP client, which drops cleanly on its own.
    async fn cleanup(&self) {}
}

pub type PluginFactory = fn() -> Arc<dyn Plugin>;

/// One entry in the compile-time plugin manifest.
pub struct PluginManifestEntry {
    pub name: &'static str,
    pub factory: PluginFactory,
}

/// Per-plugin on-disk override: rate limit and enabled/disabled flag,
/// consulted at `discover()` time (§4.1) without executing any plugin code.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PluginOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub rate_limit_delay_seconds: Option<f64>,
}

pub struct PluginRegistry {
    manifest: HashMap<&'static str, PluginFactory>,
    overrides: RwLock<HashMap<String, PluginOverride>>,
    instances: RwLock<HashMap<String, Arc<dyn Plugin>>>,
    /// Per-name construction lock: serializes the first `get()` for a given
    /// plugin so concurrent search traffic doesn't double-construct it.
    construction_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    override_dir: Option<std::path::PathBuf>,
}

impl PluginRegistry {
    pub fn new(entries: &[PluginManifestEntry], override_dir: Option<std::path::PathBuf>) -> Self {
        let manifest = entries.iter().map(|e| (e.name, e.factory)).collect();
        Self {
            manifest,
            overrides: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
            construction_locks: Mutex::new(HashMap::new()),
            override_dir,
        }
    }

    /// Records override files only; never executes plugin code. Idempotent.
    pub async fn discover(&self) -> Result<()> {
        let mut overrides = self.overrides.write().await;
        overrides.clear();

        let Some(dir) = &self.override_dir else { return Ok(()) };
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(Error::Io)?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "toml") {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
                match std::fs::read_to_string(&path) {
                    Ok(content) => match toml::from_str::<PluginOverride>(&content) {
                        Ok(plugin_override) => {
                            overrides.insert(stem.to_string(), plugin_override);
                        }
                        Err(e) => tracing::warn!(path = %path.display(), error = %e, "invalid plugin override"),
                    },
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not read plugin override"),
                }
            }
        }
        Ok(())
    }

    /// Declared names of every discovered plugin, metadata only, no I/O.
    pub fn list_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.manifest.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub async fn is_enabled(&self, name: &str) -> bool {
        let overrides = self.overrides.read().await;
        overrides.get(name).and_then(|o| o.enabled).unwrap_or(true)
    }

    /// Returns a cached plugin instance, constructing it on first access.
    /// First access for a given name is serialized.
    pub async fn get(&self, name: &str) -> Result<Arc<dyn Plugin>> {
        if let Some(plugin) = self.instances.read().await.get(name) {
            return Ok(plugin.clone());
        }

        let factory = *self.manifest.get(name).ok_or_else(|| Error::PluginNotFound(name.to_string()))?;

        let lock = {
            let mut locks = self.construction_locks.lock().await;
            locks.entry(name.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        let _guard = lock.lock().await;

        // Re-check after acquiring the construction lock: another task may
        // have finished building this plugin while we waited.
        if let Some(plugin) = self.instances.read().await.get(name) {
            return Ok(plugin.clone());
        }

        let plugin = factory();
        if plugin.name() != name {
            return Err(Error::PluginLoad(format!(
                "manifest name {name} does not match descriptor name {}",
                plugin.name()
            )));
        }

        self.instances.write().await.insert(name.to_string(), plugin.clone());
        Ok(plugin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::descriptor::{PluginMode, Provides};

    struct StubPlugin(PluginDescriptor);

    #[async_trait]
    impl Plugin for StubPlugin {
        fn descriptor(&self) -> &PluginDescriptor {
            &self.0
        }

        async fn search(&self, _query: &Query) -> Result<Vec<SearchResult>> {
            Ok(Vec::new())
        }
    }

    fn stub_factory() -> Arc<dyn Plugin> {
        Arc::new(StubPlugin(PluginDescriptor {
            name: "stub".to_string(),
            provides: Provides::Download,
            default_language: "en".to_string(),
            mode: PluginMode::Http,
            domains: vec!["stub.example".to_string()],
            categories: HashMap::new(),
        }))
    }

    #[tokio::test]
    async fn get_unknown_plugin_errors() {
        let registry = PluginRegistry::new(&[], None);
        let result = registry.get("missing").await;
        assert!(matches!(result, Err(Error::PluginNotFound(_))));
    }

    #[tokio::test]
    async fn get_constructs_and_caches() {
        let manifest = [PluginManifestEntry { name: "stub", factory: stub_factory }];
        let registry = PluginRegistry::new(&manifest, None);
        let first = registry.get("stub").await.unwrap();
        let second = registry.get("stub").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn list_names_is_sorted() {
        let manifest = [
            PluginManifestEntry { name: "zeta", factory: stub_factory },
            PluginManifestEntry { name: "alpha", factory: stub_factory },
        ];
        let registry = PluginRegistry::new(&manifest, None);
        assert_eq!(registry.list_names(), vec!["alpha", "zeta"]);
    }
}
