//! Ambient config loader (A1). Precedence: defaults < TOML file < environment
//! variables < CLI flags, the last two folded in by `clap`'s `env` attribute
//! at the call site in `main.rs`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Scavengarr/0.1".to_string(),
            follow_redirects: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessConfig {
    pub enabled: bool,
    pub base_url: String,
    pub token: Option<String>,
    pub nav_timeout_secs: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:3000".to_string(),
            token: None,
            nav_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub timeout_secs: u64,
    pub concurrency: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { timeout_secs: 10, concurrency: 20 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    pub dir: Option<String>,
    pub redis_url: Option<String>,
    pub search_ttl_secs: i64,
    pub crawljob_ttl_secs: i64,
    pub stream_ttl_secs: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Local,
            dir: None,
            redis_url: None,
            search_ttl_secs: 900,
            crawljob_ttl_secs: 3600,
            stream_ttl_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Test,
    #[default]
    Prod,
}

impl Environment {
    /// §7: production collapses Torznab errors to an empty 200 feed;
    /// dev/test surface the real status.
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Prod)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub plugin_dir: Option<String>,
    pub http: HttpConfig,
    pub headless: HeadlessConfig,
    pub validator: ValidatorConfig,
    pub cache: CacheConfig,
    pub log_level: String,
    pub environment: Environment,
    pub bind_host: String,
    pub bind_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin_dir: None,
            http: HttpConfig::default(),
            headless: HeadlessConfig::default(),
            validator: ValidatorConfig::default(),
            cache: CacheConfig::default(),
            log_level: "info".to_string(),
            environment: Environment::default(),
            bind_host: "0.0.0.0".to_string(),
            bind_port: 9117,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).context("failed to read config file")?;
        let config: Config = toml::from_str(&content).context("failed to parse config file")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "scavengarr", "scavengarr")
            .context("could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn get_cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache.dir {
            return Ok(PathBuf::from(dir));
        }
        let proj_dirs = ProjectDirs::from("com", "scavengarr", "scavengarr")
            .context("could not determine config directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn get_plugin_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.plugin_dir {
            return Ok(PathBuf::from(dir));
        }
        let proj_dirs = ProjectDirs::from("com", "scavengarr", "scavengarr")
            .context("could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("plugins"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_production_and_local_cache() {
        let config = Config::default();
        assert!(config.environment.is_production());
        assert_eq!(config.cache.backend, CacheBackendKind::Local);
        assert_eq!(config.cache.search_ttl_secs, 900);
        assert_eq!(config.cache.crawljob_ttl_secs, 3600);
    }
}
