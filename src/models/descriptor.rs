//! PluginDescriptor (§3, §4.1): static metadata read from each plugin once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provides {
    Stream,
    Download,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginMode {
    Http,
    Headless,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub provides: Provides,
    pub default_language: String,
    pub mode: PluginMode,
    /// Ordered; first entry is the primary domain (§4.2 domain failover).
    pub domains: Vec<String>,
    /// Site category tag -> Torznab category id.
    pub categories: HashMap<String, i32>,
}
