//! The inbound Query entity (§3), immutable for the lifetime of one request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Caps,
    Search,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub plugin_name: String,
    pub q: Option<String>,
    pub category: Option<i32>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub extended: bool,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl Query {
    /// Query normalized the same way on every call: trimmed, lowercased. Used
    /// both for fingerprinting (§4.7) and for plugin-side matching.
    pub fn normalized_q(&self) -> String {
        self.q
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase()
    }

    /// A search is either a real text query, or an extended reachability probe
    /// with an empty `q` (§6, scenario 3).
    pub fn is_reachability_probe(&self) -> bool {
        self.extended && self.q.as_deref().map(str::trim).unwrap_or("").is_empty()
    }
}
