//! Error taxonomy for Scavengarr (§7). One variant family per bullet in the
//! spec's error kind list; `#[from]` conversions mirror the teacher's error
//! module shape.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // --- Input ---
    #[error("malformed query: {0}")]
    Input(String),
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    // --- Discovery / Load (C6) ---
    #[error("plugin not found: {0}")]
    PluginNotFound(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("plugin load error: {0}")]
    PluginLoad(String),
    #[error("duplicate plugin name: {0}")]
    DuplicatePlugin(String),

    // --- Transport ---
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    Deadline,

    // --- HTTP status ---
    #[error("http 4xx: {status} {body}")]
    Http4xx { status: u16, body: String },
    #[error("http 5xx: {status} {body}")]
    Http5xx { status: u16, body: String },

    // --- Parse ---
    #[error("parse error: {0}")]
    Parse(String),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yml::Error),

    // --- Challenge ---
    #[error("challenge unresolved: {0}")]
    Challenge(String),

    // --- Resolver (C5) ---
    #[error("no resolver matched for url: {0}")]
    NoResolverMatched(String),
    #[error("resolver failed for {hoster}: {reason}")]
    ResolverFailed { hoster: String, reason: String },
    #[error("hoster offline: {0}")]
    HosterOffline(String),

    // --- Storage ---
    #[error("cache backend unavailable: {0}")]
    CacheUnavailable(String),
    #[error("serialization failure: {0}")]
    Serialization(String),

    // --- IO / misc ---
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Maps a taxonomy member to the development-mode HTTP status (§7); in
    /// production the HTTP layer ignores this and always returns 200.
    pub fn dev_status_code(&self) -> u16 {
        match self {
            Error::Input(_) | Error::UnsupportedAction(_) => 400,
            Error::PluginNotFound(_) | Error::NotFound(_) => 404,
            Error::Http4xx { .. } => 422,
            Error::Transport(_)
            | Error::Cancelled
            | Error::Deadline
            | Error::Http5xx { .. }
            | Error::Challenge(_) => 502,
            Error::CacheUnavailable(_) | Error::HosterOffline(_) => 503,
            _ => 500,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Http5xx { .. } | Error::Transport(_))
    }
}
