//! Core data entities for Scavengarr (§3).

pub mod category;
pub mod crawljob;
pub mod descriptor;
pub mod query;
pub mod result;
pub mod stream;

pub use category::{CATEGORIES, Category, get_category, parent_category};
pub use crawljob::{CrawlJob, DEFAULT_TTL_SECS, MEDIA_TYPE, ParsedCrawlJob, Priority};
pub use descriptor::{PluginDescriptor, PluginMode, Provides};
pub use query::{Action, Query};
pub use result::{DownloadLink, SearchResult};
pub use stream::{BehaviorHints, ProxyHeaders, ProxyHeadersRequest, RankedStream, ResolvedStream};
