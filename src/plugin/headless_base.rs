//! Headless-mode plugin base (C7, §4.3): shares the process-wide
//! `HeadlessPool`; each call is a single rendering RPC plus the stricter
//! concurrency cap the spec requires for browser-backed plugins.

use std::sync::Arc;

use crate::error::Result;
use crate::headless::{HeadlessPool, RenderOptions};

pub struct HeadlessPluginBase {
    pool: Arc<HeadlessPool>,
}

impl HeadlessPluginBase {
    pub fn new(pool: Arc<HeadlessPool>) -> Self {
        Self { pool }
    }

    /// Render `url`, waiting on `wait_for_selector` if given rather than a
    /// fixed sleep (§4.3). Concurrency is bounded inside the shared pool, so
    /// plugin code never needs its own semaphore here.
    pub async fn render(&self, url: &str, wait_for_selector: Option<&str>) -> Result<String> {
        let options = RenderOptions {
            wait_for_selector: wait_for_selector.map(str::to_string),
            ..RenderOptions::default()
        };
        self.pool.content(url, &options).await
    }
}
