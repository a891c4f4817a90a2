//! Per-plugin metrics and circuit breaker (C15, §4.12). Grounded on the
//! teacher's `db::cleanup_cache`-adjacent statistics tracking pattern (plain
//! structs behind a lock, no external metrics crate in the teacher's stack),
//! generalized to a per-plugin table with the breaker state machine P9
//! requires.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Error-rate threshold (consecutive failures) that trips the breaker open.
const FAILURE_THRESHOLD: u32 = 5;
/// Cooldown before an open breaker admits a half-open probe.
const OPEN_COOLDOWN: Duration = Duration::from_secs(60);
/// Extended cooldown applied when a half-open probe itself fails.
const HALF_OPEN_FAILURE_COOLDOWN: Duration = Duration::from_secs(180);
/// EWMA smoothing factor for latency (closer to 1 = more weight on history).
const LATENCY_ALPHA: f64 = 0.2;

#[derive(Debug, Default)]
pub struct PluginCounters {
    pub attempts: AtomicU64,
    pub successes: AtomicU64,
    pub timeouts: AtomicU64,
    pub errors: AtomicU64,
    latency_ewma_millis: RwLock<f64>,
}

impl PluginCounters {
    pub async fn record_latency(&self, elapsed: Duration) {
        let sample = elapsed.as_millis() as f64;
        let mut ewma = self.latency_ewma_millis.write().await;
        *ewma = if *ewma == 0.0 { sample } else { LATENCY_ALPHA * sample + (1.0 - LATENCY_ALPHA) * *ewma };
    }

    pub async fn latency_ewma_millis(&self) -> f64 {
        *self.latency_ewma_millis.read().await
    }

    pub fn snapshot(&self) -> PluginCountersSnapshot {
        PluginCountersSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginCountersSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub timeouts: u64,
    pub errors: u64,
}

/// Circuit breaker state machine (P9): `closed` admits all calls;
/// `open` rejects without executing until the cooldown elapses; `half_open`
/// admits exactly one probe, success closes, failure re-opens with an
/// extended cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct BreakerEntry {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    cooldown: Duration,
    /// True while a half-open probe is in flight, so concurrent callers
    /// don't all slip through as "the one admitted probe".
    probe_in_flight: bool,
}

impl Default for BreakerEntry {
    fn default() -> Self {
        Self {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            cooldown: OPEN_COOLDOWN,
            probe_in_flight: false,
        }
    }
}

pub struct Metrics {
    counters: RwLock<HashMap<String, std::sync::Arc<PluginCounters>>>,
    breakers: RwLock<HashMap<String, BreakerEntry>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self { counters: RwLock::new(HashMap::new()), breakers: RwLock::new(HashMap::new()) }
    }

    pub async fn counters_for(&self, plugin: &str) -> std::sync::Arc<PluginCounters> {
        if let Some(c) = self.counters.read().await.get(plugin) {
            return c.clone();
        }
        let mut counters = self.counters.write().await;
        counters.entry(plugin.to_string()).or_default().clone()
    }

    pub async fn snapshot_all(&self) -> HashMap<String, PluginCountersSnapshot> {
        self.counters.read().await.iter().map(|(name, c)| (name.clone(), c.snapshot())).collect()
    }

    /// Returns whether a call to `plugin` may proceed right now. Transitions
    /// `open -> half_open` when the cooldown has elapsed, admitting exactly
    /// one caller as the probe.
    pub async fn may_call(&self, plugin: &str) -> bool {
        let mut breakers = self.breakers.write().await;
        let entry = breakers.entry(plugin.to_string()).or_default();

        match entry.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => {
                if entry.probe_in_flight {
                    false
                } else {
                    entry.probe_in_flight = true;
                    true
                }
            }
            BreakerState::Open => {
                let elapsed = entry.opened_at.map(|t| t.elapsed()).unwrap_or(Duration::ZERO);
                if elapsed >= entry.cooldown {
                    entry.state = BreakerState::HalfOpen;
                    entry.probe_in_flight = true;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub async fn record_success(&self, plugin: &str) {
        let mut breakers = self.breakers.write().await;
        let entry = breakers.entry(plugin.to_string()).or_default();
        entry.consecutive_failures = 0;
        entry.probe_in_flight = false;
        entry.state = BreakerState::Closed;
        entry.opened_at = None;
        entry.cooldown = OPEN_COOLDOWN;
    }

    pub async fn record_failure(&self, plugin: &str) {
        let mut breakers = self.breakers.write().await;
        let entry = breakers.entry(plugin.to_string()).or_default();
        entry.probe_in_flight = false;

        match entry.state {
            BreakerState::HalfOpen => {
                entry.state = BreakerState::Open;
                entry.opened_at = Some(Instant::now());
                entry.cooldown = HALF_OPEN_FAILURE_COOLDOWN;
                entry.consecutive_failures = 0;
            }
            BreakerState::Closed => {
                entry.consecutive_failures += 1;
                if entry.consecutive_failures >= FAILURE_THRESHOLD {
                    entry.state = BreakerState::Open;
                    entry.opened_at = Some(Instant::now());
                    entry.cooldown = OPEN_COOLDOWN;
                }
            }
            BreakerState::Open => {}
        }
    }

    pub async fn breaker_state(&self, plugin: &str) -> BreakerState {
        self.breakers.read().await.get(plugin).map(|e| e.state).unwrap_or(BreakerState::Closed)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn breaker_opens_at_threshold_and_half_opens_after_cooldown() {
        let metrics = Metrics::new();
        for _ in 0..FAILURE_THRESHOLD {
            assert!(metrics.may_call("p").await);
            metrics.record_failure("p").await;
        }
        assert_eq!(metrics.breaker_state("p").await, BreakerState::Open);
        assert!(!metrics.may_call("p").await);
    }

    #[tokio::test]
    async fn half_open_admits_one_probe_success_closes() {
        let metrics = Metrics::new();
        for _ in 0..FAILURE_THRESHOLD {
            metrics.record_failure("p").await;
        }
        {
            let mut breakers = metrics.breakers.write().await;
            let entry = breakers.get_mut("p").unwrap();
            entry.opened_at = Some(Instant::now() - Duration::from_secs(120));
        }
        assert!(metrics.may_call("p").await);
        assert_eq!(metrics.breaker_state("p").await, BreakerState::HalfOpen);
        assert!(!metrics.may_call("p").await, "second concurrent caller must not slip through");

        metrics.record_success("p").await;
        assert_eq!(metrics.breaker_state("p").await, BreakerState::Closed);
    }

    #[tokio::test]
    async fn half_open_failure_reopens_with_extended_cooldown() {
        let metrics = Metrics::new();
        for _ in 0..FAILURE_THRESHOLD {
            metrics.record_failure("p").await;
        }
        {
            let mut breakers = metrics.breakers.write().await;
            breakers.get_mut("p").unwrap().opened_at = Some(Instant::now() - Duration::from_secs(120));
        }
        assert!(metrics.may_call("p").await);
        metrics.record_failure("p").await;
        assert_eq!(metrics.breaker_state("p").await, BreakerState::Open);
    }
}
