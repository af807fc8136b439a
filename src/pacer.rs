use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Process-wide pacing of navigations per search-engine host.
///
/// Every tracker call gets its own browser session, so without this two
/// concurrent requests could hit the same host back to back. Callers for the
/// same host queue on a per-host slot; different hosts never wait on each
/// other.
#[derive(Debug, Default)]
pub struct HostPacer {
    min_interval: Duration,
    last_request: DashMap<String, Arc<Mutex<Option<Instant>>>>,
}

impl HostPacer {
    pub fn new(min_interval: Duration) -> Self {
        HostPacer {
            min_interval,
            last_request: DashMap::new(),
        }
    }

    /// Wait until a navigation to `host` is allowed, then claim the slot.
    pub async fn wait_turn(&self, host: &str) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = self
            .last_request
            .entry(host.to_string())
            .or_default()
            .value()
            .clone();

        let mut last = slot.lock().await;
        if let Some(previous) = *last {
            let next_allowed = previous + self.min_interval;
            if next_allowed > Instant::now() {
                tracing::debug!(host, "pacing navigation");
                tokio::time::sleep_until(next_allowed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
