//! Per-host request spacing

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Enforces a minimum delay between consecutive requests to the same host.
///
/// The first request to a host never waits. The last-access stamp is taken
/// after the wait completes, so it covers every attempt, not only successful
/// ones. The clock is mutex-guarded; independent fetch loops may share one
/// throttle to stay polite host-wide.
#[derive(Debug)]
pub struct HostThrottle {
    delay: Duration,
    last_access: Mutex<HashMap<String, Instant>>,
}

impl HostThrottle {
    /// Create a throttle with the given minimum per-host spacing.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_access: Mutex::new(HashMap::new()),
        }
    }

    /// The configured minimum spacing.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until at least `delay` has passed since the previous request to
    /// `host`, then stamp the access.
    pub async fn wait(&self, host: &str) {
        if self.delay.is_zero() {
            return;
        }

        let pause = {
            let clock = self.last_access.lock().expect("throttle clock poisoned");
            clock
                .get(host)
                .map(|last| self.delay.saturating_sub(last.elapsed()))
                .unwrap_or(Duration::ZERO)
        };

        if !pause.is_zero() {
            debug!(host, pause_ms = pause.as_millis() as u64, "throttling request");
            sleep(pause).await;
        }

        let mut clock = self.last_access.lock().expect("throttle clock poisoned");
        clock.insert(host.to_string(), Instant::now());
    }
}
