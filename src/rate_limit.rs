use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

use crate::metrics::RATE_LIMIT_WAIT;

pub const DEFAULT_RATE_LIMIT_SECONDS: u64 = 5;

/// Process-wide gate that keeps upstream calls at least `interval` apart.
///
/// The timestamp is read, waited on and updated while holding one lock, so two
/// concurrent callers can never both see a stale value and skip the wait.
/// Waiters queue behind the lock in FIFO order.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_call_at: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call_at: Mutex::new(None),
        }
    }

    pub fn from_secs(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    // Blocks until `interval` has passed since the previous acquire returned.
    // Returns how long this caller had to wait.
    pub async fn acquire(&self) -> Duration {
        let mut last_call_at = self.last_call_at.lock().await;

        let waited = match *last_call_at {
            Some(last) => {
                let elapsed = last.elapsed();
                if elapsed < self.interval {
                    let wait = self.interval - elapsed;
                    tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limit: waiting");
                    sleep(wait).await;
                    wait
                } else {
                    Duration::ZERO
                }
            }
            // first call never waits
            None => Duration::ZERO,
        };

        *last_call_at = Some(Instant::now());
        RATE_LIMIT_WAIT.observe(waited.as_secs_f64());
        waited
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_secs(DEFAULT_RATE_LIMIT_SECONDS)
    }
}
