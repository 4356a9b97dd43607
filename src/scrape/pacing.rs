//! Pacing policy: politeness delays and rate-limit backoff.
//!
//! Two kinds of wait exist, and they are orthogonal:
//!
//! - The **politeness delay** is a randomized pause inserted before every
//!   non-initial page fetch, so request timing is not uniform enough to
//!   trigger automated-abuse defenses.
//! - The **rate-limit backoff** is a mandated wait until the reset time the
//!   server reported when it throttled us.
//!
//! Both are plain timed sleeps on the single retrieval task; no scheduler
//! coordination is required.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, instrument, warn};

/// Default lower bound for the politeness delay.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(5);

/// Default upper bound for the politeness delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Error type for pacing policy construction.
#[derive(Debug, thiserror::Error)]
pub enum PacingError {
    /// The configured delay interval is inverted.
    #[error("invalid politeness delay range: min {min_ms}ms exceeds max {max_ms}ms")]
    InvalidRange {
        /// Configured minimum in milliseconds.
        min_ms: u64,
        /// Configured maximum in milliseconds.
        max_ms: u64,
    },
}

/// Wait-duration policy for the retrieval loop.
///
/// Politeness delays are drawn uniformly at random from the closed interval
/// `[min_delay, max_delay]`. The default interval is 5-10 seconds.
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    /// Inclusive lower bound for the politeness delay.
    min_delay: Duration,
    /// Inclusive upper bound for the politeness delay.
    max_delay: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl PacingPolicy {
    /// Creates a pacing policy with a custom politeness delay interval.
    ///
    /// # Errors
    ///
    /// Returns [`PacingError::InvalidRange`] when `min_delay > max_delay`.
    #[instrument(level = "debug")]
    pub fn new(min_delay: Duration, max_delay: Duration) -> Result<Self, PacingError> {
        if min_delay > max_delay {
            return Err(PacingError::InvalidRange {
                min_ms: min_delay.as_millis() as u64,
                max_ms: max_delay.as_millis() as u64,
            });
        }
        Ok(Self {
            min_delay,
            max_delay,
        })
    }

    /// Returns the inclusive politeness delay bounds.
    #[must_use]
    pub fn delay_bounds(&self) -> (Duration, Duration) {
        (self.min_delay, self.max_delay)
    }

    /// Draws one politeness delay uniformly from the configured interval.
    #[must_use]
    pub fn politeness_delay(&self) -> Duration {
        let min_ms = self.min_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let mut rng = rand::thread_rng();
        Duration::from_millis(rng.gen_range(min_ms..=max_ms))
    }

    /// Sleeps for one randomized politeness delay.
    ///
    /// Applied before every page fetch that continues an existing result
    /// set; the initial fetch is never delayed.
    #[instrument(level = "debug", skip(self))]
    pub async fn politeness_pause(&self) {
        let delay = self.politeness_delay();
        debug!(delay_ms = delay.as_millis(), "waiting before next request");
        tokio::time::sleep(delay).await;
    }

    /// Blocks until the server-reported rate-limit reset time.
    ///
    /// Returns immediately when `retry_at` is already in the past. The
    /// fetch that triggered the limit is retried afterwards with the same
    /// cursor, so rate limiting is transparent to pagination state.
    #[instrument(level = "debug", skip(self))]
    pub async fn backoff_pause(&self, retry_at: DateTime<Utc>) {
        let wait = backoff_duration(retry_at);
        warn!(
            wait_secs = wait.as_secs(),
            retry_at = %retry_at,
            "rate limited, waiting for reset"
        );
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

/// Computes `max(0, retry_at - now)`. Never negative.
#[must_use]
pub fn backoff_duration(retry_at: DateTime<Utc>) -> Duration {
    (retry_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
}
