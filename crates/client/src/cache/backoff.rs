//! Retry delays for failed reads.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff applied to a cache entry after failed fetches.
///
/// The delay after the `n`th consecutive failure is `base * 2^(n-1)`, capped
/// at `max`. With jitter enabled the delay is drawn uniformly from the upper
/// half of that window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub max: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            max: Duration::from_secs(60),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Retry on the very next read.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            base: Duration::ZERO,
            max: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay before the next attempt after `failures` consecutive failures.
    #[must_use]
    pub fn delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        // 2^20 is far past any sensible cap
        let exponent = failures.saturating_sub(1).min(20);
        let full = self.base.saturating_mul(1 << exponent).min(self.max);

        if !self.jitter {
            return full;
        }

        let millis = u64::try_from(full.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(millis / 2..=millis))
    }
}
