//! Retry policy with jittered exponential delay
//!
//! ```text
//! attempt n:  lo = base * mult^n
//!             hi = min(cap, base * mult^(n+1))
//!             delay ~ uniform[lo, hi)      (delay = cap once lo >= cap)
//! ```

use std::time::Duration;

use contracts::RetryConfig;
use rand::Rng;

/// Bounded retry policy for hard write failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    /// Ceiling for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            base_delay: config.base_delay(),
            multiplier: config.multiplier.max(1.0),
            max_delay: config.max_delay(),
        }
    }
}

impl RetryPolicy {
    /// Delay range for `attempt`, already clamped to the cap
    ///
    /// Returns `(lo, hi)` with `lo <= hi`; the range is empty only when
    /// the lower bound has reached the cap.
    pub fn delay_bounds(&self, attempt: u32) -> (Duration, Duration) {
        let lo = self.scaled(attempt);
        let hi = self.scaled(attempt.saturating_add(1)).min(self.max_delay);
        if lo >= self.max_delay {
            (self.max_delay, self.max_delay)
        } else {
            (lo, hi.max(lo))
        }
    }

    /// Random delay before retrying after `attempt`
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        self.jittered_delay_with(attempt, &mut rand::rng())
    }

    pub fn jittered_delay_with<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let (lo, hi) = self.delay_bounds(attempt);
        if lo >= hi {
            return lo;
        }
        rng.random_range(lo..hi)
    }

    /// True while another attempt is allowed after `attempts` failures
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts < self.max_retries
    }

    /// `base * multiplier^exp`, saturating instead of overflowing
    fn scaled(&self, exp: u32) -> Duration {
        let factor = self.multiplier.powi(exp.min(i32::MAX as u32) as i32);
        let nanos = self.base_delay.as_nanos() as f64 * factor;
        if !nanos.is_finite() || nanos >= u64::MAX as f64 {
            return Duration::from_nanos(u64::MAX);
        }
        Duration::from_nanos(nanos as u64)
    }
}
