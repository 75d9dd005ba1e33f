//! Poll interval computation.
//!
//! `interval = min(max, base * growth^errors) + uniform(0, jitter_cap)`.
//! The exponential part depends only on the number of consecutive failed
//! status checks, so a healthy poll loop runs at the base interval.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reel_config::PollingConfig;

#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base: Duration,
    growth: f64,
    max: Duration,
    jitter_cap: Duration,
    rng: StdRng,
}

impl BackoffPolicy {
    #[must_use]
    pub fn from_config(config: &PollingConfig) -> Self {
        let mut thread = rand::rng();
        Self {
            base: config.base_interval(),
            growth: config.growth_factor,
            max: config.max_interval(),
            jitter_cap: config.jitter_cap(),
            rng: StdRng::from_rng(&mut thread),
        }
    }

    /// Replace the jitter source with a deterministic one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Deterministic part of the interval after `errors` consecutive failures.
    #[must_use]
    pub fn base_delay(&self, errors: u32) -> Duration {
        let exponent = i32::try_from(errors).unwrap_or(i32::MAX);
        let scaled = self.base.as_secs_f64() * self.growth.powi(exponent);
        let capped = scaled.min(self.max.as_secs_f64());
        if capped.is_finite() {
            Duration::from_secs_f64(capped.max(0.0))
        } else {
            self.max
        }
    }

    /// Full interval: [`Self::base_delay`] plus a uniform jitter.
    pub fn interval(&mut self, errors: u32) -> Duration {
        self.base_delay(errors) + self.jitter()
    }

    /// No interval ever exceeds this.
    #[must_use]
    pub fn upper_bound(&self) -> Duration {
        self.max + self.jitter_cap
    }

    fn jitter(&mut self) -> Duration {
        if self.jitter_cap.is_zero() {
            return Duration::ZERO;
        }
        let cap_ms = u64::try_from(self.jitter_cap.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(self.rng.random_range(0..=cap_ms))
    }
}
