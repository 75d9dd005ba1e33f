//! Status polling policy.
//!
//! `interval = min(max_interval, base_interval * growth_factor^errors) + jitter`
//! where `errors` is the number of consecutive failed status checks.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

const fn default_base_interval_ms() -> u64 {
    2_000
}

const fn default_growth_factor() -> f64 {
    1.5
}

const fn default_max_interval_ms() -> u64 {
    30_000
}

const fn default_jitter_cap_ms() -> u64 {
    1_000
}

const fn default_max_consecutive_errors() -> u32 {
    3
}

const fn default_max_attempts() -> u32 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    #[serde(default = "default_base_interval_ms")]
    pub base_interval_ms: u64,

    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,

    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Upper bound of the uniform random delay added to every interval.
    #[serde(default = "default_jitter_cap_ms")]
    pub jitter_cap_ms: u64,

    /// Back-to-back transport failures tolerated before giving up.
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,

    /// Total status checks before tracking stops without a terminal result.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: default_base_interval_ms(),
            growth_factor: default_growth_factor(),
            max_interval_ms: default_max_interval_ms(),
            jitter_cap_ms: default_jitter_cap_ms(),
            max_consecutive_errors: default_max_consecutive_errors(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub const fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    #[must_use]
    pub const fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    #[must_use]
    pub const fn jitter_cap(&self) -> Duration {
        Duration::from_millis(self.jitter_cap_ms)
    }

    /// Reject policies that would poll without bound or never back off.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "polling.base_interval_ms",
                "must be greater than zero",
            ));
        }
        if !self.growth_factor.is_finite() || self.growth_factor < 1.0 {
            return Err(ConfigError::invalid(
                "polling.growth_factor",
                format!("must be a finite number >= 1.0, got {}", self.growth_factor),
            ));
        }
        if self.max_interval_ms < self.base_interval_ms {
            return Err(ConfigError::invalid(
                "polling.max_interval_ms",
                format!(
                    "must be >= base_interval_ms ({}), got {}",
                    self.base_interval_ms, self.max_interval_ms
                ),
            ));
        }
        if self.max_consecutive_errors == 0 {
            return Err(ConfigError::invalid(
                "polling.max_consecutive_errors",
                "must be at least 1",
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("polling.max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = PollingConfig::default();
        assert_eq!(config.base_interval(), Duration::from_secs(2));
        assert!((config.growth_factor - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.max_interval(), Duration::from_secs(30));
        assert_eq!(config.jitter_cap(), Duration::from_secs(1));
        assert_eq!(config.max_consecutive_errors, 3);
        assert_eq!(config.max_attempts, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_shrinking_growth() {
        let config = PollingConfig {
            growth_factor: 0.5,
            ..PollingConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("polling.growth_factor"));
    }

    #[test]
    fn rejects_max_below_base() {
        let config = PollingConfig {
            max_interval_ms: 500,
            ..PollingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "polling.max_interval_ms"
        ));
    }

    #[test]
    fn rejects_zero_budgets() {
        let config = PollingConfig {
            max_consecutive_errors: 0,
            ..PollingConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PollingConfig {
            max_attempts: 0,
            ..PollingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
