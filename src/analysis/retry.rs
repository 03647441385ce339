use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Bounded retry with exponential backoff, applied per position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 50,
            multiplier: 2.0,
            max_backoff_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before the attempt following failed attempt number `attempt`
    /// (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let delay = self.initial_backoff_ms as f64 * self.multiplier.powi(exponent);
        Duration::from_millis(delay.min(self.max_backoff_ms as f64) as u64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::InvalidRetryPolicy(format!(
                "multiplier must be at least 1, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}
