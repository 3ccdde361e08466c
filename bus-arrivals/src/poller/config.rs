//! Polling configuration.

use std::time::Duration;

/// Default refresh period: 5 seconds.
pub const DEFAULT_REFRESH_PERIOD_MS: u64 = 5_000;

/// Error returned for an unusable refresh period.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("refresh period must be at least 1 ms, got {0} ms")]
pub struct InvalidRefreshPeriod(pub u64);

/// Configuration for the arrival poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between refreshes of the current stop (milliseconds).
    pub refresh_period_ms: u64,
}

impl PollerConfig {
    /// Create a configuration with the given refresh period.
    pub fn new(refresh_period_ms: u64) -> Self {
        Self { refresh_period_ms }
    }

    /// Returns the refresh period as a Duration.
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_period_ms)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), InvalidRefreshPeriod> {
        if self.refresh_period_ms == 0 {
            return Err(InvalidRefreshPeriod(self.refresh_period_ms));
        }
        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            refresh_period_ms: DEFAULT_REFRESH_PERIOD_MS,
        }
    }
}
