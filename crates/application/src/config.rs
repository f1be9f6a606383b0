//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the session core.
///
/// The defaults are a five-minute renewal sweep, a five-second retry
/// delay with three attempts, and a thirty-second expiry skew. None of
/// these are invariants; deployments balancing responsiveness against
/// backend load are expected to adjust them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds between background renewal checks.
    pub renewal_interval_secs: u64,
    /// Seconds between retries after a failed background renewal.
    pub retry_delay_secs: u64,
    /// Consecutive background failures tolerated before the final
    /// re-validation and forced logout.
    pub max_retry_attempts: u32,
    /// Seconds of slack when deciding whether the access token is
    /// expired, absorbing clock drift and request latency.
    pub expiry_skew_secs: i64,
    /// Days the remember-me preference stays valid.
    pub remember_me_horizon_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            renewal_interval_secs: 300,
            retry_delay_secs: 5,
            max_retry_attempts: 3,
            expiry_skew_secs: 30,
            remember_me_horizon_days: 30,
        }
    }
}

impl SessionConfig {
    /// Renewal sweep interval as a `Duration`.
    #[must_use]
    pub const fn renewal_interval(&self) -> Duration {
        Duration::from_secs(self.renewal_interval_secs)
    }

    /// Retry delay as a `Duration`.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
