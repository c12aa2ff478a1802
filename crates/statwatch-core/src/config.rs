//! Poller configuration.
//!
//! Defaults reproduce the values the poller has always shipped with; the
//! daemon overrides them from command-line flags or the environment.

use std::time::Duration;

/// Default statistics endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://srv.msk01.gigacorp.local/_stats";
/// Default pause between cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
/// Default number of consecutive failed cycles before giving up.
pub const DEFAULT_MAX_FAILURES: u32 = 3;
/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Limits above which a warning is printed. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Maximum load average.
    pub load: f64,
    /// Maximum used/total memory ratio.
    pub memory: f64,
    /// Maximum used/total disk ratio.
    pub disk: f64,
    /// Maximum used/total network bandwidth ratio.
    pub network: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            load: 30.0,
            memory: 0.8,
            disk: 0.9,
            network: 0.9,
        }
    }
}

/// Everything the poll loop needs to know at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    pub endpoint: String,
    pub interval: Duration,
    /// Consecutive failures at which the loop terminates. Never zero.
    pub max_failures: u32,
    pub timeout: Duration,
    pub thresholds: Thresholds,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            interval: DEFAULT_INTERVAL,
            max_failures: DEFAULT_MAX_FAILURES,
            timeout: DEFAULT_TIMEOUT,
            thresholds: Thresholds::default(),
        }
    }
}

impl PollerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the failure ceiling, clamped to at least one.
    pub fn with_max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures.max(1);
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}
