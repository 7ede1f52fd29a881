//! Centralized configuration for the voketag clients
//!
//! `Config` is immutable after construction and cheap to share behind an
//! `Arc`. Build it with [`crate::ConfigLoader`].

use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use voketag_core::{
    POLL_ERROR_BACKOFF_MS, POLL_INTERVAL_MS, POLL_MAX_ATTEMPTS, SCAN_RETRY_DELAY_MS,
    SCAN_TIMEOUT_MS,
};

/// Immutable configuration shared by every command.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URLs of the three backends plus the public verify site
    pub endpoints: Endpoints,

    /// Batch status polling parameters
    pub polling: PollingSettings,

    /// HTTP behavior
    pub http: HttpSettings,

    /// Where the session (tokens, CSRF cache) is persisted
    pub session_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Admin console API, e.g. `http://127.0.0.1:8082`
    pub admin_api: Url,
    /// Factory API including its version prefix, e.g. `http://localhost:8081/v1`
    pub factory_api: Url,
    /// Consumer scan API, e.g. `http://localhost:8080`
    pub scan_api: Url,
    /// Public verification site used in NTAG exports
    pub verify_url: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingSettings {
    /// Pause between successful status reads
    pub interval: Duration,
    /// Pause after a failed status read
    pub error_backoff: Duration,
    /// Give up after this many non-terminal reads
    pub max_attempts: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            error_backoff: Duration::from_millis(POLL_ERROR_BACKOFF_MS),
            max_attempts: POLL_MAX_ATTEMPTS,
        }
    }
}

impl PollingSettings {
    /// Wall-clock budget implied by interval × attempts (6 minutes by default)
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// Per-request timeout for admin and factory calls
    pub timeout: Duration,
    /// Timeout for the consumer scan call
    pub scan_timeout: Duration,
    /// Pause before the single scan retry
    pub scan_retry_delay: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            scan_timeout: Duration::from_millis(SCAN_TIMEOUT_MS),
            scan_retry_delay: Duration::from_millis(SCAN_RETRY_DELAY_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_polling_budget_is_six_minutes() {
        let polling = PollingSettings::default();
        assert_eq!(polling.interval, Duration::from_secs(3));
        assert_eq!(polling.max_attempts, 120);
        assert_eq!(polling.budget(), Duration::from_secs(360));
    }

    #[test]
    fn test_default_http_settings() {
        let http = HttpSettings::default();
        assert_eq!(http.scan_timeout, Duration::from_secs(15));
        assert_eq!(http.scan_retry_delay, Duration::from_millis(500));
    }
}
