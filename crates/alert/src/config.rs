//! Alert service configuration.

use std::time::Duration;

/// Seconds between reminders when nothing changes (0 disables).
const ENV_REMINDER_SECS: &str = "ALERT_REMINDER_SECS";
/// Seconds between purges of stale history (0 disables).
const ENV_PURGE_INTERVAL_SECS: &str = "ALERT_PURGE_INTERVAL_SECS";
/// Per-channel delivery budget in milliseconds.
const ENV_CHANNEL_TIMEOUT_MS: &str = "ALERT_CHANNEL_TIMEOUT_MS";
/// How long shutdown waits for background tasks, in milliseconds.
const ENV_SHUTDOWN_TIMEOUT_MS: &str = "ALERT_SHUTDOWN_TIMEOUT_MS";
/// Set to "true" to register no channels.
const ENV_ALERT_DISABLED: &str = "ALERT_DISABLED";

/// Configuration for the alert service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    /// Remind channels after this long without changes
    pub reminder: Option<Duration>,
    /// Purge stale history on this interval
    pub purge_interval: Option<Duration>,
    /// Time budget for a single channel delivery
    pub channel_timeout: Duration,
    /// Time budget for background tasks to stop on shutdown
    pub shutdown_timeout: Duration,
    /// Run without any channels
    pub disabled: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            reminder: None,
            purge_interval: Some(Duration::from_secs(3600)),
            channel_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(3),
            disabled: false,
        }
    }
}

impl AlertConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reminder: env_u64(ENV_REMINDER_SECS).map_or(defaults.reminder, non_zero_secs),
            purge_interval: env_u64(ENV_PURGE_INTERVAL_SECS)
                .map_or(defaults.purge_interval, non_zero_secs),
            channel_timeout: env_u64(ENV_CHANNEL_TIMEOUT_MS)
                .map_or(defaults.channel_timeout, Duration::from_millis),
            shutdown_timeout: env_u64(ENV_SHUTDOWN_TIMEOUT_MS)
                .map_or(defaults.shutdown_timeout, Duration::from_millis),
            disabled: std::env::var(ENV_ALERT_DISABLED)
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
