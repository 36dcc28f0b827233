//! Application configuration management.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Exchange rates keyed by currency pair (e.g., "EUR_USD").
    pub exchange_rates: HashMap<String, Decimal>,
    /// Notification dispatch configuration.
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Notification dispatch configuration.
///
/// The dispatcher is fully decoupled from the ledger commit path; these
/// settings only bound its queue, concurrency, and resilience policy.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Base URL of the external notification service.
    #[serde(default = "default_notification_url")]
    pub url: String,
    /// Capacity of the bounded event queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Maximum number of in-flight sends.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum retry attempts after the initial send.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff between retries in milliseconds (doubles per attempt).
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Consecutive failures before the circuit breaker opens.
    #[serde(default = "default_failure_threshold")]
    pub breaker_failure_threshold: u32,
    /// Seconds the breaker stays open before allowing a probe.
    #[serde(default = "default_breaker_cooldown_secs")]
    pub breaker_cooldown_secs: u64,
}

fn default_notification_url() -> String {
    "http://localhost:9090/notifications".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

fn default_workers() -> usize {
    4
}

fn default_timeout_ms() -> u64 {
    2_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    100
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_breaker_cooldown_secs() -> u64 {
    30
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            url: default_notification_url(),
            queue_capacity: default_queue_capacity(),
            workers: default_workers(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            breaker_failure_threshold: default_failure_threshold(),
            breaker_cooldown_secs: default_breaker_cooldown_secs(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KRONA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
