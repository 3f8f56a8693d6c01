use crate::error::{ImpactError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default npm registry endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Largest accepted `max_concurrent`, bounded by the semaphore permit limit.
pub const MAX_CONCURRENT: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// How `RegistryClient::fetch_batch` schedules its lookups.
///
/// Both modes share the client-wide semaphore, so the number of in-flight
/// network requests never exceeds `max_concurrent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Every name is queued at once and a slot is handed out as soon as one frees.
    #[default]
    Continuous,
    /// Names are processed in chunks of `max_concurrent`; a chunk must finish
    /// completely before the next one starts.
    Chunked,
}

/// Registry client configuration.
///
/// Passed explicitly into the client constructor. Every field has a default,
/// so a partial JSON document is enough to override a single value.
///
/// # Defaults
///
/// - `registry_url`: `"https://registry.npmjs.org"`
/// - `max_concurrent`: `8`
/// - `timeout_ms`: `15000`
/// - `retry_attempts`: `2`
/// - `retry_base_delay_ms`: `1000`
/// - `batch_mode`: `continuous`
///
/// # Examples
///
/// ```
/// use depimpact_core::config::RegistryConfig;
///
/// let config: RegistryConfig = serde_json::from_str(r#"{ "max_concurrent": 5 }"#).unwrap();
/// assert_eq!(config.max_concurrent, 5);
/// assert_eq!(config.retry_attempts, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub registry_url: String,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default)]
    pub batch_mode: BatchMode,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            max_concurrent: default_max_concurrent(),
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            batch_mode: BatchMode::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl RegistryConfig {
    /// Loads a configuration from a JSON document, falling back to defaults
    /// for missing fields.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(ImpactError::InvalidConfig(
                "max_concurrent must be a positive integer".into(),
            ));
        }
        if self.max_concurrent > MAX_CONCURRENT {
            return Err(ImpactError::InvalidConfig(format!(
                "max_concurrent must not exceed {MAX_CONCURRENT}"
            )));
        }
        if self.registry_url.trim().is_empty() {
            return Err(ImpactError::InvalidConfig(
                "registry_url must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Total attempts per fetch chain; zero is treated as a single attempt.
    pub fn effective_attempts(&self) -> u32 {
        self.retry_attempts.max(1)
    }
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

const fn default_max_concurrent() -> usize {
    8
}

const fn default_timeout_ms() -> u64 {
    15_000
}

const fn default_retry_attempts() -> u32 {
    2
}

const fn default_retry_base_delay_ms() -> u64 {
    1_000
}

fn default_user_agent() -> String {
    format!("depimpact/{}", env!("CARGO_PKG_VERSION"))
}
