use std::env;
use std::time::Duration;

use crate::error::{PostError, Result};

pub const DEFAULT_URL: &str = "http://localhost:8081/v1/users/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DEADLINE_SECS: u64 = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;
pub const DEFAULT_CACHE_CLEANUP_SECS: u64 = 10 * 60;
/// Upper bound for the request timeout and the overall deadline
pub const MAX_DEADLINE_SECS: u64 = 24 * 60 * 60;

/// Exponential backoff parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    pub initial_interval: Duration,
    pub multiplier: f64,
    /// Jitter applied as `interval * (1 ± randomization_factor)`
    pub randomization_factor: f64,
    pub max_interval: Duration,
    /// Total time budget for retries, measured from the last reset
    pub max_elapsed_time: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            multiplier: 2.0,
            randomization_factor: 0.5,
            max_interval: Duration::from_secs(5),
            max_elapsed_time: Duration::from_secs(5),
        }
    }
}

impl BackoffConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_interval.is_zero() {
            return Err(PostError::InvalidConfig(
                "initial_interval must be greater than zero".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(PostError::InvalidConfig(format!(
                "multiplier must be >= 1, got {}",
                self.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.randomization_factor) {
            return Err(PostError::InvalidConfig(format!(
                "randomization_factor must be within [0, 1], got {}",
                self.randomization_factor
            )));
        }
        if self.max_interval < self.initial_interval {
            return Err(PostError::InvalidConfig(format!(
                "max_interval ({:?}) is shorter than initial_interval ({:?})",
                self.max_interval, self.initial_interval
            )));
        }
        if self.max_elapsed_time.is_zero() {
            return Err(PostError::InvalidConfig(
                "max_elapsed_time must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    /// Per-attempt timeout handed to the HTTP client
    pub request_timeout: Duration,
    /// Overall deadline for the whole retry loop
    pub deadline: Duration,
    pub cache_ttl: Duration,
    pub cache_cleanup_interval: Duration,
    pub backoff: BackoffConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_cleanup_interval: Duration::from_secs(DEFAULT_CACHE_CLEANUP_SECS),
            backoff: BackoffConfig::default(),
        }
    }
}

impl Config {
    /// Build the configuration from defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("RESILIENT_POST_URL") {
            config.url = url;
        }
        if let Some(secs) = read_secs("RESILIENT_POST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_secs("RESILIENT_POST_DEADLINE_SECS")? {
            config.deadline = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(PostError::InvalidConfig("url must not be empty".to_string()));
        }
        reqwest::Url::parse(&self.url)
            .map_err(|e| PostError::InvalidConfig(format!("invalid url '{}': {}", self.url, e)))?;

        if self.request_timeout.is_zero() || self.deadline.is_zero() {
            return Err(PostError::InvalidConfig(
                "request_timeout and deadline must be greater than zero".to_string(),
            ));
        }
        let max = Duration::from_secs(MAX_DEADLINE_SECS);
        if self.request_timeout > max || self.deadline > max {
            return Err(PostError::InvalidConfig(format!(
                "request_timeout and deadline must not exceed {}s",
                MAX_DEADLINE_SECS
            )));
        }
        if self.cache_ttl.is_zero() {
            return Err(PostError::InvalidConfig(
                "cache_ttl must be greater than zero".to_string(),
            ));
        }

        self.backoff.validate()
    }
}

fn read_secs(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| PostError::InvalidConfig(format!("{} must be whole seconds, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
