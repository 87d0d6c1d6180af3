//! Crate-wide configuration defaults.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ConfigError;

const ENV_DEFAULT_MAX_ITERATIONS: &str = "AR_CORE_DEFAULT_MAX_ITERATIONS";
const ENV_MIN_MAX_ITERATIONS: &str = "AR_CORE_MIN_MAX_ITERATIONS";
const ENV_MAX_MAX_ITERATIONS: &str = "AR_CORE_MAX_MAX_ITERATIONS";
const ENV_ADAPTER_RETRIES: &str = "AR_CORE_ADAPTER_RETRIES";
const ENV_ADAPTER_DEADLINE_SECS: &str = "AR_CORE_ADAPTER_DEADLINE_SECS";

/// Bounds and defaults for `create_thread`'s `max_iterations` parameter,
/// and the retry/deadline policy applied to external adapter calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub default_max_iterations: u32,
    pub min_max_iterations: u32,
    pub max_max_iterations: u32,
    /// Number of retries attempted on a single external call before the
    /// orchestrator gives up and stops the thread with an error. The
    /// spec pins this at one; more aggressive policies belong at the
    /// adapter layer.
    pub adapter_retries: u32,
    pub adapter_deadline: Duration,
}

impl CoreConfig {
    pub fn validate_max_iterations(&self, value: u32) -> Result<u32, ConfigError> {
        if value < self.min_max_iterations || value > self.max_max_iterations {
            return Err(ConfigError::MaxIterationsOutOfRange {
                value,
                min: self.min_max_iterations,
                max: self.max_max_iterations,
            });
        }
        Ok(value)
    }

    /// Load configuration from environment variables, falling back to
    /// [`CoreConfig::default`] for anything unset. Mirrors the teacher's
    /// `Config::from_env` (read-if-present, parse-or-error).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var(ENV_DEFAULT_MAX_ITERATIONS) {
            config.default_max_iterations = parse_env(ENV_DEFAULT_MAX_ITERATIONS, &raw)?;
        }
        if let Ok(raw) = env::var(ENV_MIN_MAX_ITERATIONS) {
            config.min_max_iterations = parse_env(ENV_MIN_MAX_ITERATIONS, &raw)?;
        }
        if let Ok(raw) = env::var(ENV_MAX_MAX_ITERATIONS) {
            config.max_max_iterations = parse_env(ENV_MAX_MAX_ITERATIONS, &raw)?;
        }
        if let Ok(raw) = env::var(ENV_ADAPTER_RETRIES) {
            config.adapter_retries = parse_env(ENV_ADAPTER_RETRIES, &raw)?;
        }
        if let Ok(raw) = env::var(ENV_ADAPTER_DEADLINE_SECS) {
            let secs: u64 = parse_env(ENV_ADAPTER_DEADLINE_SECS, &raw)?;
            config.adapter_deadline = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("could not parse \"{raw}\""),
    })
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_max_iterations: 5,
            min_max_iterations: 1,
            max_max_iterations: 20,
            adapter_retries: 1,
            adapter_deadline: Duration::from_secs(30),
        }
    }
}
