//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `user_agent` is empty
    /// - `timeout_ms` is outside 15s..=25s
    /// - `max_retries` is 0 or exceeds 10
    /// - `backoff_ms` exceeds 10s
    /// - `max_bytes` is 0 or exceeds 50MB
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.timeout_ms < 15_000 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 15000ms".into() });
        }
        if self.timeout_ms > 25_000 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must not exceed 25000ms".into() });
        }

        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(ConfigError::Invalid { field: "max_retries".into(), reason: "must be between 1 and 10".into() });
        }

        if self.backoff_ms > 10_000 {
            return Err(ConfigError::Invalid { field: "backoff_ms".into(), reason: "must not exceed 10000ms".into() });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.max_redirects == 0 {
            tracing::warn!("max_redirects is 0; redirected product pages will fail to fetch");
        }

        Ok(())
    }
}
