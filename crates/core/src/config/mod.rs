//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRODUCT_MCP_*)
//! 2. TOML config file (if PRODUCT_MCP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Status codes that are retried by the page fetcher.
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRODUCT_MCP_*)
/// 2. TOML config file (if PRODUCT_MCP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string sent with page requests.
    ///
    /// Set via PRODUCT_MCP_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header sent with page requests.
    ///
    /// Set via PRODUCT_MCP_ACCEPT_LANGUAGE environment variable.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PRODUCT_MCP_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Total attempts per page, first request included.
    ///
    /// Set via PRODUCT_MCP_MAX_RETRIES environment variable.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff between attempts in milliseconds; doubles on each retry.
    ///
    /// Set via PRODUCT_MCP_BACKOFF_MS environment variable.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Maximum bytes to read per page.
    ///
    /// Set via PRODUCT_MCP_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects to follow.
    ///
    /// Set via PRODUCT_MCP_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; ProductMCP/1.2)".into()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.8,zh-TW;q=0.7".into()
}

fn default_timeout_ms() -> u64 {
    25_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    300
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base backoff as Duration.
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PRODUCT_MCP_`
    /// 2. TOML file from `PRODUCT_MCP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered provider stack used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRODUCT_MCP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("PRODUCT_MCP_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from an arbitrary provider stack.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.user_agent, "Mozilla/5.0 (compatible; ProductMCP/1.2)");
        assert_eq!(config.accept_language, "en-US,en;q=0.8,zh-TW;q=0.7");
        assert_eq!(config.timeout_ms, 25_000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_ms, 300);
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(25_000));
        assert_eq!(config.backoff(), Duration::from_millis(300));
    }

    #[test]
    fn test_load_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PRODUCT_MCP_TIMEOUT_MS", "15000");
            jail.set_env("PRODUCT_MCP_USER_AGENT", "test-agent/1.0");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.timeout_ms, 15_000);
            assert_eq!(config.user_agent, "test-agent/1.0");
            assert_eq!(config.max_retries, 3);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("product-mcp.toml", "max_retries = 5\nbackoff_ms = 100\n")?;
            jail.set_env("PRODUCT_MCP_CONFIG_FILE", "product-mcp.toml");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.max_retries, 5);
            assert_eq!(config.backoff_ms, 100);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("product-mcp.toml", "timeout_ms = 20000\n")?;
            jail.set_env("PRODUCT_MCP_CONFIG_FILE", "product-mcp.toml");
            jail.set_env("PRODUCT_MCP_TIMEOUT_MS", "18000");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.timeout_ms, 18_000);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PRODUCT_MCP_MAX_RETRIES", "0");

            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_retries"));
            Ok(())
        });
    }
}
