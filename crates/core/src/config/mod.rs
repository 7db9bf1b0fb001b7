//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LADDER_*)
//! 2. TOML config file (if LADDER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LADDER_*)
/// 2. TOML config file (if LADDER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite snapshot database.
    ///
    /// Set via LADDER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Socket address the HTTP server binds to.
    ///
    /// Set via LADDER_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Riot Games API key used by the upstream client.
    ///
    /// Set via LADDER_RIOT_API_KEY environment variable.
    /// Required only when the server starts its upstream client.
    #[serde(default)]
    pub riot_api_key: Option<String>,

    /// Upstream base URL; `{region}` is replaced with the platform code.
    ///
    /// Set via LADDER_UPSTREAM_BASE_URL environment variable.
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// User-Agent string for upstream requests.
    ///
    /// Set via LADDER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream request timeout in milliseconds.
    ///
    /// Set via LADDER_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Minimum spacing between upstream requests in milliseconds.
    ///
    /// Set via LADDER_MIN_REQUEST_INTERVAL_MS environment variable.
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// Snapshot time-to-live in seconds.
    ///
    /// Set via LADDER_TTL_SECS environment variable.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Stale snapshots older than `ttl_secs * max_stale_factor` are not
    /// served when the upstream fails.
    ///
    /// Set via LADDER_MAX_STALE_FACTOR environment variable.
    #[serde(default = "default_max_stale_factor")]
    pub max_stale_factor: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./ladder-cache.sqlite")
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".into()
}

fn default_upstream_base_url() -> String {
    "https://{region}.api.riotgames.com".into()
}

fn default_user_agent() -> String {
    "ladder-cache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_min_request_interval_ms() -> u64 {
    50
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_stale_factor() -> u32 {
    24
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            riot_api_key: None,
            upstream_base_url: default_upstream_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            min_request_interval_ms: default_min_request_interval_ms(),
            ttl_secs: default_ttl_secs(),
            max_stale_factor: default_max_stale_factor(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Snapshot TTL.
    pub fn ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.ttl_secs as i64)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LADDER_`
    /// 2. TOML file from `LADDER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LADDER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("LADDER_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Return the Riot API key or explain how to set it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is unset or blank.
    pub fn require_riot_api_key(&self) -> Result<&str, ConfigError> {
        self.riot_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "riot_api_key".into(),
                hint: "Set LADDER_RIOT_API_KEY environment variable".into(),
            })
    }
}
