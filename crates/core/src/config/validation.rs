//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use std::net::SocketAddr;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `ttl_secs` is 0 or exceeds 24 hours
    /// - `max_stale_factor` is 0 or exceeds 1000
    /// - `user_agent` is empty
    /// - `bind_addr` is not a socket address
    /// - `upstream_base_url` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.ttl_secs == 0 {
            return Err(invalid("ttl_secs", "must be greater than 0"));
        }
        if self.ttl_secs > 86_400 {
            return Err(invalid("ttl_secs", "must not exceed 24 hours (86400s)"));
        }

        if self.max_stale_factor == 0 {
            return Err(invalid("max_stale_factor", "must be at least 1"));
        }
        if self.max_stale_factor > 1_000 {
            return Err(invalid("max_stale_factor", "must not exceed 1000"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(invalid("bind_addr", "must be a socket address such as 127.0.0.1:3000"));
        }

        if !(self.upstream_base_url.starts_with("http://") || self.upstream_base_url.starts_with("https://")) {
            return Err(invalid("upstream_base_url", "must start with http:// or https://"));
        }

        if self.upstream_base_url.starts_with("http://") {
            tracing::warn!(
                upstream_base_url = %self.upstream_base_url,
                "upstream_base_url uses plain http; the API key will be sent unencrypted"
            );
        }

        Ok(())
    }
}
