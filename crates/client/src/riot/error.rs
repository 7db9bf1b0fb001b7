//! Riot API client error types.

use ladder_core::UpstreamError;
use std::sync::Arc;

/// Errors from the Riot ranked-league client.
#[derive(Debug, thiserror::Error)]
pub enum RiotError {
    /// No API key configured.
    #[error("missing API key: LADDER_RIOT_API_KEY not set")]
    MissingApiKey,

    /// Authentication failed (invalid or expired API key).
    #[error("authentication failed: status {status}")]
    AuthError { status: u16 },

    /// Rate limited by the Riot API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RiotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { RiotError::Timeout } else { RiotError::Network(Arc::new(err)) }
    }
}

impl From<RiotError> for UpstreamError {
    /// Auth failures are our misconfiguration, not the caller's, so they
    /// surface as 502 rather than 401/403.
    fn from(err: RiotError) -> Self {
        let status = match &err {
            RiotError::HttpError { status } => Some(*status),
            RiotError::RateLimited => Some(429),
            RiotError::Timeout => Some(504),
            RiotError::AuthError { .. } | RiotError::MissingApiKey => Some(502),
            RiotError::Network(_) | RiotError::Parse(_) => None,
        };
        UpstreamError::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(RiotError::MissingApiKey.to_string().contains("API key"));
        assert!(RiotError::HttpError { status: 503 }.to_string().contains("503"));
    }

    #[test]
    fn test_upstream_status_mapping() {
        let cases = [
            (RiotError::HttpError { status: 404 }, Some(404)),
            (RiotError::RateLimited, Some(429)),
            (RiotError::Timeout, Some(504)),
            (RiotError::AuthError { status: 403 }, Some(502)),
            (RiotError::Parse("eof".into()), None),
        ];
        for (err, expected) in cases {
            let upstream = UpstreamError::from(err);
            assert_eq!(upstream.status, expected, "{}", upstream.message);
        }
    }
}
