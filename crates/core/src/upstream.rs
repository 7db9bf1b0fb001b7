//! Upstream ranking source boundary.
//!
//! The orchestrator treats the source as an opaque asynchronous producer of
//! leaderboard payloads. Retries and timeouts belong to the implementation.

use crate::query::LeaderboardQuery;
use serde_json::Value;

/// Failure reported by an upstream source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UpstreamError {
    /// HTTP status the source wants surfaced to callers, if any.
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

/// Producer of freshly computed leaderboard payloads.
#[async_trait::async_trait]
pub trait LeaderboardSource: Send + Sync {
    /// Fetch the ordered leaderboard entries for a normalized query.
    async fn fetch(&self, query: &LeaderboardQuery) -> Result<Vec<Value>, UpstreamError>;
}
