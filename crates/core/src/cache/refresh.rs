//! Refresh orchestration: serve from the snapshot store when fresh, fetch
//! upstream otherwise, write through on success and fall back to the last
//! known-good snapshot on failure.
//!
//! Store failures never block a response. Upstream failures only do when
//! there is no snapshot young enough to fall back to.

use super::freshness::{is_fresh, within_stale_bound};
use super::headers::build_headers;
use super::key::build_key;
use super::snapshots::{Snapshot, SnapshotStore};
use crate::Error;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::query::LeaderboardQuery;
use crate::upstream::LeaderboardSource;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// How a request was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheOutcome {
    /// Fresh snapshot served, no upstream call.
    Hit,
    /// No snapshot existed; fetched upstream.
    Miss,
    /// Forced, or the previous snapshot was stale; fetched upstream.
    Refresh,
    /// Upstream failed; an expired snapshot was served.
    Stale,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Refresh => "refresh",
            CacheOutcome::Stale => "stale",
        }
    }
}

impl fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time limits applied by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Age below which a snapshot is served without refreshing.
    pub ttl: TimeDelta,
    /// Age at or beyond which a snapshot is no longer served as a fallback.
    pub max_stale: TimeDelta,
}

impl CachePolicy {
    /// Saturates at `TimeDelta::MAX` when `ttl * max_stale_factor` overflows.
    pub fn new(ttl: TimeDelta, max_stale_factor: u32) -> Self {
        let max_stale = i32::try_from(max_stale_factor)
            .ok()
            .and_then(|factor| ttl.checked_mul(factor))
            .unwrap_or(TimeDelta::MAX);
        Self { ttl, max_stale }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.ttl(), config.max_stale_factor)
    }
}

/// Result of serving a leaderboard request.
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub outcome: CacheOutcome,
    /// Snapshot whose payload is returned. Unpersisted if the write-through failed.
    pub snapshot: Snapshot,
}

impl Served {
    pub fn payload(&self) -> &[serde_json::Value] {
        &self.snapshot.payload
    }

    pub fn into_payload(self) -> Vec<serde_json::Value> {
        self.snapshot.payload
    }
}

/// Leaderboard snapshot cache.
///
/// Constructed once per process and shared behind an `Arc`; holds no
/// per-request state and takes no locks across requests.
pub struct LeaderboardCache {
    store: Arc<dyn SnapshotStore>,
    source: Arc<dyn LeaderboardSource>,
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
}

impl LeaderboardCache {
    pub fn new(store: Arc<dyn SnapshotStore>, source: Arc<dyn LeaderboardSource>, policy: CachePolicy) -> Self {
        Self { store, source, policy, clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Serve a leaderboard, refreshing from upstream when needed.
    ///
    /// # Errors
    ///
    /// - `InvalidQuery` before any store or upstream interaction.
    /// - `UpstreamUnavailable` when the fetch fails and no snapshot younger
    ///   than `max_stale` exists.
    pub async fn serve(&self, query: &LeaderboardQuery, force_refresh: bool) -> Result<Served, Error> {
        query.validate()?;
        let key = build_key(query);

        let cached = match self.store.read(&key).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "snapshot read failed, treating as cache miss");
                None
            }
        };

        let cached = match cached {
            Some(snapshot) if !force_refresh && is_fresh(&snapshot, self.policy.ttl, self.clock.now()) => {
                tracing::debug!(key = %key, game = %key.game(), "cache hit");
                return Ok(Served { outcome: CacheOutcome::Hit, snapshot });
            }
            other => other,
        };

        let outcome = if force_refresh || cached.is_some() { CacheOutcome::Refresh } else { CacheOutcome::Miss };

        match self.source.fetch(key.query()).await {
            Ok(payload) => {
                let snapshot = match self.store.upsert(&key, &payload).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "snapshot write failed, serving unpersisted payload");
                        Snapshot::unpersisted(&key, payload, self.clock.now())
                    }
                };
                tracing::debug!(key = %key, outcome = %outcome, entries = snapshot.payload.len(), "fetched upstream");
                Ok(Served { outcome, snapshot })
            }
            Err(upstream) => match cached {
                Some(snapshot) if within_stale_bound(&snapshot, self.policy.max_stale, self.clock.now()) => {
                    tracing::warn!(
                        key = %key,
                        error = %upstream,
                        fetched_at = %snapshot.fetched_at,
                        "upstream fetch failed, serving stale snapshot"
                    );
                    Ok(Served { outcome: CacheOutcome::Stale, snapshot })
                }
                Some(snapshot) => {
                    tracing::warn!(
                        key = %key,
                        error = %upstream,
                        fetched_at = %snapshot.fetched_at,
                        "upstream fetch failed and snapshot exceeds maximum staleness"
                    );
                    Err(Error::UpstreamUnavailable(upstream))
                }
                None => {
                    tracing::warn!(key = %key, error = %upstream, "upstream fetch failed with no snapshot to fall back to");
                    Err(Error::UpstreamUnavailable(upstream))
                }
            },
        }
    }

    /// Response headers describing how `served` was produced.
    pub fn response_headers(&self, served: &Served) -> BTreeMap<&'static str, String> {
        build_headers(served.outcome, Some(&served.snapshot), self.policy.ttl, self.clock.now())
    }
}
