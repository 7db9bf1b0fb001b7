//! Leaderboard snapshot cache.
//!
//! Sits between HTTP handlers and the upstream ranking API:
//!
//! - Deterministic cache keys from normalized queries (`key`)
//! - SQLite snapshot store with upsert-by-key (`connection`, `snapshots`)
//! - TTL freshness and bounded staleness (`freshness`)
//! - Refresh orchestration with write-through and stale fallback (`refresh`)
//! - Cache status response headers (`headers`)

pub mod connection;
pub mod freshness;
pub mod headers;
pub mod key;
pub mod migrations;
pub mod refresh;
pub mod snapshots;

pub use crate::Error;

pub use connection::CacheDb;
pub use freshness::{is_fresh, within_stale_bound};
pub use headers::{CACHE_EXPIRES, CACHE_STATUS, build_headers, http_date};
pub use key::{CacheKey, build_key};
pub use refresh::{CacheOutcome, CachePolicy, LeaderboardCache, Served};
pub use snapshots::{Snapshot, SnapshotStore};
