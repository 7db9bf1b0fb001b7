//! Core types and shared functionality for the ladder snapshot cache.
//!
//! This crate provides:
//! - Leaderboard query model and normalization
//! - Snapshot cache with SQLite backend and refresh orchestration
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod query;
pub mod upstream;

pub use cache::{
    CacheDb, CacheKey, CacheOutcome, CachePolicy, LeaderboardCache, Served, Snapshot, SnapshotStore, build_headers,
    build_key, is_fresh,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use query::{Game, LeaderboardQuery};
pub use upstream::{LeaderboardSource, UpstreamError};
