//! Snapshot store: read and upsert leaderboard snapshots by cache key.
//!
//! One row per key. Upserts overwrite the payload wholesale, so concurrent
//! writers resolve as last-write-wins with no merge step.

use super::connection::CacheDb;
use super::key::CacheKey;
use crate::Error;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A persisted copy of a previously fetched leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cache key digest.
    pub key: String,
    /// Ordered leaderboard entries, opaque to the cache.
    pub payload: Vec<Value>,
    /// Time of the upstream fetch that produced `payload`.
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot that has not been written to the store.
    pub fn unpersisted(key: &CacheKey, payload: Vec<Value>, fetched_at: DateTime<Utc>) -> Self {
        Self { key: key.digest().to_string(), payload, fetched_at }
    }

    /// Time elapsed since the fetch, as seen at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.fetched_at
    }

    /// When the snapshot stops being fresh under `ttl`.
    pub fn expires_at(&self, ttl: TimeDelta) -> DateTime<Utc> {
        self.fetched_at + ttl
    }
}

/// Keyed snapshot persistence used by the refresh orchestrator.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot for `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored; errors are reserved
    /// for an unavailable or corrupt store.
    async fn read(&self, key: &CacheKey) -> Result<Option<Snapshot>, Error>;

    /// Write or overwrite the snapshot for `key`, stamping `fetched_at` now.
    ///
    /// Returns the stored row as read back after the write.
    async fn upsert(&self, key: &CacheKey, payload: &[Value]) -> Result<Snapshot, Error>;
}

type SnapshotRow = (String, String, String);

fn decode_row((key, payload_json, fetched_at): SnapshotRow) -> Result<Snapshot, Error> {
    let payload: Vec<Value> = serde_json::from_str(&payload_json)
        .map_err(|e| Error::CorruptSnapshot(format!("payload for {key}: {e}")))?;
    let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
        .map_err(|e| Error::CorruptSnapshot(format!("fetched_at for {key}: {e}")))?
        .with_timezone(&Utc);
    Ok(Snapshot { key, payload, fetched_at })
}

fn select_row(conn: &rusqlite::Connection, key: &str) -> Result<Option<SnapshotRow>, Error> {
    let mut stmt =
        conn.prepare("SELECT cache_key, payload_json, fetched_at FROM leaderboard_snapshots WHERE cache_key = ?1")?;

    match stmt.query_row(params![key], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?))) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait::async_trait]
impl SnapshotStore for CacheDb {
    async fn read(&self, key: &CacheKey) -> Result<Option<Snapshot>, Error> {
        let digest = key.digest().to_string();
        self.conn
            .call(move |conn| -> Result<Option<Snapshot>, Error> { select_row(conn, &digest)?.map(decode_row).transpose() })
            .await
            .map_err(Error::from)
    }

    async fn upsert(&self, key: &CacheKey, payload: &[Value]) -> Result<Snapshot, Error> {
        let payload_json = serde_json::to_string(payload)
            .map_err(|e| Error::CorruptSnapshot(format!("payload for {key} not serializable: {e}")))?;
        let entry_count = payload.len() as i64;
        let fetched_at = self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let digest = key.digest().to_string();
        let query = key.query().clone();

        self.conn
            .call(move |conn| -> Result<Snapshot, Error> {
                conn.execute(
                    "INSERT INTO leaderboard_snapshots (
                    cache_key, game, queue, tier, division, region,
                    payload_json, entry_count, fetched_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(cache_key) DO UPDATE SET
                    game = excluded.game,
                    queue = excluded.queue,
                    tier = excluded.tier,
                    division = excluded.division,
                    region = excluded.region,
                    payload_json = excluded.payload_json,
                    entry_count = excluded.entry_count,
                    fetched_at = excluded.fetched_at",
                    params![
                        &digest,
                        query.game.as_str(),
                        &query.queue,
                        &query.tier,
                        &query.division,
                        &query.region,
                        &payload_json,
                        entry_count,
                        &fetched_at,
                    ],
                )?;

                let row = select_row(conn, &digest)?
                    .ok_or_else(|| Error::CorruptSnapshot(format!("{digest} missing after upsert")))?;
                decode_row(row)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheDb {
    /// Number of stored snapshots.
    pub async fn snapshot_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM leaderboard_snapshots", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
