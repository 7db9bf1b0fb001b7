//! Snapshot freshness classification.
//!
//! Both bounds are exclusive: a snapshot whose age equals the limit is
//! already outside it.

use super::snapshots::Snapshot;
use chrono::{DateTime, TimeDelta, Utc};

/// Whether `snapshot` may be served without refreshing.
pub fn is_fresh(snapshot: &Snapshot, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
    snapshot.age(now) < ttl
}

/// Whether `snapshot` is still young enough to serve when the upstream is down.
pub fn within_stale_bound(snapshot: &Snapshot, max_stale: TimeDelta, now: DateTime<Utc>) -> bool {
    snapshot.age(now) < max_stale
}
