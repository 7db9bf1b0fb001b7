//! Cache status response headers for callers and CDNs.

use super::refresh::CacheOutcome;
use super::snapshots::Snapshot;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeMap;

/// One of `hit`, `miss`, `refresh`, `stale`.
pub const CACHE_STATUS: &str = "x-cache-status";

/// HTTP-date at which the served snapshot stops being fresh.
pub const CACHE_EXPIRES: &str = "x-cache-expires";

const LAST_MODIFIED: &str = "last-modified";
const AGE: &str = "age";
const CACHE_CONTROL: &str = "cache-control";

/// Format a timestamp as an IMF-fixdate (RFC 9110 HTTP-date).
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build response headers for a served leaderboard.
///
/// Without a snapshot only the status header is emitted.
pub fn build_headers(
    outcome: CacheOutcome, snapshot: Option<&Snapshot>, ttl: TimeDelta, now: DateTime<Utc>,
) -> BTreeMap<&'static str, String> {
    let mut headers = BTreeMap::new();
    headers.insert(CACHE_STATUS, outcome.as_str().to_string());

    let Some(snapshot) = snapshot else {
        return headers;
    };

    let expires_at = snapshot.expires_at(ttl);
    headers.insert(CACHE_EXPIRES, http_date(expires_at));
    headers.insert(LAST_MODIFIED, http_date(snapshot.fetched_at));
    headers.insert(AGE, snapshot.age(now).num_seconds().max(0).to_string());

    let cache_control = match outcome {
        CacheOutcome::Stale => "no-cache".to_string(),
        _ => {
            let remaining = (expires_at - now).num_seconds().max(0);
            format!("public, max-age=0, s-maxage={remaining}")
        }
    };
    headers.insert(CACHE_CONTROL, cache_control);

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn snapshot(fetched_at: DateTime<Utc>) -> Snapshot {
        Snapshot { key: "k".into(), payload: vec![], fetched_at }
    }

    #[test]
    fn test_http_date_format() {
        assert_eq!(http_date(at(0)), "Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(http_date(at(1_700_000_000)), "Tue, 14 Nov 2023 22:13:20 GMT");
    }

    #[test]
    fn test_status_for_each_outcome() {
        for (outcome, expected) in [
            (CacheOutcome::Hit, "hit"),
            (CacheOutcome::Miss, "miss"),
            (CacheOutcome::Refresh, "refresh"),
            (CacheOutcome::Stale, "stale"),
        ] {
            let headers = build_headers(outcome, None, TimeDelta::seconds(60), at(0));
            assert_eq!(headers[CACHE_STATUS], expected);
        }
    }

    #[test]
    fn test_missing_snapshot_omits_expiry() {
        let headers = build_headers(CacheOutcome::Hit, None, TimeDelta::seconds(60), at(0));
        assert_eq!(headers.len(), 1);
        assert!(!headers.contains_key(CACHE_EXPIRES));
    }

    #[test]
    fn test_expiry_and_age() {
        let fetched = at(1_700_000_000);
        let now = fetched + TimeDelta::seconds(100);
        let headers = build_headers(CacheOutcome::Hit, Some(&snapshot(fetched)), TimeDelta::seconds(300), now);

        assert_eq!(headers[CACHE_EXPIRES], "Tue, 14 Nov 2023 22:18:20 GMT");
        assert_eq!(headers[LAST_MODIFIED], "Tue, 14 Nov 2023 22:13:20 GMT");
        assert_eq!(headers[AGE], "100");
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=0, s-maxage=200");
    }

    #[test]
    fn test_stale_not_cacheable_downstream() {
        let fetched = at(1_700_000_000);
        let now = fetched + TimeDelta::hours(1);
        let headers = build_headers(CacheOutcome::Stale, Some(&snapshot(fetched)), TimeDelta::seconds(300), now);

        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[AGE], "3600");
        assert_eq!(headers[CACHE_EXPIRES], "Tue, 14 Nov 2023 22:18:20 GMT");
    }

    #[test]
    fn test_future_snapshot_clamps_age() {
        let now = at(1_700_000_000);
        let headers =
            build_headers(CacheOutcome::Miss, Some(&snapshot(now + TimeDelta::seconds(3))), TimeDelta::seconds(60), now);
        assert_eq!(headers[AGE], "0");
    }
}
