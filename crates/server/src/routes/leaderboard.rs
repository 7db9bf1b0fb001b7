//! Leaderboard endpoints.
//!
//! Query parameters map onto [`LeaderboardQuery`] as-is; normalization and
//! validation happen inside the cache so the key is built from the same form
//! the upstream sees.

use crate::error::ApiError;
use crate::handler::AppState;

use axum::{
    Json,
    extract::{FromRequestParts, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, request::Parts},
    response::{IntoResponse, Response},
};
use ladder_core::{Error, Game, LeaderboardQuery};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Raw query string for both leaderboard routes.
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub region: Option<String>,
    pub tier: Option<String>,
    pub division: Option<String>,
    pub queue: Option<String>,
    pub refresh: Option<String>,
}

/// A query string that does not deserialize is an `InvalidQuery`, so it gets
/// the same JSON error body as a failed validation.
impl<S> FromRequestParts<S> for LeaderboardParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<Self>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::from(Error::InvalidQuery(e.body_text())))?;
        Ok(params)
    }
}

impl LeaderboardParams {
    fn into_query(self, game: Game) -> (LeaderboardQuery, bool) {
        let force = parse_refresh(self.refresh.as_deref());
        let query = LeaderboardQuery {
            game,
            queue: self.queue,
            tier: self.tier.unwrap_or_default(),
            division: self.division.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
        };
        (query, force)
    }
}

/// Whether the `refresh` parameter asks to bypass the fresh-hit path.
pub fn parse_refresh(value: Option<&str>) -> bool {
    match value {
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => false,
    }
}

/// GET /api/lol/leaderboard
pub async fn lol_leaderboard(State(state): State<AppState>, params: LeaderboardParams) -> Result<Response, ApiError> {
    serve(state, Game::League, params).await
}

/// GET /api/tft/leaderboard
pub async fn tft_leaderboard(State(state): State<AppState>, params: LeaderboardParams) -> Result<Response, ApiError> {
    serve(state, Game::Tft, params).await
}

async fn serve(state: AppState, game: Game, params: LeaderboardParams) -> Result<Response, ApiError> {
    let (query, force) = params.into_query(game);
    let served = state.cache.serve(&query, force).await?;

    tracing::info!(
        game = %game,
        outcome = %served.outcome,
        entries = served.payload().len(),
        "leaderboard served"
    );

    let headers = header_map(state.cache.response_headers(&served));
    Ok((headers, Json(served.into_payload())).into_response())
}

fn header_map(raw: BTreeMap<&'static str, String>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(raw.len());
    for (name, value) in raw {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            tracing::warn!(header = name, "skipping invalid header name");
            continue;
        };
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "skipping invalid header value"),
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::router;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use chrono::{DateTime, TimeDelta};
    use ladder_core::{CacheDb, CachePolicy, LeaderboardCache, LeaderboardSource, ManualClock, UpstreamError};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    struct FakeSource {
        calls: AtomicUsize,
        next: Mutex<Result<Vec<Value>, UpstreamError>>,
    }

    impl FakeSource {
        fn new(next: Result<Vec<Value>, UpstreamError>) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), next: Mutex::new(next) })
        }

        fn set(&self, next: Result<Vec<Value>, UpstreamError>) {
            *self.next.lock().unwrap() = next;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl LeaderboardSource for FakeSource {
        async fn fetch(&self, _query: &LeaderboardQuery) -> Result<Vec<Value>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.next.lock().unwrap().clone()
        }
    }

    struct TestApp {
        state: AppState,
        source: Arc<FakeSource>,
        clock: Arc<ManualClock>,
    }

    async fn app(next: Result<Vec<Value>, UpstreamError>) -> TestApp {
        let clock = Arc::new(ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()));
        let db = CacheDb::open_in_memory().await.unwrap().with_clock(clock.clone());
        let source = FakeSource::new(next);
        let policy = CachePolicy::new(TimeDelta::seconds(300), 24);
        let cache = LeaderboardCache::new(Arc::new(db), source.clone(), policy).with_clock(clock.clone());
        TestApp { state: AppState::new(cache), source, clock }
    }

    async fn get(state: &AppState, uri: &str) -> (StatusCode, HeaderMap, Value) {
        let response = router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&body).unwrap())
    }

    fn entries() -> Vec<Value> {
        vec![json!({"rank": 1, "leaguePoints": 1500}), json!({"rank": 2, "leaguePoints": 1400})]
    }

    fn cache_status(headers: &HeaderMap) -> &str {
        headers.get("x-cache-status").unwrap().to_str().unwrap()
    }

    #[test]
    fn test_parse_refresh() {
        assert!(parse_refresh(Some("1")));
        assert!(parse_refresh(Some("true")));
        assert!(parse_refresh(Some(" YES ")));
        assert!(!parse_refresh(Some("0")));
        assert!(!parse_refresh(Some("no")));
        assert!(!parse_refresh(Some("")));
        assert!(!parse_refresh(None));
    }

    #[tokio::test]
    async fn test_healthz() {
        let t = app(Ok(entries())).await;
        let (status, _, body) = get(&t.state, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let t = app(Ok(entries())).await;

        let (status, headers, body) = get(&t.state, "/api/lol/leaderboard?region=NA1&tier=challenger").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_status(&headers), "miss");
        assert_eq!(body, Value::Array(entries()));
        assert_eq!(headers.get("cache-control").unwrap(), "public, max-age=0, s-maxage=300");
        assert!(headers.contains_key("last-modified"));
        assert!(headers.contains_key("x-cache-expires"));

        t.clock.advance(TimeDelta::seconds(60));
        let (status, headers, body) = get(&t.state, "/api/lol/leaderboard?region=na1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_status(&headers), "hit");
        assert_eq!(headers.get("age").unwrap(), "60");
        assert_eq!(body, Value::Array(entries()));
        assert_eq!(t.source.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_flag_bypasses_fresh_snapshot() {
        let t = app(Ok(entries())).await;
        get(&t.state, "/api/tft/leaderboard").await;

        let (status, headers, _) = get(&t.state, "/api/tft/leaderboard?refresh=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_status(&headers), "refresh");
        assert_eq!(t.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_tier_is_bad_request() {
        let t = app(Ok(entries())).await;
        let (status, _, body) = get(&t.state, "/api/lol/leaderboard?tier=wood").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("WOOD"));
        assert_eq!(t.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_query_string_is_json_bad_request() {
        let t = app(Ok(entries())).await;
        let (status, headers, body) = get(&t.state, "/api/lol/leaderboard?tier=GOLD&tier=SILVER").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert!(body["error"].as_str().unwrap().contains("tier"));
        assert_eq!(t.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_cold_upstream_failure_passes_status_through() {
        let t = app(Err(UpstreamError::new(Some(429), "rate limited"))).await;
        let (status, headers, body) = get(&t.state, "/api/lol/leaderboard").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body.get("error").is_some());
        assert!(!headers.contains_key("x-cache-status"));
    }

    #[tokio::test]
    async fn test_stale_fallback_when_upstream_fails() {
        let t = app(Ok(entries())).await;
        get(&t.state, "/api/lol/leaderboard").await;

        t.clock.advance(TimeDelta::seconds(600));
        t.source.set(Err(UpstreamError::new(Some(503), "maintenance")));

        let (status, headers, body) = get(&t.state, "/api/lol/leaderboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_status(&headers), "stale");
        assert_eq!(headers.get("cache-control").unwrap(), "no-cache");
        assert_eq!(body, Value::Array(entries()));
    }

    #[tokio::test]
    async fn test_games_do_not_share_snapshots() {
        let t = app(Ok(entries())).await;
        get(&t.state, "/api/lol/leaderboard?region=euw1").await;

        let (_, headers, _) = get(&t.state, "/api/tft/leaderboard?region=euw1").await;
        assert_eq!(cache_status(&headers), "miss");
        assert_eq!(t.source.calls(), 2);
    }
}
