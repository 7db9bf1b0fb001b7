//! Riot Games ranked-league API client.
//!
//! Implements the upstream source for the ladder cache.
//!
//! ### Behavior
//!
//! - **Endpoint**: `https://{region}.api.riotgames.com`, league-v4 for League
//!   of Legends and tft-league-v1 for Teamfight Tactics.
//! - **Authentication**: Uses `X-Riot-Token` header.
//! - **Rate Limiting**: a process-wide minimum interval between requests.
//!   No retries; a 429 is reported to the cache, which falls back to its
//!   last snapshot.
//! - **Normalization**: entries sorted by league points with 1-based ranks.

pub mod error;
pub mod request;
pub mod response;

pub use error::RiotError;
pub use request::{Endpoint, ResponseShape};
pub use response::{LadderEntry, LeagueList, RawEntry};

use bytes::Bytes;
use ladder_core::{AppConfig, ConfigError, LeaderboardQuery, LeaderboardSource, UpstreamError};
use reqwest::header;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default base URL; `{region}` is replaced per request.
const DEFAULT_BASE_URL: &str = "https://{region}.api.riotgames.com";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "ladder-cache/0.1";

/// Personal keys allow 20 requests per second.
const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(50);

/// Riot API client configuration.
#[derive(Debug, Clone)]
pub struct RiotConfig {
    pub api_key: String,
    /// Base URL, optionally containing `{region}`.
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    pub user_agent: String,
    pub min_request_interval: Duration,
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
        }
    }
}

impl RiotConfig {
    /// Build client configuration from application configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no API key is configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: config.require_riot_api_key()?.to_string(),
            base_url: config.upstream_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            min_request_interval: config.min_request_interval(),
        })
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(Instant::now().checked_sub(min_interval).unwrap_or_else(Instant::now)),
            min_interval,
        }
    }

    /// Wait until the next request slot.
    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// Riot ranked-league API client.
#[derive(Debug, Clone)]
pub struct RiotClient {
    http: reqwest::Client,
    config: RiotConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl RiotClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RiotConfig) -> Result<Self, RiotError> {
        if config.api_key.is_empty() {
            return Err(RiotError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RiotError::Network(Arc::new(e)))?;

        let rate_limiter = Arc::new(RateLimiter::new(config.min_request_interval));
        Ok(Self { http, config, rate_limiter })
    }

    /// Fetch and normalize the ladder for a query.
    ///
    /// The game selects the API family (league-v4 or tft-league-v1) and the
    /// tier selects between the apex listing and a paged entry list.
    pub async fn fetch_ladder(&self, query: &LeaderboardQuery) -> Result<Vec<LadderEntry>, RiotError> {
        let q = query.normalized();
        let endpoint = Endpoint::for_query(&q);
        let bytes = self.get(&endpoint).await?;

        let raw = match endpoint.shape {
            ResponseShape::LeagueList => {
                serde_json::from_slice::<LeagueList>(&bytes)
                    .map_err(|e| RiotError::Parse(e.to_string()))?
                    .entries
            }
            ResponseShape::EntryPage => {
                serde_json::from_slice::<Vec<RawEntry>>(&bytes).map_err(|e| RiotError::Parse(e.to_string()))?
            }
        };

        Ok(response::normalize_entries(raw, &q.tier, &q.division))
    }

    async fn get(&self, endpoint: &Endpoint) -> Result<Bytes, RiotError> {
        self.rate_limiter.acquire().await;

        let start = Instant::now();
        let url = endpoint.url(&self.config.base_url);
        tracing::debug!("requesting Riot API: region={} path={}", endpoint.region, endpoint.path);

        let response = self
            .http
            .get(&url)
            .header("X-Riot-Token", &self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Riot API response status: {} in {:?}", status, start.elapsed());

        if status == 401 || status == 403 {
            return Err(RiotError::AuthError { status: status.as_u16() });
        }

        if status == 429 {
            return Err(RiotError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(RiotError::HttpError { status: status.as_u16() });
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait::async_trait]
impl LeaderboardSource for RiotClient {
    async fn fetch(&self, query: &LeaderboardQuery) -> Result<Vec<Value>, UpstreamError> {
        let entries = self.fetch_ladder(query).await.map_err(|e| {
            tracing::debug!("Riot API fetch failed for {}: {}", query.game, e);
            UpstreamError::from(e)
        })?;

        response::into_payload(entries).map_err(|e| UpstreamError::new(None, format!("parse error: {e}")))
    }
}
