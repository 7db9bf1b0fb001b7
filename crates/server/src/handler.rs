//! HTTP router and shared state.
//!
//! The cache is constructed once in `main` and handed to every request
//! through axum state.

use crate::routes::{health, leaderboard};

use axum::{Router, routing::get};
use ladder_core::LeaderboardCache;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<LeaderboardCache>,
}

impl AppState {
    pub fn new(cache: LeaderboardCache) -> Self {
        Self { cache: Arc::new(cache) }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/lol/leaderboard", get(leaderboard::lol_leaderboard))
        .route("/api/tft/leaderboard", get(leaderboard::tft_leaderboard))
        .route("/healthz", get(health::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
