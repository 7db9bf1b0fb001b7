//! Ranked-league endpoint selection per game and tier.

use ladder_core::{Game, LeaderboardQuery};

/// Shape of the JSON the endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A single league object with an `entries` array (apex tiers).
    LeagueList,
    /// A bare array of league entries (divisioned tiers).
    EntryPage,
}

/// A resolved upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Platform code the request is routed to.
    pub region: String,
    /// Path and query string, starting with `/`.
    pub path: String,
    pub shape: ResponseShape,
}

impl Endpoint {
    /// Resolve the endpoint for a query. The query is normalized first.
    pub fn for_query(query: &LeaderboardQuery) -> Self {
        let q = query.normalized();
        let apex = apex_segment(&q.tier);

        let (path, shape) = match (q.game, apex) {
            (Game::League, Some(segment)) => {
                let queue = q.queue.as_deref().unwrap_or(ladder_core::query::DEFAULT_LEAGUE_QUEUE);
                (format!("/lol/league/v4/{segment}leagues/by-queue/{queue}"), ResponseShape::LeagueList)
            }
            (Game::League, None) => {
                let queue = q.queue.as_deref().unwrap_or(ladder_core::query::DEFAULT_LEAGUE_QUEUE);
                (
                    format!("/lol/league/v4/entries/{queue}/{}/{}?page=1", q.tier, q.division),
                    ResponseShape::EntryPage,
                )
            }
            (Game::Tft, Some(segment)) => (format!("/tft/league/v1/{segment}"), ResponseShape::LeagueList),
            (Game::Tft, None) => {
                (format!("/tft/league/v1/entries/{}/{}?page=1", q.tier, q.division), ResponseShape::EntryPage)
            }
        };

        Self { region: q.region, path, shape }
    }

    /// Full URL given a base that may contain a `{region}` placeholder.
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.replace("{region}", &self.region);
        format!("{}{}", base.trim_end_matches('/'), self.path)
    }
}

fn apex_segment(tier: &str) -> Option<&'static str> {
    match tier {
        "CHALLENGER" => Some("challenger"),
        "GRANDMASTER" => Some("grandmaster"),
        "MASTER" => Some("master"),
        _ => None,
    }
}
