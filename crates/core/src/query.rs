//! Leaderboard query model.
//!
//! Normalization is infallible and idempotent so that the cache key builder
//! can apply it unconditionally; validation is a separate step that rejects
//! values the upstream would not understand.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default tier when none is requested.
pub const DEFAULT_TIER: &str = "CHALLENGER";

/// Default division when none is requested.
pub const DEFAULT_DIVISION: &str = "I";

/// Default League of Legends ranked queue.
pub const DEFAULT_LEAGUE_QUEUE: &str = "RANKED_SOLO_5x5";

/// Ranked queues accepted for League of Legends, in their canonical spelling.
pub const LEAGUE_QUEUES: &[&str] = &["RANKED_SOLO_5x5", "RANKED_FLEX_SR"];

/// Ranked tiers, lowest first.
pub const TIERS: &[&str] =
    &["IRON", "BRONZE", "SILVER", "GOLD", "PLATINUM", "EMERALD", "DIAMOND", "MASTER", "GRANDMASTER", "CHALLENGER"];

/// Tiers whose upstream listing is a single league with no divisions.
pub const APEX_TIERS: &[&str] = &["MASTER", "GRANDMASTER", "CHALLENGER"];

pub const DIVISIONS: &[&str] = &["I", "II", "III", "IV"];

/// Platform routing codes served by the ranked API.
pub const REGIONS: &[&str] = &[
    "br1", "eun1", "euw1", "jp1", "kr", "la1", "la2", "me1", "na1", "oc1", "ph2", "ru", "sg2", "th2", "tr1", "tw2",
    "vn2",
];

/// Ranked game a leaderboard belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    /// League of Legends; has multiple ranked queues.
    #[serde(rename = "lol")]
    League,
    /// Teamfight Tactics.
    Tft,
}

impl Game {
    pub fn as_str(&self) -> &'static str {
        match self {
            Game::League => "lol",
            Game::Tft => "tft",
        }
    }

    pub fn default_region(&self) -> &'static str {
        match self {
            Game::League => "na1",
            Game::Tft => "euw1",
        }
    }

    /// Whether the `queue` parameter participates in this game's identity.
    pub fn has_queue(&self) -> bool {
        matches!(self, Game::League)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one leaderboard view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub game: Game,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    pub tier: String,
    pub division: String,
    pub region: String,
}

impl LeaderboardQuery {
    /// Query for a game with every field left to its default.
    pub fn new(game: Game) -> Self {
        Self { game, queue: None, tier: String::new(), division: String::new(), region: String::new() }
    }

    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.division = division.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Return the canonical form of this query.
    ///
    /// Trims every field, upper-cases tier and division, lower-cases region,
    /// canonicalizes known queue spellings, and substitutes defaults for
    /// empty or omitted fields. Games without queues always drop it.
    pub fn normalized(&self) -> Self {
        let tier = or_default(self.tier.trim().to_ascii_uppercase(), DEFAULT_TIER);
        let division = or_default(self.division.trim().to_ascii_uppercase(), DEFAULT_DIVISION);
        let region = or_default(self.region.trim().to_ascii_lowercase(), self.game.default_region());

        let queue = if self.game.has_queue() {
            let raw = self.queue.as_deref().map(str::trim).unwrap_or_default();
            Some(canonical_queue(raw))
        } else {
            None
        };

        Self { game: self.game, queue, tier, division, region }
    }

    /// Reject values the ranked API does not know about.
    ///
    /// Validation runs on the normalized form, so casing and omitted fields
    /// never cause a rejection.
    pub fn validate(&self) -> Result<(), Error> {
        let q = self.normalized();

        if !TIERS.contains(&q.tier.as_str()) {
            return Err(Error::InvalidQuery(format!("unknown tier: {}", q.tier)));
        }
        if !DIVISIONS.contains(&q.division.as_str()) {
            return Err(Error::InvalidQuery(format!("unknown division: {}", q.division)));
        }
        if !REGIONS.contains(&q.region.as_str()) {
            return Err(Error::InvalidQuery(format!("unknown region: {}", q.region)));
        }
        if let Some(queue) = &q.queue
            && !LEAGUE_QUEUES.contains(&queue.as_str())
        {
            return Err(Error::InvalidQuery(format!("unknown queue: {queue}")));
        }

        Ok(())
    }

    /// Whether the tier is a single division-less league.
    pub fn is_apex(&self) -> bool {
        APEX_TIERS.contains(&self.normalized().tier.as_str())
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() { default.to_string() } else { value }
}

fn canonical_queue(raw: &str) -> String {
    if raw.is_empty() {
        return DEFAULT_LEAGUE_QUEUE.to_string();
    }
    LEAGUE_QUEUES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(raw))
        .map(|known| (*known).to_string())
        .unwrap_or_else(|| raw.to_ascii_uppercase())
}
