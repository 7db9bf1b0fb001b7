//! Ranked-league response types and normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Apex-tier league listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueList {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

/// One entry as returned by either league endpoint.
///
/// Apex listings omit `tier` and report the division in `rank`; entry pages
/// carry both.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    #[serde(default)]
    pub puuid: Option<String>,
    #[serde(default)]
    pub summoner_id: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub league_points: i64,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub hot_streak: bool,
    #[serde(default)]
    pub veteran: bool,
    #[serde(default)]
    pub fresh_blood: bool,
    #[serde(default)]
    pub inactive: bool,
}

/// Normalized ladder entry served to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderEntry {
    /// 1-based position by league points.
    pub rank: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summoner_id: Option<String>,
    pub tier: String,
    pub division: String,
    pub league_points: i64,
    pub wins: u32,
    pub losses: u32,
    pub games: u32,
    /// Percentage rounded to one decimal place.
    pub win_rate: f64,
    pub hot_streak: bool,
    pub veteran: bool,
    pub fresh_blood: bool,
    pub inactive: bool,
}

/// Order entries by league points (stable for ties) and assign ranks.
///
/// `tier` and `division` fill in fields the apex listing leaves out.
pub fn normalize_entries(raw: Vec<RawEntry>, tier: &str, division: &str) -> Vec<LadderEntry> {
    let mut raw = raw;
    raw.sort_by(|a, b| b.league_points.cmp(&a.league_points));

    raw.into_iter()
        .enumerate()
        .map(|(i, e)| {
            let games = e.wins.saturating_add(e.losses);
            LadderEntry {
                rank: i + 1,
                puuid: e.puuid,
                summoner_id: e.summoner_id,
                tier: e.tier.unwrap_or_else(|| tier.to_string()),
                division: e.rank.unwrap_or_else(|| division.to_string()),
                league_points: e.league_points,
                wins: e.wins,
                losses: e.losses,
                games,
                win_rate: win_rate(e.wins, games),
                hot_streak: e.hot_streak,
                veteran: e.veteran,
                fresh_blood: e.fresh_blood,
                inactive: e.inactive,
            }
        })
        .collect()
}

fn win_rate(wins: u32, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    (wins as f64 * 1000.0 / games as f64).round() / 10.0
}

/// Serialize entries into the opaque payload the cache stores.
pub fn into_payload(entries: Vec<LadderEntry>) -> Result<Vec<Value>, serde_json::Error> {
    entries.into_iter().map(serde_json::to_value).collect()
}
