//! Deterministic cache key derivation.

use crate::query::{Game, LeaderboardQuery};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable identity of a leaderboard view.
///
/// Holds the normalized query fields, so equality is structural, plus a
/// SHA-256 digest of them used as the store's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    query: LeaderboardQuery,
    digest: String,
}

impl CacheKey {
    /// Hex digest used as the persisted key.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// The normalized query this key was derived from.
    pub fn query(&self) -> &LeaderboardQuery {
        &self.query
    }

    pub fn game(&self) -> Game {
        self.query.game
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}

/// Derive the cache key for a leaderboard query.
pub fn build_key(query: &LeaderboardQuery) -> CacheKey {
    let query = query.normalized();

    let mut hasher = Sha256::new();
    hasher.update(query.game.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(query.queue.as_deref().unwrap_or_default().as_bytes());
    hasher.update(b"\n");
    hasher.update(query.tier.as_bytes());
    hasher.update(b"\n");
    hasher.update(query.division.as_bytes());
    hasher.update(b"\n");
    hasher.update(query.region.as_bytes());
    let digest = hex::encode(hasher.finalize());

    CacheKey { query, digest }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let q = LeaderboardQuery::new(Game::League).with_tier("GOLD").with_division("II");
        assert_eq!(build_key(&q), build_key(&q));
    }

    #[test]
    fn test_key_ignores_case() {
        let lower = LeaderboardQuery::new(Game::League)
            .with_tier("challenger")
            .with_region("NA1")
            .with_queue("ranked_solo_5x5");
        let upper = LeaderboardQuery::new(Game::League)
            .with_tier("CHALLENGER")
            .with_region("na1")
            .with_queue("RANKED_SOLO_5x5");
        assert_eq!(build_key(&lower), build_key(&upper));
    }

    #[test]
    fn test_key_defaults_match_explicit() {
        let implicit = LeaderboardQuery::new(Game::League);
        let explicit = LeaderboardQuery::new(Game::League)
            .with_tier("CHALLENGER")
            .with_division("I")
            .with_region("na1")
            .with_queue("RANKED_SOLO_5x5");
        assert_eq!(build_key(&implicit), build_key(&explicit));
        assert_eq!(build_key(&implicit).digest(), build_key(&explicit).digest());
    }

    #[test]
    fn test_key_differs_per_field() {
        let base = LeaderboardQuery::new(Game::League).with_tier("DIAMOND");
        let variants = [
            base.clone().with_tier("EMERALD"),
            base.clone().with_division("III"),
            base.clone().with_region("kr"),
            base.clone().with_queue("RANKED_FLEX_SR"),
            LeaderboardQuery { game: Game::Tft, ..base.clone() },
        ];
        let base_key = build_key(&base);
        for v in variants {
            assert_ne!(build_key(&v), base_key, "{v:?} collided with base");
            assert_ne!(build_key(&v).digest(), base_key.digest());
        }
    }

    #[test]
    fn test_division_part_of_identity_for_apex() {
        let a = LeaderboardQuery::new(Game::Tft).with_division("I");
        let b = LeaderboardQuery::new(Game::Tft).with_division("II");
        assert_ne!(build_key(&a), build_key(&b));
    }

    #[test]
    fn test_digest_format() {
        let key = build_key(&LeaderboardQuery::new(Game::Tft));
        assert_eq!(key.digest().len(), 64);
        assert!(key.digest().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.to_string(), key.digest());
    }
}
