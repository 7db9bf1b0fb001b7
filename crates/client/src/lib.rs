//! Upstream client code for the ladder cache.
//!
//! This crate provides the Riot ranked-league client that implements
//! `ladder_core::LeaderboardSource`.

pub mod riot;

pub use riot::{LadderEntry, RiotClient, RiotConfig, RiotError};
