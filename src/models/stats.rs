//! Statistic records returned by the analytics service.

use serde::{Deserialize, Serialize};

/// Share of matches falling into one rank bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankBucketStat {
    /// Bracket label, e.g. "Herald"
    pub rank_bracket: String,

    /// Player-match records in the bracket
    pub matches: u64,

    /// `matches / total` over all brackets in the same response (0.0 to 1.0)
    pub percentage: f64,
}

/// Per-hero win rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroWinRate {
    pub hero_id: u32,
    pub hero_name: String,
    pub matches: u64,
    pub wins: u64,

    /// `wins / matches`, or 0.0 when no matches
    pub win_rate: f64,
}

/// Per-item win rate.
///
/// `item_id` comes from a reverse name lookup and may be synthetic, so it is
/// not a durable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemWinRate {
    pub item_id: u32,
    pub item_name: String,
    pub wins: u64,
    pub games: u64,

    /// `wins / games`, or 0.0 when no games
    pub win_rate: f64,
}

/// Map side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Radiant,
    Dire,
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Radiant => write!(f, "Radiant"),
            Faction::Dire => write!(f, "Dire"),
        }
    }
}

/// Per-side win rate. Both sides of a response share the same `matches` total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionWinRate {
    pub faction: Faction,
    pub wins: u64,
    pub matches: u64,
    pub win_rate: f64,
}
