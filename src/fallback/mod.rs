//! Static fallback datasets.
//!
//! Returned whenever live aggregation fails or yields nothing. Every derived
//! ratio is computed from the fixed counts, so the datasets satisfy the same
//! invariants as live responses.

use crate::calculate::{calculate_share, calculate_win_rate};
use crate::models::{
    Faction, FactionWinRate, HeroMetadata, HeroWinRate, ItemMetadata, ItemWinRate,
    RankBucketStat,
};

const RANK_BUCKETS: [(&str, u64); 8] = [
    ("Herald", 125_000),
    ("Guardian", 150_000),
    ("Crusader", 130_000),
    ("Archon", 100_000),
    ("Legend", 70_000),
    ("Ancient", 50_000),
    ("Divine", 35_000),
    ("Immortal", 20_000),
];

// (id, name, matches, wins)
const HEROES: [(u32, &str, u64, u64); 10] = [
    (1, "Anti-Mage", 18_000, 9_600),
    (2, "Crystal Maiden", 19_500, 10_150),
    (3, "Juggernaut", 21_000, 11_200),
    (4, "Faceless Void", 17_200, 9_400),
    (5, "Kunkka", 16_850, 9_100),
    (6, "Puck", 15_400, 8_100),
    (7, "Zeus", 16_000, 8_600),
    (8, "Storm Spirit", 14_900, 7_800),
    (9, "Axe", 14_000, 7_600),
    (10, "Lich", 13_200, 7_000),
];

// (id, name, wins, games)
const ITEMS: [(u32, &str, u64, u64); 10] = [
    (1, "Radiance", 5_800, 10_200),
    (2, "Assault Cuirass", 6_200, 11_100),
    (3, "Linken's Sphere", 4_100, 8_300),
    (4, "Aghanim's Scepter", 7_200, 13_200),
    (5, "Hurricane Pike", 3_400, 6_800),
    (6, "Black King Bar", 10_800, 19_900),
    (7, "Heart of Tarrasque", 4_500, 7_900),
    (8, "Sange", 3_000, 6_200),
    (9, "Moon Shard", 5_100, 9_400),
    (10, "Refresher Orb", 2_800, 5_200),
];

const FACTION_MATCHES: u64 = 1_000_000;
const RADIANT_WINS: u64 = 510_000;
const DIRE_WINS: u64 = 490_000;

/// Rank distribution over eight medal brackets.
pub fn rank_distribution() -> Vec<RankBucketStat> {
    let total: u64 = RANK_BUCKETS.iter().map(|(_, m)| m).sum();
    RANK_BUCKETS
        .iter()
        .map(|(label, matches)| RankBucketStat {
            rank_bracket: label.to_string(),
            matches: *matches,
            percentage: calculate_share(*matches, total),
        })
        .collect()
}

/// The ten fallback heroes in dataset order, cut to `limit` (at least one).
pub fn hero_win_rates(limit: u32) -> Vec<HeroWinRate> {
    HEROES
        .iter()
        .take(limit.max(1) as usize)
        .map(|(id, name, matches, wins)| HeroWinRate {
            hero_id: *id,
            hero_name: name.to_string(),
            matches: *matches,
            wins: *wins,
            win_rate: calculate_win_rate(*wins, *matches),
        })
        .collect()
}

/// The ten fallback items in dataset order.
pub fn item_win_rates() -> Vec<ItemWinRate> {
    ITEMS
        .iter()
        .map(|(id, name, wins, games)| ItemWinRate {
            item_id: *id,
            item_name: name.to_string(),
            wins: *wins,
            games: *games,
            win_rate: calculate_win_rate(*wins, *games),
        })
        .collect()
}

/// Radiant and Dire over one shared match total.
pub fn faction_win_rates() -> Vec<FactionWinRate> {
    [(Faction::Radiant, RADIANT_WINS), (Faction::Dire, DIRE_WINS)]
        .into_iter()
        .map(|(faction, wins)| FactionWinRate {
            faction,
            wins,
            matches: FACTION_MATCHES,
            win_rate: calculate_win_rate(wins, FACTION_MATCHES),
        })
        .collect()
}

/// Hero names used when the hero constants cannot be fetched.
pub fn hero_metadata() -> Vec<HeroMetadata> {
    HEROES
        .iter()
        .map(|(id, name, _, _)| HeroMetadata {
            id: *id,
            display_name: name.to_string(),
        })
        .collect()
}

/// Item names used when the item constants cannot be fetched.
pub fn item_metadata() -> Vec<ItemMetadata> {
    ITEMS
        .iter()
        .map(|(id, name, _, _)| ItemMetadata {
            id: *id,
            display_name: Some(name.to_string()),
        })
        .collect()
}
