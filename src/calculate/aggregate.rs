//! Aggregation of decoded rows into statistic records.

use std::collections::HashMap;

use super::{
    calculate_share, calculate_win_rate, rank_bracket_label, AggregateError, FactionRow, HeroRow,
    ItemTimingRow, RankRow,
};
use crate::models::{
    Faction, FactionWinRate, HeroMetadata, HeroWinRate, ItemMetadata, ItemWinRate,
    RankBucketStat,
};

/// Rank distribution with each bucket's share of the total.
///
/// Buckets keep the upstream order (ascending bracket).
pub fn rank_distribution(rows: &[RankRow]) -> Result<Vec<RankBucketStat>, AggregateError> {
    let total = rows
        .iter()
        .try_fold(0u64, |acc, r| add_count(acc, r.matches, "rank matches"))?;
    if rows.is_empty() || total == 0 {
        return Err(AggregateError::NoUsableData);
    }

    Ok(rows
        .iter()
        .map(|row| RankBucketStat {
            rank_bracket: rank_bracket_label(row.bracket),
            matches: row.matches,
            percentage: calculate_share(row.matches, total),
        })
        .collect())
}

/// Hero win rates joined against hero metadata.
///
/// Sorted by matches descending (stable) and cut to `limit` (at least one),
/// so an upstream that ignores ordering or limits still conforms.
pub fn hero_win_rates(
    mut rows: Vec<HeroRow>,
    heroes: &HashMap<u32, HeroMetadata>,
    limit: u32,
) -> Result<Vec<HeroWinRate>, AggregateError> {
    if rows.is_empty() {
        return Err(AggregateError::NoUsableData);
    }

    rows.sort_by(|a, b| b.matches.cmp(&a.matches));
    rows.truncate(limit.max(1) as usize);

    Ok(rows
        .into_iter()
        .map(|row| HeroWinRate {
            hero_id: row.hero_id,
            hero_name: heroes
                .get(&row.hero_id)
                .map(|h| h.display_name.clone())
                .unwrap_or_else(|| format!("Hero {}", row.hero_id)),
            matches: row.matches,
            wins: row.wins,
            win_rate: calculate_win_rate(row.wins, row.matches),
        })
        .collect())
}

/// Item win rates from raw timing records.
///
/// Records are summed per item name. Ids come from a reverse name lookup;
/// unmatched names get `position + 1` in first-seen order, which is only
/// stable for an identical upstream response. Zero-game items are dropped,
/// the rest sorted by games descending and cut to `limit`.
pub fn item_win_rates(
    rows: &[ItemTimingRow],
    items: &HashMap<u32, ItemMetadata>,
    limit: usize,
) -> Result<Vec<ItemWinRate>, AggregateError> {
    if rows.is_empty() {
        return Err(AggregateError::NoUsableData);
    }

    let mut order: Vec<(&str, u64, u64)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let idx = *position.entry(row.item.as_str()).or_insert_with(|| {
            order.push((row.item.as_str(), 0, 0));
            order.len() - 1
        });
        let entry = &mut order[idx];
        entry.1 = add_count(entry.1, row.wins, "item wins")?;
        entry.2 = add_count(entry.2, row.games, "item games")?;
    }

    let id_by_name = item_ids_by_name(items);

    let mut stats: Vec<ItemWinRate> = order
        .into_iter()
        .enumerate()
        .map(|(idx, (name, wins, games))| ItemWinRate {
            item_id: id_by_name
                .get(name)
                .copied()
                .unwrap_or(idx as u32 + 1),
            item_name: name.to_string(),
            wins,
            games,
            win_rate: calculate_win_rate(wins, games),
        })
        .filter(|item| item.games > 0)
        .collect();

    stats.sort_by(|a, b| b.games.cmp(&a.games));
    stats.truncate(limit);
    Ok(stats)
}

/// Sum of two upstream counts; overflow means the rows cannot be trusted.
fn add_count(acc: u64, value: u64, what: &str) -> Result<u64, AggregateError> {
    acc.checked_add(value)
        .ok_or_else(|| AggregateError::Decode(format!("{} overflow a 64-bit total", what)))
}

/// Display name to id. Unnamed entries are skipped; on duplicate names the
/// lowest id wins.
fn item_ids_by_name(items: &HashMap<u32, ItemMetadata>) -> HashMap<&str, u32> {
    let mut by_name: HashMap<&str, u32> = HashMap::new();
    for item in items.values() {
        if let Some(name) = item.display_name.as_deref() {
            by_name
                .entry(name)
                .and_modify(|id| *id = (*id).min(item.id))
                .or_insert(item.id);
        }
    }
    by_name
}

/// Exactly two records, Radiant then Dire, sharing the match total.
pub fn faction_win_rates(row: &FactionRow) -> Result<Vec<FactionWinRate>, AggregateError> {
    if row.matches == 0 {
        return Err(AggregateError::NoUsableData);
    }

    Ok([
        (Faction::Radiant, row.radiant_wins),
        (Faction::Dire, row.dire_wins),
    ]
    .into_iter()
    .map(|(faction, wins)| FactionWinRate {
        faction,
        wins,
        matches: row.matches,
        win_rate: calculate_win_rate(wins, row.matches),
    })
    .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hero(id: u32, name: &str) -> (u32, HeroMetadata) {
        (
            id,
            HeroMetadata {
                id,
                display_name: name.to_string(),
            },
        )
    }

    fn item(id: u32, name: Option<&str>) -> (u32, ItemMetadata) {
        (
            id,
            ItemMetadata {
                id,
                display_name: name.map(str::to_string),
            },
        )
    }

    fn timing(item: &str, wins: u64, games: u64) -> ItemTimingRow {
        ItemTimingRow {
            item: item.to_string(),
            wins,
            games,
        }
    }

    #[test]
    fn test_rank_distribution_shares() {
        let rows = vec![
            RankRow { bracket: 0, matches: 40 },
            RankRow { bracket: 70, matches: 10 },
        ];
        let stats = rank_distribution(&rows).unwrap();
        assert_eq!(
            stats,
            vec![
                RankBucketStat {
                    rank_bracket: "Herald".to_string(),
                    matches: 40,
                    percentage: 0.8,
                },
                RankBucketStat {
                    rank_bracket: "Immortal".to_string(),
                    matches: 10,
                    percentage: 0.2,
                },
            ]
        );
    }

    #[test]
    fn test_rank_distribution_shares_sum_to_one() {
        let rows: Vec<RankRow> = (0..9)
            .map(|i| RankRow {
                bracket: i * 10,
                matches: (i as u64 + 1) * 37,
            })
            .collect();
        let stats = rank_distribution(&rows).unwrap();
        let sum: f64 = stats.iter().map(|s| s.percentage).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(stats[8].rank_bracket, "Tier 80");
    }

    #[test]
    fn test_rank_distribution_zero_total() {
        let rows = vec![RankRow { bracket: 0, matches: 0 }];
        assert_eq!(rank_distribution(&rows), Err(AggregateError::NoUsableData));
        assert_eq!(rank_distribution(&[]), Err(AggregateError::NoUsableData));
    }

    #[test]
    fn test_rank_distribution_total_overflow() {
        let rows: Vec<RankRow> = (0..3)
            .map(|i| RankRow {
                bracket: i * 10,
                matches: 7_000_000_000_000_000_000,
            })
            .collect();
        assert!(matches!(
            rank_distribution(&rows),
            Err(AggregateError::Decode(_))
        ));
    }

    #[test]
    fn test_hero_win_rates_sorted_and_limited() {
        let rows = vec![
            HeroRow { hero_id: 1, wins: 5, matches: 10 },
            HeroRow { hero_id: 2, wins: 30, matches: 50 },
            HeroRow { hero_id: 3, wins: 0, matches: 0 },
            HeroRow { hero_id: 4, wins: 12, matches: 20 },
            HeroRow { hero_id: 5, wins: 20, matches: 40 },
        ];
        let heroes: HashMap<u32, HeroMetadata> =
            [hero(2, "Axe"), hero(5, "Drow Ranger")].into_iter().collect();

        let stats = hero_win_rates(rows, &heroes, 3).unwrap();
        let ids: Vec<u32> = stats.iter().map(|s| s.hero_id).collect();
        assert_eq!(ids, vec![2, 5, 4]);
        assert_eq!(stats[0].hero_name, "Axe");
        assert_eq!(stats[0].win_rate, 0.6);
        assert_eq!(stats[2].hero_name, "Hero 4");
        assert_eq!(stats[2].win_rate, 0.6);
    }

    #[test]
    fn test_hero_win_rates_zero_matches_and_min_limit() {
        let rows = vec![HeroRow { hero_id: 9, wins: 0, matches: 0 }];
        let stats = hero_win_rates(rows, &HashMap::new(), 0).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].win_rate, 0.0);
        assert_eq!(stats[0].hero_name, "Hero 9");
    }

    #[test]
    fn test_hero_win_rates_empty() {
        assert_eq!(
            hero_win_rates(Vec::new(), &HashMap::new(), 10),
            Err(AggregateError::NoUsableData)
        );
    }

    #[test]
    fn test_item_win_rates_aggregates_by_name() {
        let rows = vec![
            timing("Blink Dagger", 3, 5),
            timing("Mystery Relic", 1, 2),
            timing("Blink Dagger", 4, 5),
            timing("Dust of Appearance", 0, 0),
            timing("Black King Bar", 6, 8),
        ];
        let items: HashMap<u32, ItemMetadata> = [
            item(1, Some("Blink Dagger")),
            item(116, Some("Black King Bar")),
            item(117, None),
        ]
        .into_iter()
        .collect();

        let stats = item_win_rates(&rows, &items, 10).unwrap();
        assert_eq!(
            stats,
            vec![
                ItemWinRate {
                    item_id: 1,
                    item_name: "Blink Dagger".to_string(),
                    wins: 7,
                    games: 10,
                    win_rate: 0.7,
                },
                ItemWinRate {
                    item_id: 116,
                    item_name: "Black King Bar".to_string(),
                    wins: 6,
                    games: 8,
                    win_rate: 0.75,
                },
                ItemWinRate {
                    item_id: 2,
                    item_name: "Mystery Relic".to_string(),
                    wins: 1,
                    games: 2,
                    win_rate: 0.5,
                },
            ]
        );
    }

    #[test]
    fn test_item_win_rates_top_ten() {
        let rows: Vec<ItemTimingRow> = (1..=15)
            .map(|i| timing(&format!("Item {}", i), i, i * 2))
            .collect();
        let stats = item_win_rates(&rows, &HashMap::new(), 10).unwrap();
        assert_eq!(stats.len(), 10);
        assert_eq!(stats[0].games, 30);
        assert_eq!(stats[0].item_id, 15);
        assert!(stats.windows(2).all(|w| w[0].games >= w[1].games));
        assert!(stats.iter().all(|s| s.games > 0));
    }

    #[test]
    fn test_item_ids_by_name_prefers_lowest_id() {
        let items: HashMap<u32, ItemMetadata> =
            [item(40, Some("Dagon")), item(104, Some("Dagon"))]
                .into_iter()
                .collect();
        assert_eq!(item_ids_by_name(&items).get("Dagon"), Some(&40));
    }

    #[test]
    fn test_item_win_rates_sum_overflow() {
        let games = vec![timing("Blink Dagger", 1, 7_000_000_000_000_000_000); 3];
        assert!(matches!(
            item_win_rates(&games, &HashMap::new(), 10),
            Err(AggregateError::Decode(_))
        ));

        let wins = vec![timing("Blink Dagger", u64::MAX, u64::MAX), timing("Blink Dagger", 1, 1)];
        assert!(matches!(
            item_win_rates(&wins, &HashMap::new(), 10),
            Err(AggregateError::Decode(_))
        ));
    }

    #[test]
    fn test_item_win_rates_all_zero_games() {
        let rows = vec![timing("Tango", 0, 0)];
        let stats = item_win_rates(&rows, &HashMap::new(), 10).unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn test_faction_win_rates() {
        let row = FactionRow {
            radiant_wins: 520,
            dire_wins: 480,
            matches: 1000,
        };
        let stats = faction_win_rates(&row).unwrap();
        assert_eq!(
            stats,
            vec![
                FactionWinRate {
                    faction: Faction::Radiant,
                    wins: 520,
                    matches: 1000,
                    win_rate: 0.52,
                },
                FactionWinRate {
                    faction: Faction::Dire,
                    wins: 480,
                    matches: 1000,
                    win_rate: 0.48,
                },
            ]
        );
    }

    #[test]
    fn test_faction_win_rates_zero_matches() {
        let row = FactionRow {
            radiant_wins: 0,
            dire_wins: 0,
            matches: 0,
        };
        assert_eq!(faction_win_rates(&row), Err(AggregateError::NoUsableData));
    }
}
