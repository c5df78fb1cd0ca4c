//! Analytical query construction.
//!
//! Each statistic category maps to one upstream request. Three of them are
//! SQL sent to the explorer endpoint; item timings come from a fixed
//! scenarios endpoint that has no time filter.

use crate::models::TimeWindow;

/// One upstream request, fully parameterised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatQuery {
    /// Player-match counts grouped by rank bracket.
    RankDistribution { window: TimeWindow },

    /// Per-hero wins and match counts, busiest heroes first.
    HeroWinRates { window: TimeWindow, limit: u32 },

    /// Raw item timing scenarios. The requested year is kept for logging only.
    ItemTimings { year: i32 },

    /// One aggregate row of Radiant/Dire wins over the window.
    FactionWinRates { window: TimeWindow },
}

impl StatQuery {
    /// Category name used in logs and counters.
    pub fn category(&self) -> &'static str {
        match self {
            StatQuery::RankDistribution { .. } => "rank_distribution",
            StatQuery::HeroWinRates { .. } => "hero_winrates",
            StatQuery::ItemTimings { .. } => "item_winrates",
            StatQuery::FactionWinRates { .. } => "faction_winrates",
        }
    }

    /// SQL text for the explorer endpoint, or `None` for categories served
    /// by a dedicated endpoint.
    pub fn sql(&self) -> Option<String> {
        match self {
            StatQuery::RankDistribution { window } => Some(rank_distribution_sql(window)),
            StatQuery::HeroWinRates { window, limit } => Some(hero_win_rates_sql(window, *limit)),
            StatQuery::ItemTimings { .. } => None,
            StatQuery::FactionWinRates { window } => Some(faction_win_rates_sql(window)),
        }
    }
}

fn rank_distribution_sql(window: &TimeWindow) -> String {
    format!(
        "SELECT floor(pm.rank_tier / 10) * 10 AS bracket, \
         COUNT(*) AS matches \
         FROM player_matches pm \
         JOIN matches m ON m.match_id = pm.match_id \
         WHERE pm.rank_tier IS NOT NULL \
         AND m.start_time >= {start} \
         AND m.start_time < {end} \
         GROUP BY bracket \
         ORDER BY bracket;",
        start = window.start,
        end = window.end,
    )
}

fn hero_win_rates_sql(window: &TimeWindow, limit: u32) -> String {
    format!(
        "SELECT pm.hero_id AS hero_id, \
         SUM(CASE WHEN pm.win = 1 THEN 1 ELSE 0 END) AS wins, \
         COUNT(*) AS matches \
         FROM player_matches pm \
         JOIN matches m ON m.match_id = pm.match_id \
         WHERE pm.hero_id IS NOT NULL \
         AND m.start_time >= {start} \
         AND m.start_time < {end} \
         GROUP BY pm.hero_id \
         HAVING COUNT(*) > 0 \
         ORDER BY matches DESC \
         LIMIT {limit};",
        start = window.start,
        end = window.end,
        limit = limit.max(1),
    )
}

fn faction_win_rates_sql(window: &TimeWindow) -> String {
    format!(
        "SELECT SUM(CASE WHEN radiant_win = true THEN 1 ELSE 0 END) AS radiant_wins, \
         SUM(CASE WHEN radiant_win = false THEN 1 ELSE 0 END) AS dire_wins, \
         COUNT(*) AS matches \
         FROM matches \
         WHERE start_time >= {start} \
         AND start_time < {end};",
        start = window.start,
        end = window.end,
    )
}
