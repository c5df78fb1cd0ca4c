//! Statistics calculation engine.
//!
//! Turns upstream rows into statistic records:
//! - Row decoding with strict column coercion (`rows`)
//! - Rank distribution, hero, item and faction aggregation (`aggregate`)

mod aggregate;
mod rows;

pub use aggregate::*;
pub use rows::*;

use thiserror::Error;

/// Why a set of rows could not produce a statistic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("row shape mismatch: {0}")]
    Decode(String),

    #[error("no usable data")]
    NoUsableData,
}

/// Rank tier buckets and their medal names.
pub const RANK_BUCKET_LABELS: [(i64, &str); 8] = [
    (0, "Herald"),
    (10, "Guardian"),
    (20, "Crusader"),
    (30, "Archon"),
    (40, "Legend"),
    (50, "Ancient"),
    (60, "Divine"),
    (70, "Immortal"),
];

/// Label for a rank bucket, `"Tier {bucket}"` when unmapped.
pub fn rank_bracket_label(bucket: i64) -> String {
    RANK_BUCKET_LABELS
        .iter()
        .find(|(b, _)| *b == bucket)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Tier {}", bucket))
}

/// Calculate win rate, 0.0 when nothing was played.
pub fn calculate_win_rate(wins: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}

/// Calculate a part's share of a total, 0.0 for an empty total.
pub fn calculate_share(part: u64, total: u64) -> f64 {
    calculate_win_rate(part, total)
}
