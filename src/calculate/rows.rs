//! Typed decoding of upstream rows.
//!
//! Each category reads only the columns it needs. A missing column or a
//! value that is not a whole number fails the whole response. An empty
//! response is reported as [`AggregateError::NoUsableData`].

use serde_json::Value;

use super::AggregateError;
use crate::source::Row;

/// Player-match count for one rank bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankRow {
    pub bracket: i64,
    pub matches: u64,
}

/// Wins and match count for one hero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroRow {
    pub hero_id: u32,
    pub wins: u64,
    pub matches: u64,
}

/// One item timing scenario record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTimingRow {
    pub item: String,
    pub wins: u64,
    pub games: u64,
}

/// Aggregate Radiant/Dire outcome counts over a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactionRow {
    pub radiant_wins: u64,
    pub dire_wins: u64,
    pub matches: u64,
}

pub fn decode_rank_rows(rows: &[Row]) -> Result<Vec<RankRow>, AggregateError> {
    non_empty(rows)?;
    rows.iter().map(rank_row).collect()
}

fn rank_row(row: &Row) -> Result<RankRow, AggregateError> {
    Ok(RankRow {
        bracket: int_cell(row, "bracket")?,
        matches: count_cell(row, "matches")?,
    })
}

pub fn decode_hero_rows(rows: &[Row]) -> Result<Vec<HeroRow>, AggregateError> {
    non_empty(rows)?;
    rows.iter().map(hero_row).collect()
}

fn hero_row(row: &Row) -> Result<HeroRow, AggregateError> {
    let raw_id = count_cell(row, "hero_id")?;
    let hero_id = u32::try_from(raw_id)
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AggregateError::Decode(format!("hero_id out of range: {}", raw_id)))?;
    Ok(HeroRow {
        hero_id,
        wins: count_cell(row, "wins")?,
        matches: count_cell(row, "matches")?,
    })
}

/// Missing or null `wins`/`games` count as zero; `item` must be a string.
pub fn decode_item_timings(rows: &[Row]) -> Result<Vec<ItemTimingRow>, AggregateError> {
    non_empty(rows)?;
    rows.iter().map(item_timing_row).collect()
}

fn item_timing_row(row: &Row) -> Result<ItemTimingRow, AggregateError> {
    let item = match row.get("item") {
        Some(Value::String(name)) => name.clone(),
        other => {
            return Err(AggregateError::Decode(format!(
                "item: expected string, got {}",
                describe(other)
            )))
        }
    };
    Ok(ItemTimingRow {
        item,
        wins: optional_count_cell(row, "wins")?,
        games: optional_count_cell(row, "games")?,
    })
}

/// Only the first row is read. A zero match total is reported as no data
/// before the win columns are inspected, since the sums are null then.
pub fn decode_faction_row(rows: &[Row]) -> Result<FactionRow, AggregateError> {
    let row = rows.first().ok_or(AggregateError::NoUsableData)?;
    let matches = count_cell(row, "matches")?;
    if matches == 0 {
        return Err(AggregateError::NoUsableData);
    }
    Ok(FactionRow {
        radiant_wins: count_cell(row, "radiant_wins")?,
        dire_wins: count_cell(row, "dire_wins")?,
        matches,
    })
}

fn non_empty(rows: &[Row]) -> Result<(), AggregateError> {
    if rows.is_empty() {
        Err(AggregateError::NoUsableData)
    } else {
        Ok(())
    }
}

fn int_cell(row: &Row, column: &str) -> Result<i64, AggregateError> {
    let value = row.get(column);
    value.and_then(coerce_int).ok_or_else(|| {
        AggregateError::Decode(format!(
            "{}: expected integer, got {}",
            column,
            describe(value)
        ))
    })
}

fn count_cell(row: &Row, column: &str) -> Result<u64, AggregateError> {
    let value = int_cell(row, column)?;
    u64::try_from(value)
        .map_err(|_| AggregateError::Decode(format!("{}: negative count {}", column, value)))
}

fn optional_count_cell(row: &Row, column: &str) -> Result<u64, AggregateError> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(0),
        Some(_) => count_cell(row, column),
    }
}

/// Whole numbers arrive as JSON integers, integral floats, or decimal
/// strings (bigint aggregates are serialised as text).
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "nothing".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::rows_from_value;
    use serde_json::json;

    #[test]
    fn test_decode_rank_rows_mixed_cell_types() {
        let rows = rows_from_value(json!([
            {"bracket": 0, "matches": 40},
            {"bracket": 70.0, "matches": "10"},
        ])).unwrap();
        let decoded = decode_rank_rows(&rows).unwrap();
        assert_eq!(
            decoded,
            vec![
                RankRow { bracket: 0, matches: 40 },
                RankRow { bracket: 70, matches: 10 },
            ]
        );
    }

    #[test]
    fn test_decode_rank_rows_empty() {
        assert_eq!(decode_rank_rows(&[]), Err(AggregateError::NoUsableData));
    }

    #[test]
    fn test_decode_rank_rows_shape_mismatch() {
        let rows = rows_from_value(json!([{"bracket": "ten", "matches": 4}])).unwrap();
        assert!(matches!(
            decode_rank_rows(&rows),
            Err(AggregateError::Decode(_))
        ));

        let rows = rows_from_value(json!([{"bracket": 10}])).unwrap();
        assert!(matches!(
            decode_rank_rows(&rows),
            Err(AggregateError::Decode(_))
        ));

        let rows = rows_from_value(json!([{"bracket": 10, "matches": 2.5}])).unwrap();
        assert!(matches!(
            decode_rank_rows(&rows),
            Err(AggregateError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_hero_rows() {
        let rows = rows_from_value(json!([
            {"hero_id": 14, "wins": "51", "matches": "100"},
        ])).unwrap();
        let decoded = decode_hero_rows(&rows).unwrap();
        assert_eq!(
            decoded,
            vec![HeroRow {
                hero_id: 14,
                wins: 51,
                matches: 100
            }]
        );
    }

    #[test]
    fn test_decode_hero_rows_rejects_null_and_negative() {
        let rows = rows_from_value(json!([{"hero_id": null, "wins": 1, "matches": 2}])).unwrap();
        assert!(matches!(
            decode_hero_rows(&rows),
            Err(AggregateError::Decode(_))
        ));

        let rows = rows_from_value(json!([{"hero_id": 3, "wins": -1, "matches": 2}])).unwrap();
        assert!(matches!(
            decode_hero_rows(&rows),
            Err(AggregateError::Decode(_))
        ));

        let rows = rows_from_value(json!([{"hero_id": 0, "wins": 1, "matches": 2}])).unwrap();
        assert!(matches!(
            decode_hero_rows(&rows),
            Err(AggregateError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_item_timings_null_counts_are_zero() {
        let rows = rows_from_value(json!([
            {"hero_id": 1, "item": "Blink Dagger", "time": 600, "games": "12", "wins": null},
            {"item": "Blink Dagger"},
        ])).unwrap();
        let decoded = decode_item_timings(&rows).unwrap();
        assert_eq!(decoded[0].games, 12);
        assert_eq!(decoded[0].wins, 0);
        assert_eq!(decoded[1].games, 0);
    }

    #[test]
    fn test_decode_item_timings_requires_name() {
        let rows = rows_from_value(json!([{"wins": 1, "games": 2}])).unwrap();
        assert!(matches!(
            decode_item_timings(&rows),
            Err(AggregateError::Decode(_))
        ));
        assert_eq!(decode_item_timings(&[]), Err(AggregateError::NoUsableData));
    }

    #[test]
    fn test_decode_faction_row() {
        let rows = rows_from_value(json!([
            {"radiant_wins": "520", "dire_wins": "480", "matches": "1000"}
        ])).unwrap();
        assert_eq!(
            decode_faction_row(&rows).unwrap(),
            FactionRow {
                radiant_wins: 520,
                dire_wins: 480,
                matches: 1000
            }
        );
    }

    #[test]
    fn test_decode_faction_row_zero_matches_with_null_sums() {
        let rows = rows_from_value(json!([
            {"radiant_wins": null, "dire_wins": null, "matches": 0}
        ])).unwrap();
        assert_eq!(decode_faction_row(&rows), Err(AggregateError::NoUsableData));
        assert_eq!(decode_faction_row(&[]), Err(AggregateError::NoUsableData));
    }
}
