//! Calendar-year query windows.

use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Half-open window `[start, end)` in Unix epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start
    pub start: i64,

    /// Exclusive end
    pub end: i64,
}

impl TimeWindow {
    /// Window covering the UTC calendar year: Jan 1 of `year` up to Jan 1 of `year + 1`.
    ///
    /// Total over every `i32`; no range check is applied.
    pub fn for_year(year: i32) -> Self {
        let year = i64::from(year);
        Self {
            start: jan_first_days(year) * SECONDS_PER_DAY,
            end: jan_first_days(year + 1) * SECONDS_PER_DAY,
        }
    }

    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts < self.end
    }
}

/// Days from 1970-01-01 to Jan 1 of `year` in the proleptic Gregorian calendar.
///
/// Computed directly since chrono's `NaiveDate` range does not cover every `i32` year.
fn jan_first_days(year: i64) -> i64 {
    // Years are counted from March so the leap day falls at the end.
    let y = year - 1;
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + 306;
    era * 146_097 + doe - 719_468
}
