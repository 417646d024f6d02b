//! Shift expansion -- turns one rule on one day into concrete shift slots.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::rule::Rule;

/// Output format for shift starts, shared with existing consumers.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single bookable slot.
///
/// `end` is `start` plus the rule's shift duration. It is not clipped to the
/// rule window, so the last shift of a day may run past `window.to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shift {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Shift {
    pub fn weekday(&self) -> chrono::Weekday {
        chrono::Datelike::weekday(&self.start)
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// Renders the start as `YYYY-MM-DD HH:MM:SS`.
impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format(TIMESTAMP_FORMAT))
    }
}

/// Shifts serialize as their start timestamp string.
impl Serialize for Shift {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Expand `rule`'s window on `day` into shifts of `shift_duration_minutes`.
///
/// Starts at `window.from` and steps by the duration while the cursor is
/// strictly before `window.to`. Does not check whether the rule matches `day`;
/// see [`crate::matcher::matches`]. A zero duration yields nothing.
pub fn expand(rule: &Rule, day: NaiveDate) -> Vec<Shift> {
    if rule.shift_duration_minutes == 0 {
        return Vec::new();
    }
    let step = Duration::minutes(i64::from(rule.shift_duration_minutes));
    let end = day.and_time(rule.window.to);

    let mut shifts = Vec::new();
    let mut cursor = day.and_time(rule.window.from);
    while cursor < end {
        shifts.push(Shift {
            start: cursor,
            end: cursor + step,
        });
        cursor += step;
    }
    shifts
}
