//! RFC 5545 export of availability rules.
//!
//! Only the recurrence of the rule is exported, the `BYDAY`/`INTERVAL` part a
//! calendar client needs to show the pattern. The daily window and shift
//! duration are not RRULE concepts and are left to the caller (typically as
//! `DTSTART` at `window.from` and the event duration).

use chrono::{Days, NaiveDate, Weekday};

use crate::calendar;
use crate::matcher;
use crate::rule::{Recurrence, Rule, WeekPattern};

fn byday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// RRULE text for `rule`, or `None` for custom week patterns.
///
/// `validity.to` becomes an `UNTIL` at the end of that day, local time.
pub fn to_rrule(rule: &Rule) -> Option<String> {
    let mut rrule = match &rule.recurrence {
        Recurrence::Weekly => format!("FREQ=WEEKLY;BYDAY={}", byday(rule.weekday)),
        Recurrence::EveryTwoWeeks => {
            format!("FREQ=WEEKLY;INTERVAL=2;BYDAY={}", byday(rule.weekday))
        }
        Recurrence::CustomWeeks(_) => return None,
    };
    if let Some(until) = rule.validity.and_then(|v| v.to) {
        rrule.push_str(&format!(";UNTIL={}", until_stamp(until)));
    }
    Some(rrule)
}

/// Longest look-ahead for caller-supplied week predicates.
const PREDICATE_SEARCH_WEEKS: u64 = 520;

/// The first day at or after `from` on which the schedule fires, for use as
/// `DTSTART`.
///
/// Anchored rules only fire in the weeks their recurrence selects, counted from
/// `validity.from`, so for a two-week rule this is always an active week and
/// `INTERVAL=2` expands in phase with the engine. `None` if the rule never
/// fires again inside its validity.
pub fn first_occurrence(rule: &Rule, from: NaiveDate) -> Option<NaiveDate> {
    let start = rule.anchor().map_or(from, |anchor| anchor.max(from));
    let last = start.checked_add_days(Days::new(search_weeks(&rule.recurrence) * 7 - 1))?;
    calendar::days(start, last).find(|day| {
        matcher::weekday_matches(rule, *day)
            && matcher::within_validity(rule, *day)
            && matches!(matcher::recurrence_matches(rule, *day), Ok(true))
    })
}

/// `DTSTART` value for `rule` starting at or after `from`: the first occurrence
/// at `window.from`, as a floating local `YYYYMMDDTHHMMSS` stamp.
pub fn dtstart(rule: &Rule, from: NaiveDate) -> Option<String> {
    first_occurrence(rule, from)
        .map(|day| day.and_time(rule.window.from).format(DTSTART_FORMAT).to_string())
}

const DTSTART_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Weeks after the start day within which the first occurrence must fall.
fn search_weeks(recurrence: &Recurrence) -> u64 {
    match recurrence {
        Recurrence::Weekly => 1,
        Recurrence::EveryTwoWeeks => 2,
        Recurrence::CustomWeeks(WeekPattern::Offsets(offsets)) => offsets
            .last()
            .map_or(1, |max| u64::try_from(*max).unwrap_or(0) + 1),
        Recurrence::CustomWeeks(WeekPattern::Cycle { every, .. }) => u64::from(*every).max(1),
        Recurrence::CustomWeeks(WeekPattern::Predicate(_)) => PREDICATE_SEARCH_WEEKS,
    }
}

fn until_stamp(day: NaiveDate) -> String {
    format!("{}T235959", day.format("%Y%m%d"))
}
