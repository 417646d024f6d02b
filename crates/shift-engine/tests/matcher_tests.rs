//! Tests for the individual rule-matching checks.

use chrono::{NaiveDate, Weekday};
use shift_engine::matcher::{
    matches, overlaps_query, recurrence_matches, week_offset, weekday_matches, within_validity,
};
use shift_engine::{Recurrence, Rule, ScheduleError, ScheduleQuery, Validity, WeekPattern};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tuesday() -> Rule {
    Rule::weekly(Weekday::Tue, 30, "10:00", "12:00").unwrap()
}

fn january() -> Validity {
    Validity::between(date(2016, 1, 1), date(2016, 1, 31))
}

// ---------------------------------------------------------------------------
// Range-level prefilter
// ---------------------------------------------------------------------------

#[test]
fn rule_without_validity_overlaps_everything() {
    let q = ScheduleQuery::new(date(1999, 1, 1), date(1999, 1, 2));
    assert!(overlaps_query(&tuesday(), &q));
}

#[test]
fn validity_after_query_does_not_overlap() {
    let rule = tuesday().with_validity(january());
    assert!(!overlaps_query(&rule, &ScheduleQuery::new(date(2015, 12, 1), date(2015, 12, 31))));
}

#[test]
fn validity_before_query_does_not_overlap() {
    let rule = tuesday().with_validity(january());
    assert!(!overlaps_query(&rule, &ScheduleQuery::new(date(2016, 2, 1), date(2016, 12, 31))));
}

#[test]
fn touching_bounds_overlap() {
    let rule = tuesday().with_validity(january());
    assert!(overlaps_query(&rule, &ScheduleQuery::new(date(2016, 1, 31), date(2016, 2, 5))));
    assert!(overlaps_query(&rule, &ScheduleQuery::new(date(2015, 12, 20), date(2016, 1, 1))));
}

// ---------------------------------------------------------------------------
// Day-level checks
// ---------------------------------------------------------------------------

#[test]
fn weekday_check() {
    assert!(weekday_matches(&tuesday(), date(2016, 1, 5)));
    assert!(!weekday_matches(&tuesday(), date(2016, 1, 6)));
}

#[test]
fn day_level_validity_is_inclusive() {
    let rule = tuesday().with_validity(Validity::between(date(2016, 1, 5), date(2016, 1, 12)));
    assert!(within_validity(&rule, date(2016, 1, 5)));
    assert!(within_validity(&rule, date(2016, 1, 12)));
    assert!(!within_validity(&rule, date(2016, 1, 4)));
    assert!(!within_validity(&rule, date(2016, 1, 13)));
}

#[test]
fn matches_rejects_day_outside_validity_inside_query() {
    let rule = tuesday().with_validity(Validity::between(date(2016, 1, 10), date(2016, 1, 20)));
    let q = ScheduleQuery::new(date(2016, 1, 1), date(2016, 1, 31));
    assert!(!matches(&rule, date(2016, 1, 5), &q).unwrap());
    assert!(matches(&rule, date(2016, 1, 12), &q).unwrap());
}

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

#[test]
fn week_offset_counts_whole_weeks() {
    let anchor = date(2016, 1, 1);
    assert_eq!(week_offset(anchor, date(2016, 1, 1)), 0);
    assert_eq!(week_offset(anchor, date(2016, 1, 7)), 0);
    assert_eq!(week_offset(anchor, date(2016, 1, 8)), 1);
    assert_eq!(week_offset(anchor, date(2015, 12, 31)), -1);
}

#[test]
fn weekly_always_matches() {
    assert!(recurrence_matches(&tuesday(), date(2016, 1, 12)).unwrap());
}

#[test]
fn every_two_weeks_alternates() {
    let rule = tuesday()
        .with_recurrence(Recurrence::EveryTwoWeeks)
        .with_validity(Validity {
            from: Some(date(2016, 1, 5)),
            to: None,
        });
    assert!(recurrence_matches(&rule, date(2016, 1, 5)).unwrap());
    assert!(!recurrence_matches(&rule, date(2016, 1, 12)).unwrap());
    assert!(recurrence_matches(&rule, date(2016, 1, 19)).unwrap());
}

#[test]
fn every_two_weeks_without_anchor_fails_fast() {
    let rule = tuesday().with_recurrence(Recurrence::EveryTwoWeeks);
    let err = recurrence_matches(&rule, date(2016, 1, 5)).unwrap_err();
    assert!(matches!(err, ScheduleError::Configuration(_)));
}

#[test]
fn custom_weeks_without_anchor_fails_fast() {
    let rule = tuesday().with_recurrence(Recurrence::CustomWeeks(WeekPattern::Cycle {
        every: 3,
        phase: 0,
    }));
    assert!(recurrence_matches(&rule, date(2016, 1, 5)).is_err());
}

#[test]
fn wrong_weekday_never_reaches_recurrence() {
    // No anchor, but the day is a Wednesday: filtered before the recurrence check.
    let rule = tuesday().with_recurrence(Recurrence::EveryTwoWeeks);
    let q = ScheduleQuery::new(date(2016, 1, 1), date(2016, 1, 31));
    assert!(!matches(&rule, date(2016, 1, 6), &q).unwrap());
}

#[test]
fn cycle_pattern_selects_weeks() {
    let rule = tuesday()
        .with_recurrence(Recurrence::CustomWeeks(WeekPattern::Cycle { every: 3, phase: 1 }))
        .with_validity(Validity {
            from: Some(date(2016, 1, 5)),
            to: None,
        });
    assert!(!recurrence_matches(&rule, date(2016, 1, 5)).unwrap());
    assert!(recurrence_matches(&rule, date(2016, 1, 12)).unwrap());
    assert!(!recurrence_matches(&rule, date(2016, 1, 19)).unwrap());
    assert!(recurrence_matches(&rule, date(2016, 2, 2)).unwrap());
}
