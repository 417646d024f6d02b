//! Tests for rule building blocks: times, weekdays and week patterns.

use chrono::{NaiveTime, Weekday};
use shift_engine::rule::{parse_weekday, WeekPredicate};
use shift_engine::{Recurrence, ScheduleError, TimeWindow, WeekPattern};

#[test]
fn single_digit_hour_parses() {
    let window = TimeWindow::parse("8:00", "12:00").unwrap();
    assert_eq!(window.from, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
}

#[test]
fn inverted_window_is_rejected() {
    let err = TimeWindow::parse("12:00", "8:00").unwrap_err();
    assert!(matches!(err, ScheduleError::Configuration(_)));
}

#[test]
fn weekday_names_are_case_insensitive() {
    assert_eq!(parse_weekday("Monday").unwrap(), Weekday::Mon);
    assert_eq!(parse_weekday("FRIDAY").unwrap(), Weekday::Fri);
    assert!(parse_weekday("someday").is_err());
}

#[test]
fn recurrence_tags_accept_legacy_spelling() {
    assert_eq!("2weeks".parse::<Recurrence>().unwrap(), Recurrence::EveryTwoWeeks);
    assert_eq!("weekly".parse::<Recurrence>().unwrap(), Recurrence::Weekly);
    assert!("customWeek".parse::<Recurrence>().is_err());
}

#[test]
fn cycle_pattern_handles_negative_offsets() {
    let pattern = WeekPattern::Cycle { every: 3, phase: 2 };
    assert!(pattern.accepts(-1));
    assert!(pattern.accepts(5));
    assert!(!pattern.accepts(0));
}

#[test]
fn predicate_equality_is_identity() {
    let a = WeekPredicate::new(|w| w > 0);
    let b = a.clone();
    let c = WeekPredicate::new(|w| w > 0);
    assert_eq!(a, b);
    assert_ne!(a, c);
}
