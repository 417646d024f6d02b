//! Tests for pinning naive shift starts to a time zone.

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use shift_engine::expander::expand;
use shift_engine::zone::{localize_all, localize_datetime, DstPolicy};
use shift_engine::Rule;

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn ordinary_time_keeps_wall_clock() {
    let tz: Tz = "Europe/Paris".parse().unwrap();
    let dt = localize_datetime(local(2016, 1, 5, 10, 0), &tz, DstPolicy::Skip).unwrap();
    assert_eq!(dt.hour(), 10);
    assert_eq!(dt.with_timezone(&Utc).hour(), 9);
}

#[test]
fn gap_is_skipped_or_moved() {
    // 2026-03-08 02:30 does not exist in America/New_York.
    let tz: Tz = "America/New_York".parse().unwrap();
    let gap = local(2026, 3, 8, 2, 30);

    assert!(localize_datetime(gap, &tz, DstPolicy::Skip).is_none());

    let forward = localize_datetime(gap, &tz, DstPolicy::ShiftForward).unwrap();
    assert_eq!((forward.hour(), forward.minute()), (3, 0));

    let wall = localize_datetime(gap, &tz, DstPolicy::WallClock).unwrap();
    assert_eq!((wall.hour(), wall.minute()), (3, 30));
}

#[test]
fn ambiguous_time_takes_earliest() {
    // 2026-11-01 01:30 happens twice in America/New_York.
    let tz: Tz = "America/New_York".parse().unwrap();
    let dt = localize_datetime(local(2026, 11, 1, 1, 30), &tz, DstPolicy::Skip).unwrap();
    assert_eq!(dt.with_timezone(&Utc).hour(), 5);
}

#[test]
fn skip_policy_drops_shifts_in_the_gap() {
    let tz: Tz = "America/New_York".parse().unwrap();
    let rule = Rule::weekly(Weekday::Sun, 30, "01:30", "03:30").unwrap();
    let shifts = expand(&rule, NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
    assert_eq!(shifts.len(), 4);
    // 02:00 and 02:30 fall in the gap.
    assert_eq!(localize_all(&shifts, &tz, DstPolicy::Skip).len(), 2);
    assert_eq!(localize_all(&shifts, &tz, DstPolicy::WallClock).len(), 4);
}
