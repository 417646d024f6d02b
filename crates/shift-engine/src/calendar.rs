//! Day-by-day iteration over an inclusive date range.

use std::iter::FusedIterator;

use chrono::NaiveDate;

/// Lazy iterator over the calendar days of `[from, to]`, ascending.
///
/// Cheap to clone. A clone taken before iteration replays the whole range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDays {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

/// Iterate every day from `from` to `to`, both inclusive.
///
/// An inverted range (`from > to`) yields nothing rather than failing.
pub fn days(from: NaiveDate, to: NaiveDate) -> CalendarDays {
    CalendarDays {
        next: (from <= to).then_some(from),
        last: to,
    }
}

impl Iterator for CalendarDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let day = self.next?;
        self.next = if day < self.last { day.succ_opt() } else { None };
        Some(day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map(|day| (self.last - day).num_days() as usize + 1)
            .unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CalendarDays {}

impl FusedIterator for CalendarDays {}
