//! # shift-engine
//!
//! Recurring weekday availability expanded into concrete shift start times.
//!
//! An availability rule says "every Tuesday 10:00-12:00, 30 minute shifts",
//! optionally limited to a validity window and to every other week. Given a
//! set of rules, a set of unavailability exclusions and a date range, the
//! engine produces the ordered list of shift starts inside that range.
//!
//! ```rust
//! use chrono::Weekday;
//! use shift_engine::{generate_strings, Rule, ScheduleQuery};
//!
//! let rules = vec![Rule::weekly(Weekday::Mon, 20, "08:00", "09:20").unwrap()];
//! let query = ScheduleQuery::parse("2015-01-04", "2015-01-06").unwrap();
//!
//! let shifts = generate_strings(&rules, &[], &query).unwrap();
//! assert_eq!(shifts, vec![
//!     "2015-01-05 08:00:00",
//!     "2015-01-05 08:20:00",
//!     "2015-01-05 08:40:00",
//!     "2015-01-05 09:00:00",
//! ]);
//! ```
//!
//! ## Modules
//!
//! - [`rule`] — `Rule`, `Recurrence`, `Validity`, `Unavailability` and their wire shapes
//! - [`calendar`] — day-by-day iteration over an inclusive date range
//! - [`matcher`] — does a rule fire on a given day
//! - [`expander`] — one rule on one day → `Shift`s
//! - [`schedule`] — rules × days → ordered, exclusion-filtered schedule
//! - [`agenda`] — id-keyed owning collection of rules and exclusions
//! - [`ical`] — RFC 5545 RRULE export
//! - [`zone`] — pin naive shift starts to a time zone, with DST policies
//! - [`error`] — Error types

pub mod agenda;
pub mod calendar;
pub mod error;
pub mod expander;
pub mod ical;
pub mod matcher;
pub mod rule;
pub mod schedule;
pub mod zone;

pub use agenda::{Agenda, RuleId, UnavailabilityId};
pub use error::ScheduleError;
pub use expander::Shift;
pub use rule::{Recurrence, Rule, TimeWindow, Unavailability, Validity, WeekPattern};
pub use schedule::{generate, generate_strings, ScheduleEngine, ScheduleQuery};
