//! Schedule generation -- rules × days → ordered shift list.
//!
//! Results are day-major, rule-minor: all shifts of an earlier day come first,
//! and within one day rules contribute in the order they were given. Each
//! rule's shifts for a day are already ascending, so the output is ordered by
//! day and then by declaration order, not re-sorted across rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::calendar;
use crate::error::{Result, ScheduleError};
use crate::expander::{self, Shift};
use crate::matcher;
use crate::rule::{Rule, Unavailability};

/// Date format accepted by [`ScheduleQuery::parse`].
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The `[from, to]` date window a schedule is requested for. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ScheduleQuery {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        ScheduleQuery { from, to }
    }

    /// Parse `YYYY-MM-DD` bounds.
    ///
    /// # Errors
    /// Returns `ScheduleError::Range` if either bound is not a valid date. An
    /// inverted range parses fine and later yields an empty schedule.
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Ok(ScheduleQuery {
            from: parse_date(from)?,
            to: parse_date(to)?,
        })
    }

    pub fn is_inverted(&self) -> bool {
        self.from > self.to
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| ScheduleError::Range(format!("'{}' is not a YYYY-MM-DD date: {}", s, e)))
}

/// Generate the ordered shifts produced by `rules` within `query`, minus any
/// shift whose start falls inside an unavailability interval.
///
/// An inverted query returns an empty list.
///
/// # Errors
/// Returns `ScheduleError::Configuration` if any rule or unavailability entry
/// is invalid, even one that would not fire inside the query.
pub fn generate(
    rules: &[Rule],
    unavailability: &[Unavailability],
    query: &ScheduleQuery,
) -> Result<Vec<Shift>> {
    validate_all(rules, unavailability)?;
    generate_validated(rules, unavailability, query)
}

fn validate_all(rules: &[Rule], unavailability: &[Unavailability]) -> Result<()> {
    for rule in rules {
        rule.validate()?;
    }
    for entry in unavailability {
        entry.validate()?;
    }
    Ok(())
}

fn generate_validated(
    rules: &[Rule],
    unavailability: &[Unavailability],
    query: &ScheduleQuery,
) -> Result<Vec<Shift>> {
    if query.is_inverted() {
        debug!(from = %query.from, to = %query.to, "inverted query range, empty schedule");
        return Ok(Vec::new());
    }

    // Range-level prefilter, once per rule.
    let active: Vec<&Rule> = rules
        .iter()
        .filter(|rule| matcher::overlaps_query(rule, query))
        .collect();
    trace!(
        rules = rules.len(),
        active = active.len(),
        "validity prefilter applied"
    );

    let mut shifts = Vec::new();
    for day in calendar::days(query.from, query.to) {
        for rule in &active {
            if matcher::matches(rule, day, query)? {
                shifts.extend(expander::expand(rule, day));
            }
        }
    }

    let before = shifts.len();
    if !unavailability.is_empty() {
        shifts.retain(|shift| !unavailability.iter().any(|u| u.covers(shift.start)));
    }

    debug!(
        from = %query.from,
        to = %query.to,
        shifts = shifts.len(),
        excluded = before - shifts.len(),
        "schedule generated"
    );
    Ok(shifts)
}

/// [`generate`], rendered as `YYYY-MM-DD HH:MM:SS` strings.
pub fn generate_strings(
    rules: &[Rule],
    unavailability: &[Unavailability],
    query: &ScheduleQuery,
) -> Result<Vec<String>> {
    Ok(generate(rules, unavailability, query)?
        .iter()
        .map(Shift::to_string)
        .collect())
}

/// A read-only snapshot of rules and exclusions, queried repeatedly.
///
/// Validation happens once in [`ScheduleEngine::new`]; every later
/// [`ScheduleEngine::schedule`] call is a pure function of the snapshot and
/// the query.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleEngine<'a> {
    rules: &'a [Rule],
    unavailability: &'a [Unavailability],
}

impl<'a> ScheduleEngine<'a> {
    pub fn new(rules: &'a [Rule], unavailability: &'a [Unavailability]) -> Result<Self> {
        validate_all(rules, unavailability)?;
        Ok(ScheduleEngine {
            rules,
            unavailability,
        })
    }

    pub fn schedule(&self, query: &ScheduleQuery) -> Result<Vec<Shift>> {
        generate_validated(self.rules, self.unavailability, query)
    }

    pub fn schedule_strings(&self, query: &ScheduleQuery) -> Result<Vec<String>> {
        Ok(self.schedule(query)?.iter().map(Shift::to_string).collect())
    }

    pub fn rules(&self) -> &'a [Rule] {
        self.rules
    }
}
