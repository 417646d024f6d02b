//! Decide whether a rule fires on a given calendar day.
//!
//! Matching is split into named checks so each can be reasoned about (and
//! tested) on its own:
//!
//! - [`overlaps_query`] — coarse, once per rule per query: does the validity
//!   window touch the query range at all?
//! - [`weekday_matches`] — is the day the rule's weekday?
//! - [`within_validity`] — does the exact day sit inside the validity bounds?
//! - [`recurrence_matches`] — is the day in one of the rule's active weeks?

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, ScheduleError};
use crate::rule::{Recurrence, Rule};
use crate::schedule::ScheduleQuery;

/// Range-level prefilter: `false` when the rule's validity lies entirely
/// outside the query range.
pub fn overlaps_query(rule: &Rule, query: &ScheduleQuery) -> bool {
    let Some(validity) = &rule.validity else {
        return true;
    };
    if validity.from.is_some_and(|from| from > query.to) {
        return false;
    }
    if validity.to.is_some_and(|to| to < query.from) {
        return false;
    }
    true
}

pub fn weekday_matches(rule: &Rule, day: NaiveDate) -> bool {
    day.weekday() == rule.weekday
}

/// Day-level validity: `day` lies within whichever validity bounds are set.
pub fn within_validity(rule: &Rule, day: NaiveDate) -> bool {
    rule.validity.map_or(true, |v| v.contains(day))
}

/// Whole weeks elapsed from `anchor` to `day`, rounded towards negative infinity.
pub fn week_offset(anchor: NaiveDate, day: NaiveDate) -> i64 {
    (day - anchor).num_days().div_euclid(7)
}

/// Recurrence refinement for a day that already has the right weekday.
///
/// `EveryTwoWeeks` fires on even week offsets from `validity.from`, so the
/// anchor's own week is always active.
///
/// # Errors
/// Returns `ScheduleError::Configuration` when the recurrence counts weeks but
/// the rule has no `validity.from` to count from.
pub fn recurrence_matches(rule: &Rule, day: NaiveDate) -> Result<bool> {
    if rule.recurrence == Recurrence::Weekly {
        return Ok(true);
    }
    let anchor = rule.anchor().ok_or_else(|| {
        ScheduleError::Configuration(format!(
            "{} recurrence requires validity.from",
            rule.recurrence.tag()
        ))
    })?;
    let offset = week_offset(anchor, day);
    Ok(match &rule.recurrence {
        Recurrence::Weekly => true,
        // Resolved ambiguity: the gate is "even whole-week offset from
        // validity.from". Odd weeks are the off weeks.
        Recurrence::EveryTwoWeeks => offset.rem_euclid(2) == 0,
        Recurrence::CustomWeeks(pattern) => pattern.accepts(offset),
    })
}

/// Whether `rule` produces shifts on `day` for the given query.
///
/// # Errors
/// Propagates configuration errors from [`recurrence_matches`]. A rule that is
/// filtered out before the recurrence step never errors.
pub fn matches(rule: &Rule, day: NaiveDate, query: &ScheduleQuery) -> Result<bool> {
    if !overlaps_query(rule, query) || !weekday_matches(rule, day) {
        return Ok(false);
    }
    if !within_validity(rule, day) {
        return Ok(false);
    }
    recurrence_matches(rule, day)
}
