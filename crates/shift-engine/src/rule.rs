//! Availability rules and unavailability exclusions.
//!
//! A [`Rule`] describes one recurring weekday window ("every Monday 08:00-12:00,
//! 20 minute shifts"). Rules are plain data: matching and expansion live in
//! [`crate::matcher`] and [`crate::expander`].
//!
//! Rules travel over the wire as [`RuleRecord`], a loosely typed mirror whose
//! strings are checked when converted into a `Rule`. Unknown tags and broken
//! invariants surface as [`ScheduleError::Configuration`], never as silent
//! defaults.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Wire format for times of day inside a rule window.
const TIME_FORMAT: &str = "%H:%M";

/// The family a rule belongs to. Only weekday rules exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleKind {
    #[default]
    Weekday,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Weekday => "weekday",
        }
    }
}

impl FromStr for RuleKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekday" => Ok(RuleKind::Weekday),
            other => Err(ScheduleError::Configuration(format!(
                "unknown rule kind '{}'",
                other
            ))),
        }
    }
}

/// A shared `week offset -> bool` predicate for [`WeekPattern::Predicate`].
#[derive(Clone)]
pub struct WeekPredicate(Arc<dyn Fn(i64) -> bool + Send + Sync>);

impl WeekPredicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(i64) -> bool + Send + Sync + 'static,
    {
        WeekPredicate(Arc::new(f))
    }

    pub fn call(&self, week_offset: i64) -> bool {
        (self.0)(week_offset)
    }
}

impl fmt::Debug for WeekPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeekPredicate(..)")
    }
}

impl PartialEq for WeekPredicate {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

/// Which weeks a [`Recurrence::CustomWeeks`] rule fires on.
///
/// Every variant is evaluated against the number of whole weeks between the
/// rule's `validity.from` anchor and the candidate day (week 0 is the anchor's
/// own week).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekPattern {
    /// Fire only on the listed week offsets.
    Offsets(BTreeSet<i64>),
    /// Fire when `offset mod every == phase`.
    Cycle { every: u32, phase: u32 },
    /// Caller-supplied predicate. Not serializable.
    #[serde(skip)]
    Predicate(WeekPredicate),
}

impl WeekPattern {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(i64) -> bool + Send + Sync + 'static,
    {
        WeekPattern::Predicate(WeekPredicate::new(f))
    }

    pub fn accepts(&self, week_offset: i64) -> bool {
        match self {
            WeekPattern::Offsets(offsets) => offsets.contains(&week_offset),
            WeekPattern::Cycle { every, phase } => {
                week_offset.rem_euclid(i64::from(*every)) == i64::from(*phase)
            }
            WeekPattern::Predicate(p) => p.call(week_offset),
        }
    }

    fn validate(&self) -> Result<()> {
        if let WeekPattern::Cycle { every, phase } = self {
            if *every == 0 {
                return Err(ScheduleError::Configuration(
                    "week cycle length must be positive".to_string(),
                ));
            }
            if phase >= every {
                return Err(ScheduleError::Configuration(format!(
                    "week cycle phase {} is out of range for a cycle of {}",
                    phase, every
                )));
            }
        }
        Ok(())
    }
}

/// How often a weekday rule repeats.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Recurrence {
    /// Every matching weekday.
    #[default]
    Weekly,
    /// Matching weekdays in even weeks counted from `validity.from`.
    EveryTwoWeeks,
    /// Matching weekdays in the weeks selected by the pattern.
    CustomWeeks(WeekPattern),
}

impl Recurrence {
    /// Whether this recurrence counts weeks from `validity.from`.
    pub fn needs_anchor(&self) -> bool {
        !matches!(self, Recurrence::Weekly)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Recurrence::Weekly => "weekly",
            Recurrence::EveryTwoWeeks => "every_two_weeks",
            Recurrence::CustomWeeks(_) => "custom_weeks",
        }
    }
}

impl FromStr for Recurrence {
    type Err = ScheduleError;

    /// Parse a bare recurrence tag. `custom_weeks` cannot be written as a bare
    /// tag because it carries a [`WeekPattern`].
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "weekly" => Ok(Recurrence::Weekly),
            "every_two_weeks" | "2weeks" => Ok(Recurrence::EveryTwoWeeks),
            "custom_weeks" | "customWeek" => Err(ScheduleError::Configuration(
                "custom_weeks recurrence requires a week pattern".to_string(),
            )),
            other => Err(ScheduleError::Configuration(format!(
                "unknown recurrence '{}'",
                other
            ))),
        }
    }
}

/// Time-of-day window a rule is available in. `from` is strictly before `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: NaiveTime,
    pub to: NaiveTime,
}

impl TimeWindow {
    pub fn new(from: NaiveTime, to: NaiveTime) -> Result<Self> {
        let window = TimeWindow { from, to };
        window.validate()?;
        Ok(window)
    }

    /// Parse an `HH:MM` pair (a single-digit hour such as `8:00` is accepted).
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        TimeWindow::new(parse_time(from)?, parse_time(to)?)
    }

    fn validate(&self) -> Result<()> {
        if self.from >= self.to {
            return Err(ScheduleError::Configuration(format!(
                "window start {} must be before window end {}",
                self.from.format(TIME_FORMAT),
                self.to.format(TIME_FORMAT)
            )));
        }
        Ok(())
    }
}

/// Inclusive date bounds restricting the days a rule may fire on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Validity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl Validity {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Validity {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Whether `day` lies within whichever bounds are present.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= day) && self.to.map_or(true, |to| day <= to)
    }

    fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ScheduleError::Configuration(format!(
                    "validity starts on {} but ends on {}",
                    from, to
                )));
            }
        }
        Ok(())
    }
}

/// One recurring availability definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleRecord", into = "RuleRecord")]
pub struct Rule {
    pub kind: RuleKind,
    pub shift_duration_minutes: u32,
    pub weekday: Weekday,
    pub recurrence: Recurrence,
    pub window: TimeWindow,
    pub validity: Option<Validity>,
}

impl Rule {
    /// A weekly rule on `weekday` between two `HH:MM` times.
    ///
    /// # Errors
    /// Returns `ScheduleError::Configuration` if either time is unparseable, the
    /// window is empty or inverted, or the duration is zero.
    pub fn weekly(weekday: Weekday, shift_duration_minutes: u32, from: &str, to: &str) -> Result<Self> {
        let rule = Rule {
            kind: RuleKind::Weekday,
            shift_duration_minutes,
            weekday,
            recurrence: Recurrence::Weekly,
            window: TimeWindow::parse(from, to)?,
            validity: None,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validity = Some(validity);
        self
    }

    /// The week-counting anchor, if the rule has one.
    pub fn anchor(&self) -> Option<NaiveDate> {
        self.validity.and_then(|v| v.from)
    }

    /// Check every structural invariant of the rule.
    ///
    /// # Errors
    /// Returns `ScheduleError::Configuration` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.shift_duration_minutes == 0 {
            return Err(ScheduleError::Configuration(
                "shift duration must be a positive number of minutes".to_string(),
            ));
        }
        self.window.validate()?;
        if let Some(validity) = &self.validity {
            validity.validate()?;
        }
        if self.recurrence.needs_anchor() && self.anchor().is_none() {
            return Err(ScheduleError::Configuration(format!(
                "{} recurrence requires validity.from",
                self.recurrence.tag()
            )));
        }
        if let Recurrence::CustomWeeks(pattern) = &self.recurrence {
            pattern.validate()?;
        }
        Ok(())
    }
}

/// A closed interval during which no shift may start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unavailability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl Unavailability {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Result<Self> {
        let entry = Unavailability {
            reason: None,
            from,
            to,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Cover whole days: from midnight on `from` through 23:59:59 on `to`.
    pub fn whole_days(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        Unavailability::new(from.and_time(NaiveTime::MIN), to.and_time(end_of_day()))
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Inclusive on both ends.
    pub fn covers(&self, at: NaiveDateTime) -> bool {
        self.from <= at && at <= self.to
    }

    pub fn validate(&self) -> Result<()> {
        if self.from > self.to {
            return Err(ScheduleError::Configuration(format!(
                "unavailability starts at {} but ends at {}",
                self.from, self.to
            )));
        }
        Ok(())
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|e| {
        ScheduleError::Configuration(format!("invalid time of day '{}': {}", s, e))
    })
}

/// Parse a weekday name, case-insensitively (`monday`, `Monday`, `mon`).
pub fn parse_weekday(s: &str) -> Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| ScheduleError::Configuration(format!("unknown weekday '{}'", s)))
}

/// Lowercase English weekday name, as used on the wire and in matching.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Serialized form of a [`Rule`].
///
/// ```json
/// {"type": "weekday", "shiftDuration": 20, "weekday": "monday",
///  "window": {"from": "8:00", "to": "12:00"},
///  "recurrence": "2weeks", "validity": {"from": "2016-01-01"}}
/// ```
///
/// Older documents keep the weekday and recurrence in a nested `options`
/// object and call the window `schedule`:
///
/// ```json
/// {"type": "weekday", "shiftDuration": 20,
///  "options": {"weekday": "monday", "repeat": "weekly"},
///  "schedule": {"from": "8:00", "to": "12:00"}}
/// ```
///
/// Top-level fields win over `options` when both are present. Records are
/// always written in the flat form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    #[serde(rename = "type", alias = "kind", default = "default_kind")]
    pub kind: String,
    pub shift_duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,
    #[serde(default, alias = "repeat", skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionsRecord>,
    #[serde(alias = "schedule")]
    pub window: WindowRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<Validity>,
}

fn default_kind() -> String {
    RuleKind::Weekday.as_str().to_string()
}

/// The nested `options` object of older rule documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsRecord {
    #[serde(default, alias = "day", skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,
    #[serde(default, alias = "recurrence", skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RecurrenceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowRecord {
    pub from: String,
    pub to: String,
}

/// A bare recurrence tag, or `{"custom_weeks": <pattern>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecurrenceRecord {
    Tag(String),
    Custom {
        #[serde(alias = "customWeek")]
        custom_weeks: WeekPattern,
    },
}

impl TryFrom<RuleRecord> for Rule {
    type Error = ScheduleError;

    fn try_from(record: RuleRecord) -> Result<Self> {
        let kind: RuleKind = record.kind.parse()?;
        let shift_duration_minutes = u32::try_from(record.shift_duration)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| {
                ScheduleError::Configuration(format!(
                    "shift duration must be a positive number of minutes, got {}",
                    record.shift_duration
                ))
            })?;
        let options = record.options.unwrap_or_default();
        let weekday = record.weekday.or(options.weekday).ok_or_else(|| {
            ScheduleError::Configuration("weekday rule has no weekday".to_string())
        })?;
        let recurrence = match record.recurrence.or(options.repeat) {
            None => Recurrence::Weekly,
            Some(RecurrenceRecord::Tag(tag)) => tag.parse()?,
            Some(RecurrenceRecord::Custom { custom_weeks }) => Recurrence::CustomWeeks(custom_weeks),
        };
        let rule = Rule {
            kind,
            shift_duration_minutes,
            weekday: parse_weekday(&weekday)?,
            recurrence,
            window: TimeWindow::parse(&record.window.from, &record.window.to)?,
            validity: record.validity,
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl From<Rule> for RuleRecord {
    fn from(rule: Rule) -> Self {
        let recurrence = match rule.recurrence {
            Recurrence::Weekly => None,
            Recurrence::CustomWeeks(pattern) => Some(RecurrenceRecord::Custom {
                custom_weeks: pattern,
            }),
            other => Some(RecurrenceRecord::Tag(other.tag().to_string())),
        };
        RuleRecord {
            kind: rule.kind.as_str().to_string(),
            shift_duration: i64::from(rule.shift_duration_minutes),
            weekday: Some(weekday_name(rule.weekday).to_string()),
            recurrence,
            options: None,
            window: WindowRecord {
                from: rule.window.from.format(TIME_FORMAT).to_string(),
                to: rule.window.to.format(TIME_FORMAT).to_string(),
            },
            validity: rule.validity,
        }
    }
}
