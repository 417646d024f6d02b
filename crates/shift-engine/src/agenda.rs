//! The owning collection of availability rules and unavailability entries.
//!
//! An [`Agenda`] keeps both collections as insertion-ordered maps from id to
//! entry. Ids are assigned when an entry is appended and never change, so
//! removing one entry leaves every other id valid. No positional indices are
//! exposed.
//!
//! Persistence is the caller's concern: an agenda converts to and from a JSON
//! document and otherwise lives in memory.
//!
//! ```json
//! {
//!   "availability": [
//!     {"id": "…", "type": "weekday", "shiftDuration": 20, "weekday": "monday",
//!      "window": {"from": "8:00", "to": "12:00"}}
//!   ],
//!   "unavailability": [
//!     {"id": "…", "reason": "holiday", "from": "2015-01-01T00:00:00", "to": "2015-01-01T23:59:59"}
//!   ]
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, ScheduleError};
use crate::expander::Shift;
use crate::rule::{Rule, RuleRecord, Unavailability};
use crate::schedule::{self, ScheduleQuery};

macro_rules! entry_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ScheduleError;

            fn from_str(s: &str) -> Result<Self> {
                Uuid::parse_str(s.trim()).map($name).map_err(|e| {
                    ScheduleError::Configuration(format!("invalid {} id '{}': {}", $label, s, e))
                })
            }
        }
    };
}

entry_id!(RuleId, "rule");
entry_id!(UnavailabilityId, "unavailability");

/// Availability rules and unavailability entries owned by one schedule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Agenda {
    availability: IndexMap<RuleId, Rule>,
    unavailability: IndexMap<UnavailabilityId, Unavailability>,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append one rule, returning its new id.
    ///
    /// # Errors
    /// Returns `ScheduleError::Configuration` if the rule is invalid; the
    /// agenda is left unchanged.
    pub fn add_availability(&mut self, rule: Rule) -> Result<RuleId> {
        rule.validate()?;
        let id = RuleId::new();
        info!(%id, weekday = ?rule.weekday, recurrence = rule.recurrence.tag(), "availability added");
        self.availability.insert(id, rule);
        Ok(id)
    }

    /// Append several rules. Either all are appended or, if any is invalid,
    /// none are.
    pub fn add_availability_batch(&mut self, rules: Vec<Rule>) -> Result<Vec<RuleId>> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(rules
            .into_iter()
            .map(|rule| {
                let id = RuleId::new();
                self.availability.insert(id, rule);
                id
            })
            .inspect(|id| info!(%id, "availability added"))
            .collect())
    }

    /// Remove a rule by id, returning it. Remaining rules keep their order.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown id.
    pub fn remove_availability(&mut self, id: RuleId) -> Result<Rule> {
        let rule = self
            .availability
            .shift_remove(&id)
            .ok_or_else(|| ScheduleError::NotFound(format!("availability {}", id)))?;
        info!(%id, "availability removed");
        Ok(rule)
    }

    /// Validate and append one unavailability entry, returning its new id.
    pub fn add_unavailability(&mut self, entry: Unavailability) -> Result<UnavailabilityId> {
        entry.validate()?;
        let id = UnavailabilityId::new();
        info!(%id, from = %entry.from, to = %entry.to, "unavailability added");
        self.unavailability.insert(id, entry);
        Ok(id)
    }

    /// Append several unavailability entries, all or nothing.
    pub fn add_unavailability_batch(
        &mut self,
        entries: Vec<Unavailability>,
    ) -> Result<Vec<UnavailabilityId>> {
        for entry in &entries {
            entry.validate()?;
        }
        Ok(entries
            .into_iter()
            .map(|entry| {
                let id = UnavailabilityId::new();
                self.unavailability.insert(id, entry);
                id
            })
            .inspect(|id| info!(%id, "unavailability added"))
            .collect())
    }

    /// Remove an unavailability entry by id, returning it.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown id.
    pub fn remove_unavailability(&mut self, id: UnavailabilityId) -> Result<Unavailability> {
        let entry = self
            .unavailability
            .shift_remove(&id)
            .ok_or_else(|| ScheduleError::NotFound(format!("unavailability {}", id)))?;
        info!(%id, "unavailability removed");
        Ok(entry)
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.availability.get(&id)
    }

    pub fn unavailability_entry(&self, id: UnavailabilityId) -> Option<&Unavailability> {
        self.unavailability.get(&id)
    }

    /// Rules with their ids, in insertion order.
    pub fn availability(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.availability.iter().map(|(id, rule)| (*id, rule))
    }

    /// Unavailability entries with their ids, in insertion order.
    pub fn unavailability(&self) -> impl Iterator<Item = (UnavailabilityId, &Unavailability)> {
        self.unavailability.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn list_availability_rules(&self) -> Vec<Rule> {
        self.availability.values().cloned().collect()
    }

    pub fn list_unavailability(&self) -> Vec<Unavailability> {
        self.unavailability.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.availability.is_empty() && self.unavailability.is_empty()
    }

    /// Generate the schedule for `query` from a snapshot of the current entries.
    pub fn get_schedule(&self, query: &ScheduleQuery) -> Result<Vec<Shift>> {
        schedule::generate(
            &self.list_availability_rules(),
            &self.list_unavailability(),
            query,
        )
    }

    /// Load an agenda document. Entries without an `id` get a fresh one.
    ///
    /// # Errors
    /// Returns `ScheduleError::Json` for malformed JSON and
    /// `ScheduleError::Configuration` for invalid entries or duplicate ids.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: AgendaDocument = serde_json::from_str(json)?;

        let mut agenda = Agenda::new();
        for mut value in document.availability {
            let id: RuleId = take_id(&mut value)?;
            let record: RuleRecord = serde_json::from_value(value)?;
            if agenda.availability.insert(id, Rule::try_from(record)?).is_some() {
                return Err(ScheduleError::Configuration(format!(
                    "duplicate availability id {}",
                    id
                )));
            }
        }
        for mut value in document.unavailability {
            let id: UnavailabilityId = take_id(&mut value)?;
            let entry: Unavailability = serde_json::from_value(value)?;
            entry.validate()?;
            if agenda.unavailability.insert(id, entry).is_some() {
                return Err(ScheduleError::Configuration(format!(
                    "duplicate unavailability id {}",
                    id
                )));
            }
        }
        Ok(agenda)
    }

    /// Pretty-printed agenda document, ids included.
    ///
    /// # Errors
    /// Returns `ScheduleError::Json` if a rule uses an in-memory week predicate,
    /// which has no serialized form.
    pub fn to_json(&self) -> Result<String> {
        let mut document = AgendaDocument::default();
        for (id, rule) in self.availability() {
            let value = serde_json::to_value(RuleRecord::from(rule.clone()))?;
            document.availability.push(with_id(id, value));
        }
        for (id, entry) in self.unavailability() {
            document.unavailability.push(with_id(id, serde_json::to_value(entry)?));
        }
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

// ---------------------------------------------------------------------------
// Document shapes
// ---------------------------------------------------------------------------

/// Entries stay untyped until their `id` has been split off.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AgendaDocument {
    #[serde(default)]
    availability: Vec<Value>,
    #[serde(default)]
    unavailability: Vec<Value>,
}

fn take_id<I>(value: &mut Value) -> Result<I>
where
    I: FromStr<Err = ScheduleError> + Default,
{
    match value.as_object_mut().and_then(|fields| fields.remove("id")) {
        None => Ok(I::default()),
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(ScheduleError::Configuration(format!(
            "entry id must be a string, got {}",
            other
        ))),
    }
}

fn with_id(id: impl fmt::Display, value: Value) -> Value {
    let mut entry = Map::new();
    entry.insert("id".to_string(), Value::String(id.to_string()));
    if let Value::Object(fields) = value {
        entry.extend(fields);
    }
    Value::Object(entry)
}
