//! Error types for shift-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A rule or unavailability entry is structurally invalid.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A query bound could not be read as a calendar date.
    #[error("Invalid query range: {0}")]
    Range(String),

    /// No entry with the given id exists in the agenda.
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// An agenda document was not valid JSON or did not match the entry shapes.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
