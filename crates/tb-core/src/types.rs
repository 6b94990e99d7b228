//! Core value types with validation.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The clock time is not a valid time of day.
    #[error("clock time out of range: {hour}:{minute:02}")]
    ClockOutOfRange { hour: u32, minute: u32 },
}

/// A task code as written in the log (e.g. `A`).
///
/// Codes keep their original spelling for display; [`TaskCode::key`] gives the
/// case-insensitive grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskCode(String);

impl TaskCode {
    /// Creates a new code after validation.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ValidationError::Empty { field: "task code" });
        }
        Ok(Self(code))
    }

    /// Returns the code as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lowercase grouping key, so `A` and `a` land in one group.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl TryFrom<String> for TaskCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskCode> for String {
    fn from(code: TaskCode) -> Self {
        code.0
    }
}

impl fmt::Display for TaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TaskCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Creates a clock time; hour must be in `0..=23` and minute in `0..=59`.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or(ValidationError::ClockOutOfRange { hour, minute })
    }

    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    /// Signed minutes from `self` to `end` on the same day.
    ///
    /// Negative when `end` is earlier than `self`; no day wrap is applied.
    #[must_use]
    pub fn minutes_until(self, end: Self) -> i64 {
        end.0.signed_duration_since(self.0).num_minutes()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour(), self.minute())
    }
}
