//! Task intervals - one parsed timebook line.

use crate::types::{ClockTime, TaskCode};

pub(crate) const MINUTES_PER_DAY: i64 = 24 * 60;

/// A block of time spent on one task.
///
/// Built by the parser and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInterval {
    code: TaskCode,
    start: ClockTime,
    end: ClockTime,
    duration_minutes: i64,
}

impl TaskInterval {
    /// Creates an interval whose duration is the literal `end - start`.
    pub fn new(code: TaskCode, start: ClockTime, end: ClockTime) -> Self {
        Self {
            duration_minutes: start.minutes_until(end),
            code,
            start,
            end,
        }
    }

    /// Reinterprets an interval whose end precedes its start as ending on the
    /// following day.
    pub(crate) fn wrapped_past_midnight(mut self) -> Self {
        if self.duration_minutes < 0 {
            self.duration_minutes += MINUTES_PER_DAY;
        }
        self
    }

    pub fn code(&self) -> &TaskCode {
        &self.code
    }

    /// Lowercase grouping key of the task code.
    pub fn key(&self) -> String {
        self.code.key()
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> ClockTime {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }
}
