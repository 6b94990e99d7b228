//! Timebook line parser.
//!
//! A task line looks like `- (A 9:00 - 10:30) free text`. Lines that do not
//! start with `- (` after trimming are not task lines and are skipped without
//! an error. Candidate lines that fail the grammar produce a [`ParseError`]
//! and are skipped too, so one bad line never stops the rest of the file.

use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::TaskInterval;
use crate::types::{ClockTime, TaskCode, ValidationError};

/// Prefix that marks a candidate task line.
pub const TASK_LINE_MARKER: &str = "- (";

/// `- (<meta>)` followed by an optional description. The meta group is the
/// narrowest match so descriptions may contain `)`.
static TASK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \((.+?)\)(?:\s+(.*))?$").unwrap());

/// `<code> <h>:<m> - <h>:<m>` inside the parentheses.
static META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z])\s+(\d{1,2}):(\d{1,2})\s+-\s+(\d{1,2}):(\d{1,2})\s*$").unwrap()
});

/// Why a candidate task line was rejected. Every variant carries the line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid task line format: {line}")]
    Shape { line: String },

    #[error("invalid time format in task line: {line}")]
    Meta { line: String },

    #[error("{source} in task line: {line}")]
    ClockOutOfRange {
        line: String,
        source: ValidationError,
    },

    #[error("end time precedes start time in task line: {line}")]
    EndBeforeStart { line: String },
}

impl ParseError {
    /// The literal text of the offending line.
    pub fn line(&self) -> &str {
        match self {
            Self::Shape { line }
            | Self::Meta { line }
            | Self::ClockOutOfRange { line, .. }
            | Self::EndBeforeStart { line } => line,
        }
    }
}

/// What to do with a line whose end time is earlier than its start time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeDurationPolicy {
    /// Reject the line with [`ParseError::EndBeforeStart`].
    #[default]
    Reject,
    /// Treat the interval as crossing midnight and add 24 hours.
    WrapMidnight,
    /// Keep the negative duration as written.
    Keep,
}

/// A rejected line together with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub line_number: usize,
    pub error: ParseError,
}

/// Result of parsing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub intervals: Vec<TaskInterval>,
    pub errors: Vec<LineError>,
}

/// Splits raw file content into lines, tolerating `\r\n` endings.
pub fn split_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect()
}

/// Returns true if `line` is a candidate task line.
pub fn is_task_line(line: &str) -> bool {
    line.trim().starts_with(TASK_LINE_MARKER)
}

/// Parses a single candidate task line.
///
/// Surrounding whitespace is ignored. The description is not interpreted.
pub fn parse_task_line(
    line: &str,
    policy: NegativeDurationPolicy,
) -> Result<TaskInterval, ParseError> {
    let trimmed = line.trim();

    let Some(caps) = TASK_LINE_RE.captures(trimmed) else {
        return Err(ParseError::Shape {
            line: trimmed.to_string(),
        });
    };
    let Some(meta) = META_RE.captures(&caps[1]) else {
        return Err(ParseError::Meta {
            line: trimmed.to_string(),
        });
    };

    // Digit groups are at most two characters, so parsing cannot overflow.
    let number = |idx: usize| meta[idx].parse::<u32>().unwrap_or_default();
    let clock = |hour: usize, minute: usize| {
        ClockTime::new(number(hour), number(minute)).map_err(|source| {
            ParseError::ClockOutOfRange {
                line: trimmed.to_string(),
                source,
            }
        })
    };

    let code = TaskCode::new(&meta[1]).map_err(|_| ParseError::Meta {
        line: trimmed.to_string(),
    })?;
    let start = clock(2, 3)?;
    let end = clock(4, 5)?;

    let interval = TaskInterval::new(code, start, end);
    if interval.duration_minutes() >= 0 {
        return Ok(interval);
    }
    match policy {
        NegativeDurationPolicy::Reject => Err(ParseError::EndBeforeStart {
            line: trimmed.to_string(),
        }),
        NegativeDurationPolicy::WrapMidnight => Ok(interval.wrapped_past_midnight()),
        NegativeDurationPolicy::Keep => Ok(interval),
    }
}

/// Parses every task line in `lines`, skipping everything else.
///
/// Rejected task lines are collected in [`ParseOutcome::errors`] and do not
/// affect the lines around them.
pub fn parse_lines<I, S>(lines: I, policy: NegativeDurationPolicy) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcome = ParseOutcome::default();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if !is_task_line(line) {
            continue;
        }
        match parse_task_line(line, policy) {
            Ok(interval) => outcome.intervals.push(interval),
            Err(error) => {
                let line_number = idx + 1;
                tracing::warn!(line_number, error = %error, "skipping malformed task line");
                outcome.errors.push(LineError { line_number, error });
            }
        }
    }

    tracing::debug!(
        intervals = outcome.intervals.len(),
        errors = outcome.errors.len(),
        "parsed timebook lines"
    );
    outcome
}

/// Parses several documents in parallel.
///
/// Outcomes are returned in the same order as `documents`.
pub fn parse_documents<D>(documents: &[D], policy: NegativeDurationPolicy) -> Vec<ParseOutcome>
where
    D: AsRef<str> + Sync,
{
    documents
        .par_iter()
        .map(|doc| parse_lines(split_lines(doc.as_ref()), policy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<TaskInterval, ParseError> {
        parse_task_line(line, NegativeDurationPolicy::Reject)
    }

    #[test]
    fn parses_basic_line() {
        let interval = parse("- (a 09:00 - 10:30) writing").unwrap();
        assert_eq!(interval.code().as_str(), "a");
        assert_eq!(interval.start(), ClockTime::new(9, 0).unwrap());
        assert_eq!(interval.end(), ClockTime::new(10, 30).unwrap());
        assert_eq!(interval.duration_minutes(), 90);
    }

    #[test]
    fn uppercase_code_groups_lowercase() {
        let interval = parse("- (B 8:00 - 8:15) standup").unwrap();
        assert_eq!(interval.code().as_str(), "B");
        assert_eq!(interval.key(), "b");
        assert_eq!(interval.duration_minutes(), 15);
    }

    #[test]
    fn tolerates_extra_spaces_and_missing_description() {
        let interval = parse("- (V   1:23   -   4:56 ) Task description").unwrap();
        assert_eq!(interval.duration_minutes(), 213);

        let bare = parse("- (V 1:23 - 4:56)").unwrap();
        assert_eq!(bare.duration_minutes(), 213);
    }

    #[test]
    fn description_may_contain_parentheses() {
        let interval = parse("- (m 13:00 - 13:45) sync (with ops) about deploy)").unwrap();
        assert_eq!(interval.key(), "m");
        assert_eq!(interval.duration_minutes(), 45);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let interval = parse("  \t- (a 9:00 - 9:30) indented  ").unwrap();
        assert_eq!(interval.duration_minutes(), 30);
    }

    #[test]
    fn missing_end_time_is_meta_error() {
        let err = parse("- (a 9:00) missing end time").unwrap_err();
        assert_eq!(
            err,
            ParseError::Meta {
                line: "- (a 9:00) missing end time".to_string()
            }
        );
        assert_eq!(err.line(), "- (a 9:00) missing end time");
    }

    #[test]
    fn missing_closing_paren_is_shape_error() {
        let err = parse("- (V 1:23 - 4:56 Task description").unwrap_err();
        assert!(matches!(err, ParseError::Shape { .. }));
    }

    #[test]
    fn multi_letter_code_is_rejected() {
        let err = parse("- (Mm 11:23 - 14:56) Task description").unwrap_err();
        assert!(matches!(err, ParseError::Meta { .. }));
    }

    #[test]
    fn non_numeric_or_three_digit_times_are_rejected() {
        assert!(matches!(
            parse("- (V xx:23 - 4:56) Task").unwrap_err(),
            ParseError::Meta { .. }
        ));
        assert!(matches!(
            parse("- (V 123 - 4:56) Task").unwrap_err(),
            ParseError::Meta { .. }
        ));
        assert!(matches!(
            parse("- (V 1:23 - -4:56) Task").unwrap_err(),
            ParseError::Meta { .. }
        ));
    }

    #[test]
    fn out_of_range_clock_is_rejected() {
        let err = parse("- (a 24:00 - 25:00) late").unwrap_err();
        assert!(matches!(
            err,
            ParseError::ClockOutOfRange {
                source: ValidationError::ClockOutOfRange { hour: 24, minute: 0 },
                ..
            }
        ));

        assert!(parse("- (a 9:60 - 10:00) bad minute").is_err());
    }

    #[test]
    fn negative_duration_rejected_by_default() {
        let err = parse("- (V 14:56 - 11:23) Task description").unwrap_err();
        assert!(matches!(err, ParseError::EndBeforeStart { .. }));
    }

    #[test]
    fn negative_duration_wraps_when_configured() {
        let interval = parse_task_line(
            "- (a 23:30 - 0:15) late deploy",
            NegativeDurationPolicy::WrapMidnight,
        )
        .unwrap();
        assert_eq!(interval.duration_minutes(), 45);
    }

    #[test]
    fn negative_duration_kept_when_configured() {
        let interval = parse_task_line(
            "- (V 14:56 - 11:23) Task description",
            NegativeDurationPolicy::Keep,
        )
        .unwrap();
        assert_eq!(interval.duration_minutes(), -213);
    }

    #[test]
    fn zero_duration_is_valid() {
        let interval = parse("- (a 9:00 - 9:00) nothing").unwrap();
        assert_eq!(interval.duration_minutes(), 0);
    }

    #[test]
    fn is_task_line_filters() {
        assert!(is_task_line("- (a 9:00 - 10:00) x"));
        assert!(is_task_line("   - (Task 1) something"));
        assert!(is_task_line("\t- (Task 2) another"));
        assert!(!is_task_line(""));
        assert!(!is_task_line("   "));
        assert!(!is_task_line("# Monday"));
        assert!(!is_task_line("(test)"));
        assert!(!is_task_line("- plain bullet"));
    }

    #[test]
    fn non_task_lines_produce_nothing() {
        let outcome = parse_lines(
            ["# Timebook", "", "Some prose.", "- a bullet", "> - Planned A: 10h"],
            NegativeDurationPolicy::Reject,
        );
        assert!(outcome.intervals.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn malformed_line_does_not_affect_neighbours() {
        let outcome = parse_lines(
            [
                "- (a 09:00 - 10:00) x",
                "- (a 9:00) missing end time",
                "- (b 10:00 - 10:20) y",
            ],
            NegativeDurationPolicy::Reject,
        );

        let durations: Vec<i64> = outcome
            .intervals
            .iter()
            .map(TaskInterval::duration_minutes)
            .collect();
        assert_eq!(durations, vec![60, 20]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].line_number, 2);
        assert_eq!(outcome.errors[0].error.line(), "- (a 9:00) missing end time");
    }

    #[test]
    fn split_lines_handles_crlf_and_trailing_newline() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("hello world"), vec!["hello world"]);
        assert_eq!(split_lines("line1\r\nline2\r\n"), vec!["line1", "line2"]);
        assert_eq!(split_lines("line1\n\nline3\n"), vec!["line1", "", "line3"]);
        assert_eq!(split_lines("line1\r"), vec!["line1"]);
    }

    #[test]
    fn parse_documents_keeps_document_order() {
        let docs = [
            "- (a 9:00 - 10:00) one\n",
            "# nothing here\n",
            "- (b 9:00 - 9:10) two\r\n- (b 9:10 - 9:20) three\r\n",
        ];
        let outcomes = parse_documents(&docs, NegativeDurationPolicy::Reject);

        let counts: Vec<usize> = outcomes.iter().map(|o| o.intervals.len()).collect();
        assert_eq!(counts, vec![1, 0, 2]);
        assert_eq!(outcomes[2].intervals[1].duration_minutes(), 10);
    }
}
