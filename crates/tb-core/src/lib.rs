//! Core domain logic for timebook statistics.
//!
//! This crate contains the fundamental types and logic for:
//! - Parsing: turning `- (A 9:00 - 10:30) text` lines into task intervals
//! - Aggregation: per-task and per-category minutes and ratios
//! - Charts: bar and pie geometry for a summary
//!
//! Nothing here touches the filesystem; callers hand in text.

pub mod catalog;
pub mod chart;
mod interval;
pub mod parser;
mod summary;
pub mod types;

pub use catalog::{Catalog, Category, NoLookup, TaskInfo, TaskLookup, parse_budgets};
pub use interval::TaskInterval;
pub use parser::{
    LineError, NegativeDurationPolicy, ParseError, ParseOutcome, parse_documents, parse_lines,
    parse_task_line, split_lines,
};
pub use summary::{GroupKind, Summary, SummaryEntry, UNCATEGORIZED_KEY, summarize};
pub use types::{ClockTime, TaskCode, ValidationError};
