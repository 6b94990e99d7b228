//! Summary command: totals, distribution table and task list.
//!
//! This module implements `tb summary` with a per-task or per-category view
//! and two output formats (human-readable, JSON).

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tb_core::{GroupKind, Summary, SummaryEntry, summarize};

use crate::input::load_timebook;
use crate::{Config, View};

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Timebook files to read.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Group by task or by category (defaults to the configured view).
    #[arg(long, value_enum)]
    pub view: Option<View>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Loads `files` and builds the summary for `view`.
pub fn load_summary(files: &[PathBuf], view: View, config: &Config) -> Result<Summary> {
    let timebook =
        load_timebook(files, config.negative_durations).context("failed to load timebook")?;
    if !timebook.rejected.is_empty() {
        tracing::warn!(
            count = timebook.rejected.len(),
            "skipped malformed task lines; run `tb check` for details"
        );
    }

    let catalog = config.catalog().with_budgets(&timebook.budgets);
    let summary = summarize(&timebook.intervals, &catalog);
    Ok(match view {
        View::Tasks => summary,
        View::Categories => summary.by_category(),
    })
}

fn group_noun(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Task => "tasks",
        GroupKind::Category => "categories",
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(factor: f64) -> i64 {
    (factor * 100.0).round() as i64
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn ascii_bar(factor: f64, scale: usize) -> String {
    let blocks = (factor.max(0.0) * scale as f64).round() as usize;
    "█".repeat(blocks.min(scale))
}

#[allow(clippy::cast_precision_loss)]
fn budget_note(entry: &SummaryEntry) -> Option<String> {
    let expected = entry.expected_minutes?;
    let factor = entry.factor_of_expected?;
    Some(format!(
        "[{}% of {:.1}h budget]",
        percent(factor),
        expected as f64 / 60.0
    ))
}

/// Formats the human-readable report.
pub fn format_report(summary: &Summary, bar_scale: usize) -> String {
    let mut output = String::new();
    let noun = group_noun(summary.kind());
    let intervals: usize = summary.entries().map(|e| e.count_tasks).sum();

    writeln!(output, "# Summary of {noun}").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "## Totals").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "  - groups : {}", summary.len()).unwrap();
    writeln!(output, "  - tasks  : {intervals}").unwrap();
    writeln!(output, "  - hours  : {:.2}", summary.total_hours()).unwrap();
    writeln!(output, "  - minutes: {}", summary.total_minutes()).unwrap();

    if summary.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No task lines found.").unwrap();
        return output;
    }

    let ranked = summary.ranked();
    let width = ranked
        .iter()
        .map(|e| e.short_name.chars().count())
        .max()
        .unwrap_or(1);

    writeln!(output).unwrap();
    writeln!(output, "## Distribution of {noun}").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "```").unwrap();
    for entry in &ranked {
        let line = format!(
            "  {:<width$} {:>3}% | {}",
            entry.short_name,
            percent(entry.factor_of_total),
            ascii_bar(entry.factor_of_total, bar_scale)
        );
        writeln!(output, "{}", line.trim_end()).unwrap();
    }
    writeln!(output, "```").unwrap();

    writeln!(output).unwrap();
    writeln!(output, "## List of {noun}").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "```").unwrap();
    for entry in &ranked {
        let mut line = format!(
            "  {:<width$} {:>6.2}h ({:>4} minutes)",
            entry.short_name,
            entry.received_hours(),
            entry.received_minutes
        );
        if let Some(name) = &entry.display_name {
            write!(line, " {name}").unwrap();
        }
        if let Some(note) = budget_note(entry) {
            write!(line, " {note}").unwrap();
        }
        writeln!(output, "{line}").unwrap();
    }
    writeln!(output, "```").unwrap();

    output
}

// ========== JSON Output ==========

/// JSON summary structure. Entries are ranked, most time first.
#[derive(Debug, Serialize)]
pub struct JsonSummary<'a> {
    pub view: GroupKind,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub entries: Vec<&'a SummaryEntry>,
}

/// Formats a summary as JSON.
pub fn format_summary_json(summary: &Summary) -> Result<String> {
    let report = JsonSummary {
        view: summary.kind(),
        total_minutes: summary.total_minutes(),
        total_hours: summary.total_hours(),
        entries: summary.ranked(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the summary command.
pub fn run<W: Write>(writer: &mut W, args: &SummaryArgs, config: &Config) -> Result<()> {
    let view = args.view.unwrap_or(config.default_view);
    let summary = load_summary(&args.files, view, config)?;

    if args.json {
        writeln!(writer, "{}", format_summary_json(&summary)?)?;
    } else {
        write!(writer, "{}", format_report(&summary, config.bar_scale))?;
    }
    Ok(())
}
