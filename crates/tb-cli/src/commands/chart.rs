//! Chart command: bar and pie geometry as a console table.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tb_core::chart::{Bar, Slice, bars, pie};

use super::summary::load_summary;
use crate::{Config, View};

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Timebook files to read.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Group by task or by category (defaults to the configured view).
    #[arg(long, value_enum)]
    pub view: Option<View>,

    /// Draw pie slices instead of bars.
    #[arg(long)]
    pub pie: bool,

    /// Output the geometry as JSON.
    #[arg(long)]
    pub json: bool,
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

fn hsl(hue: u32) -> String {
    format!("hsl({hue}, 70%, 30%)")
}

/// Formats bars as rows of `label  bar  share (hours) colour`.
pub fn format_bars(bars: &[Bar], bar_scale: usize) -> String {
    let mut output = String::new();
    let width = label_width(bars.iter().map(|b| b.label.as_str()));

    for bar in bars {
        let blocks = (bar.width_percent as usize * bar_scale + 50) / 100;
        writeln!(
            output,
            "{:<width$}  {:<bar_scale$}  {:>3.0}% ({:.1} hours)  {}",
            bar.label,
            "█".repeat(blocks),
            bar.percent_of_total,
            bar.hours,
            hsl(bar.hue)
        )
        .unwrap();
    }
    output
}

/// Formats pie slices as rows of `label  start  angle  colour`.
pub fn format_slices(slices: &[Slice]) -> String {
    let mut output = String::new();
    let width = label_width(slices.iter().map(|s| s.label.as_str()));

    for slice in slices {
        writeln!(
            output,
            "{:<width$}  from {:>5.1}°  span {:>5.1}°  {}",
            slice.label,
            slice.start_degrees,
            slice.angle_degrees,
            hsl(slice.hue)
        )
        .unwrap();
    }
    output
}

/// Runs the chart command.
pub fn run<W: Write>(writer: &mut W, args: &ChartArgs, config: &Config) -> Result<()> {
    let view = args.view.unwrap_or(config.default_view);
    let summary = load_summary(&args.files, view, config)?;

    if summary.is_empty() {
        writeln!(writer, "No task lines found.")?;
        return Ok(());
    }

    let output = match (args.pie, args.json) {
        (false, false) => format_bars(&bars(&summary), config.bar_scale),
        (true, false) => format_slices(&pie(&summary)),
        (false, true) => serde_json::to_string_pretty(&bars(&summary))? + "\n",
        (true, true) => serde_json::to_string_pretty(&pie(&summary))? + "\n",
    };
    write!(writer, "{output}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tb_core::{NegativeDurationPolicy, NoLookup, Summary, parse_lines, summarize};

    fn summary() -> Summary {
        let outcome = parse_lines(
            [
                "- (a 09:00 - 10:00) x",
                "- (b 10:00 - 10:30) y",
                "- (c 10:30 - 11:00) z",
            ],
            NegativeDurationPolicy::Reject,
        );
        summarize(&outcome.intervals, &NoLookup)
    }

    #[test]
    fn test_format_bars() {
        let output = format_bars(&bars(&summary()), 10);
        assert_snapshot!(output, @r"
A  ██████████   50% (1.0 hours)  hsl(0, 70%, 30%)
B  █████        25% (0.5 hours)  hsl(60, 70%, 30%)
C  █████        25% (0.5 hours)  hsl(60, 70%, 30%)
");
    }

    #[test]
    fn test_format_slices() {
        let output = format_slices(&pie(&summary()));
        assert_snapshot!(output, @r"
A  from   0.0°  span 180.0°  hsl(0, 70%, 30%)
B  from 180.0°  span  90.0°  hsl(40, 70%, 30%)
C  from 270.0°  span  90.0°  hsl(80, 70%, 30%)
");
    }

    #[test]
    fn test_run_json_bars() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("day.md");
        std::fs::write(&path, "- (a 9:00 - 10:00) x\n- (m 10:00 - 10:30) y\n").unwrap();

        let args = ChartArgs {
            files: vec![path],
            view: Some(View::Tasks),
            pie: false,
            json: true,
        };
        let mut output = Vec::new();
        run(&mut output, &args, &Config::default()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value[0]["label"], "Planned work");
        assert_eq!(value[0]["width_percent"], 100);
        assert_eq!(value[1]["label"], "Meetings");
        assert_eq!(value[1]["width_percent"], 50);
        assert_eq!(value[1]["hue"], 60);
    }
}
