//! Check command: report task lines the parser rejected.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::Config;
use crate::input::load_timebook;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Timebook files to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Runs the check command and returns the number of rejected lines.
pub fn run<W: Write>(writer: &mut W, args: &CheckArgs, config: &Config) -> Result<usize> {
    let timebook = load_timebook(&args.files, config.negative_durations)
        .context("failed to load timebook")?;

    for rejected in &timebook.rejected {
        writeln!(
            writer,
            "{}:{}: {}",
            rejected.path.display(),
            rejected.line.line_number,
            rejected.line.error
        )?;
    }

    let count = timebook.rejected.len();
    if count == 0 {
        writeln!(
            writer,
            "All {} task lines parsed.",
            timebook.intervals.len()
        )?;
    } else {
        writeln!(
            writer,
            "{count} of {} task lines rejected.",
            count + timebook.intervals.len()
        )?;
    }
    Ok(count)
}
