//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::chart::ChartArgs;
use crate::commands::check::CheckArgs;
use crate::commands::summary::SummaryArgs;

/// Timebook statistics.
///
/// Reads plain-text timebook logs (`- (A 9:00 - 10:30) description`) and
/// reports how the time was spent per task and per category.
#[derive(Debug, Parser)]
#[command(name = "tb", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print totals, distribution and task list.
    Summary(SummaryArgs),

    /// Print bar or pie chart geometry.
    Chart(ChartArgs),

    /// List task lines that could not be parsed.
    Check(CheckArgs),
}
