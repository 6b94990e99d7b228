//! CLI subcommand implementations.

pub mod chart;
pub mod check;
pub mod summary;
