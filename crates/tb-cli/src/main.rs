use std::io::stdout;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tb_cli::commands::{chart, check, summary};
use tb_cli::{Cli, Commands, Config};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so reports on stdout stay pipeable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut out = stdout().lock();
    match &cli.command {
        Some(Commands::Summary(args)) => summary::run(&mut out, args, &config)?,
        Some(Commands::Chart(args)) => chart::run(&mut out, args, &config)?,
        Some(Commands::Check(args)) => {
            if check::run(&mut out, args, &config)? > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(ExitCode::SUCCESS)
}
