//! Extension boot CLI
//!
//! Boots the built-in extensions through the boot system, or prints the
//! order it would boot them in.

mod builtin;
mod cli;
mod commands;
mod error;

use boot_spi::Level;
use boot_system::{ConsoleSettings, logging};
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let program_args = cli.program_args();
    let settings = ConsoleSettings::from_args(program_args.as_slice())?;
    if !settings.color {
        colored::control::set_override(false);
    }

    let level = if cli.verbose { Level::Debug } else { settings.level };
    logging::init(level, settings.color)
        .map_err(|e| CliError::user(format!("failed to initialise logging: {e}")))?;
    tracing::debug!(command = ?cli.command, "Parsed command line");

    match &cli.command {
        Commands::Run => commands::run_boot(&cli),
        Commands::Plan { json } => commands::run_plan(&cli, *json),
    }
}
