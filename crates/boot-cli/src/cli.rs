//! CLI argument parsing using clap derive

use std::path::PathBuf;

use boot_system::monitor::{LEVEL_ARG, NO_COLOR_ARG};
use clap::{Parser, Subcommand};

/// Extension boot system - discover, order and start service extensions
#[derive(Parser, Debug)]
#[command(name = "boot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Console monitor level: SEVERE, WARNING, INFO or DEBUG
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        global = true,
        require_equals = true,
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub log_level: Option<String>,

    /// Disable coloured output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH", global = true, env = "BOOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Configuration property overriding file and environment values
    #[arg(short = 'p', long = "property", value_name = "KEY=VALUE", global = true)]
    pub properties: Vec<String>,

    /// Log boot internals at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Boot the built-in extensions, report their state and shut down
    Run,

    /// Print the boot order without running any extension
    Plan {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Console arguments in the `--log-level=<LEVEL>` form the boot
    /// runtime reads.
    pub fn program_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(level) = &self.log_level {
            args.push(format!("{LEVEL_ARG}={level}"));
        }
        if self.no_color {
            args.push(NO_COLOR_ARG.to_string());
        }
        args
    }
}
