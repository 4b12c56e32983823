//! Run command implementation

use colored::Colorize;

use crate::builtin::HealthCheckService;
use crate::cli::Cli;
use crate::commands::runtime_builder;
use crate::error::{CliError, Result};

/// Boot the built-in extensions, print their state and shut down again.
pub fn run_boot(cli: &Cli) -> Result<()> {
    let runtime = runtime_builder(cli)?.boot()?;

    println!(
        "{} {} extensions",
        "Booted".green().bold(),
        runtime.boot_order().len()
    );
    for (name, state) in runtime.extension_states() {
        println!("  {:<10} {}", name.cyan(), state);
    }

    if let Ok(health) = runtime.service::<HealthCheckService>() {
        println!();
        println!("{}: {}", "Health".dimmed(), health.report());
    }

    let failures = runtime.shutdown();
    if failures > 0 {
        return Err(CliError::user(format!(
            "{failures} extensions failed to shut down"
        )));
    }
    println!();
    println!("{}", "Shut down".green());
    Ok(())
}
