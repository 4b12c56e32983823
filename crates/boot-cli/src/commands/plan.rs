//! Plan command implementation

use colored::Colorize;
use serde_json::json;

use crate::cli::Cli;
use crate::commands::runtime_builder;
use crate::error::Result;

/// Print the boot order of the built-in extensions.
pub fn run_plan(cli: &Cli, as_json: bool) -> Result<()> {
    let plan = runtime_builder(cli)?.plan()?;

    if as_json {
        let entries: Vec<_> = plan
            .iter()
            .map(|entry| json!({ "name": entry.name, "depends_on": entry.depends_on }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "Boot order".bold());
    for (position, entry) in plan.iter().enumerate() {
        if entry.depends_on.is_empty() {
            println!("  {}. {}", position + 1, entry.name.cyan());
        } else {
            println!(
                "  {}. {} {}",
                position + 1,
                entry.name.cyan(),
                format!("(after {})", entry.depends_on.join(", ")).dimmed()
            );
        }
    }
    Ok(())
}
