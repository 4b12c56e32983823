//! Command implementations for boot-cli

pub mod plan;
pub mod run;

pub use plan::run_plan;
pub use run::run_boot;

use boot_system::{RuntimeBuilder, ServiceRegistry, parse_property};

use crate::builtin;
use crate::cli::Cli;
use crate::error::Result;

/// Runtime builder for the built-in extensions, configured from the
/// command line.
pub(crate) fn runtime_builder(cli: &Cli) -> Result<RuntimeBuilder<ServiceRegistry>> {
    let mut builder = RuntimeBuilder::new(builtin::registry(cli.config.as_deref()))
        .program_args(cli.program_args());
    for raw in &cli.properties {
        let (key, value) = parse_property(raw)?;
        builder = builder.property(key, value);
    }
    Ok(builder)
}
