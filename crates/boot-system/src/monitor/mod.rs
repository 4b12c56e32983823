//! Monitor selection and the built-in monitors.
//!
//! With no monitor extension discovered the boot system reports to a
//! [`ConsoleMonitor`] configured from the program arguments. One extension
//! supplies the monitor directly; several are combined behind a
//! [`MultiplexingMonitor`].

pub mod console;
pub mod multiplexing;

pub use console::ConsoleMonitor;
pub use multiplexing::MultiplexingMonitor;

use std::sync::Arc;

use boot_spi::{Level, Monitor, MonitorExtension};

use crate::error::{Error, Result};

/// Program argument selecting the console level, as `--log-level=<LEVEL>`.
pub const LEVEL_ARG: &str = "--log-level";

/// Program argument disabling ANSI colours on the console.
pub const NO_COLOR_ARG: &str = "--no-color";

/// Console settings read from the program arguments.
///
/// [`ConsoleMonitor`] only uses `level`. Its events are rendered by the
/// `tracing` subscriber, so `color` is applied where the subscriber is
/// installed, through [`crate::logging::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub level: Level,
    pub color: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            level: Level::default_level(),
            color: true,
        }
    }
}

impl ConsoleSettings {
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for a malformed `--log-level`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        Ok(Self {
            level: parse_log_level(args)?,
            color: !args.iter().any(|arg| arg.as_ref() == NO_COLOR_ARG),
        })
    }
}

/// Find the console level in `args`.
///
/// Only the first argument starting with `--log-level` is considered. It
/// must have the form `--log-level=<LEVEL>`; level names are matched
/// case-insensitively. Without such an argument the default level applies.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` when the value is missing or unknown.
pub fn parse_log_level<S: AsRef<str>>(args: &[S]) -> Result<Level> {
    let Some(arg) = args
        .iter()
        .map(AsRef::as_ref)
        .find(|arg| arg.starts_with(LEVEL_ARG))
    else {
        return Ok(Level::default_level());
    };

    let valid = format!(
        "Valid values for the console level are [{}]",
        Level::ALL.map(Level::as_str).join(", ")
    );

    let parts: Vec<&str> = arg.split('=').collect();
    let [_, value] = parts.as_slice() else {
        return Err(Error::InvalidArgument {
            message: format!("Value missing for the {LEVEL_ARG} argument. {valid}"),
        });
    };
    if value.is_empty() {
        return Err(Error::InvalidArgument {
            message: format!("Value missing for the {LEVEL_ARG} argument. {valid}"),
        });
    }

    value.parse::<Level>().map_err(|_| Error::InvalidArgument {
        message: format!("Invalid value \"{value}\" for the {LEVEL_ARG} argument. {valid}"),
    })
}

/// Pick the boot monitor from the discovered monitor extensions.
///
/// The console fallback is built at the level from `args`. Colour output
/// is left to the subscriber, see [`ConsoleSettings`].
///
/// # Errors
///
/// Returns `Error::InvalidArgument` when no extension is present and the
/// console settings in `args` are malformed.
pub fn load_monitor<S: AsRef<str>>(
    extensions: Vec<Box<dyn MonitorExtension>>,
    args: &[S],
) -> Result<Arc<dyn Monitor>> {
    match extensions.len() {
        0 => {
            let settings = ConsoleSettings::from_args(args)?;
            Ok(Arc::new(ConsoleMonitor::new(settings.level)))
        }
        1 => Ok(extensions[0].monitor()),
        count => {
            tracing::debug!(count, "Multiplexing monitor extensions");
            Ok(Arc::new(MultiplexingMonitor::new(
                extensions.iter().map(|extension| extension.monitor()).collect(),
            )))
        }
    }
}
