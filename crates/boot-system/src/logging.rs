use boot_spi::{BoxError, Level};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(level: Level) -> &'static str {
    match level {
        Level::Severe => "error",
        Level::Warning => "warn",
        Level::Info => "info",
        Level::Debug => "debug",
    }
}

/// Initialize a tracing subscriber printing compact lines to stderr.
///
/// `RUST_LOG` takes precedence over `level`. ANSI colours are only used
/// when `color` is set.
pub fn init(level: Level, color: bool) -> Result<(), BoxError> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(level)))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
