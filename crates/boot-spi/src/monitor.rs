//! Monitor contract used by the boot system and extensions to report events.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Error cause attached to a monitor call.
pub type ErrorCause<'a> = &'a (dyn std::error::Error + 'static);

/// Monitor severity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Severe,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 4] = [Level::Severe, Level::Warning, Level::Info, Level::Debug];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Severe => "SEVERE",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// Level used when none is configured.
    pub fn default_level() -> Self {
        Self::Debug
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown monitor level '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SEVERE" => Ok(Self::Severe),
            "WARNING" => Ok(Self::Warning),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Sink for boot and extension events.
///
/// Implementations must tolerate being called from several threads once the
/// runtime has started.
pub trait Monitor: Send + Sync {
    fn severe(&self, message: &str, errors: &[ErrorCause<'_>]);

    fn warning(&self, message: &str, errors: &[ErrorCause<'_>]);

    fn info(&self, message: &str, errors: &[ErrorCause<'_>]);

    fn debug(&self, message: &str, errors: &[ErrorCause<'_>]);

    /// Lazily built severe message.
    fn severe_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        self.severe(&message(), errors);
    }

    fn warning_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        self.warning(&message(), errors);
    }

    fn info_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        self.info(&message(), errors);
    }

    fn debug_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        self.debug(&message(), errors);
    }

    /// Structured severe event. The default renders the payload as JSON.
    fn severe_data(&self, data: &BTreeMap<String, serde_json::Value>) {
        let rendered = serde_json::to_string(data).unwrap_or_else(|_| format!("{data:?}"));
        self.severe(&rendered, &[]);
    }
}
