//! Error types for boot-system
//!
//! Every variant is fatal to the boot sequence.

use std::fmt;
use std::path::PathBuf;

use boot_spi::{BoxError, ServiceType};

/// Result type for boot-system operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle hook an extension failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initialize,
    Prepare,
    Start,
    Shutdown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialize => write!(f, "initialize"),
            Self::Prepare => write!(f, "prepare"),
            Self::Start => write!(f, "start"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Errors that can occur while discovering, ordering and booting extensions
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A capability was required but nothing implements it
    #[error("no implementations found for [{capability}]")]
    NotFound { capability: ServiceType },

    /// A singleton capability has more than one implementation
    #[error("multiple implementations found for [{capability}]: [{}]", .implementations.join(", "))]
    MultipleFound {
        capability: ServiceType,
        implementations: Vec<String>,
    },

    /// Two discovered extensions share a name
    #[error("extension '{name}' was discovered more than once")]
    DuplicateExtension { name: String },

    /// A required dependency could not be resolved at injection time
    #[error("cannot inject [{service_type}] into '{extension}': {reason}")]
    Injection {
        extension: String,
        service_type: ServiceType,
        reason: String,
    },

    /// Required services that no extension, default provider or context
    /// registration can satisfy
    #[error("the following required services are not provided:\n{}", format_list(.points))]
    UnsatisfiableDependency { points: Vec<String> },

    /// Extensions that depend on each other
    #[error("cyclic dependency between extensions: [{}]", .participants.join(", "))]
    CyclicDependency { participants: Vec<String> },

    /// An extension hook returned an error
    #[error("extension '{extension}' failed to {phase}: {source}")]
    LifecycleHook {
        extension: String,
        phase: Phase,
        #[source]
        source: BoxError,
    },

    /// A configuration extension failed while loading
    #[error("configuration extension '{extension}' failed: {source}")]
    Configuration {
        extension: String,
        #[source]
        source: BoxError,
    },

    /// Malformed boot arguments, such as an unknown log level
    #[error("invalid boot argument: {message}")]
    InvalidArgument { message: String },

    /// A configuration file could not be parsed
    #[error("failed to parse configuration file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Context and provider errors from boot-spi, including provider
    /// invocation failures and writes to a frozen context
    #[error(transparent)]
    Spi(#[from] boot_spi::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
