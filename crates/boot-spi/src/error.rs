//! Error types for boot-spi

use crate::service_type::ServiceType;

/// Boxed error returned by extension hooks and provider factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for boot-spi operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the service context and its injection primitives
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A service was registered after the context was frozen
    #[error("cannot register [{service_type}]: the service context is frozen")]
    ContextFrozen { service_type: ServiceType },

    /// A service was looked up that nobody registered
    #[error("no service registered for [{service_type}]")]
    ServiceNotFound { service_type: ServiceType },

    /// A provider method failed to produce its service
    #[error("provider of [{service_type}] declared by '{extension}' failed: {source}")]
    ProviderInvocation {
        extension: String,
        service_type: ServiceType,
        #[source]
        source: BoxError,
    },

    /// An injection slot refused the resolved value
    #[error("cannot write [{service_type}] into a slot of '{owner}': {reason}")]
    SlotRejected {
        owner: String,
        service_type: ServiceType,
        reason: String,
    },
}
