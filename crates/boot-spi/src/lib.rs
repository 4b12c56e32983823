//! Extension contracts for the extension boot system.
//!
//! Extensions implement [`ServiceExtension`], declare their dependencies as
//! [`Inject`] slots and the services they offer as [`ProviderMethod`]s, and
//! exchange services through the [`ServiceExtensionContext`]. The
//! `boot-system` crate discovers, orders and drives them.

pub mod config;
pub mod context;
pub mod error;
pub mod extension;
pub mod inject;
pub mod monitor;
pub mod provider;
pub mod service_type;

pub use config::{Config, env_key_to_config_key};
pub use context::ServiceExtensionContext;
pub use error::{BoxError, Error, Result};
pub use extension::{ConfigurationExtension, HookResult, MonitorExtension, ServiceExtension};
pub use inject::{Inject, InjectionPoint};
pub use monitor::{ErrorCause, Level, Monitor, ParseLevelError};
pub use provider::{ProviderMethod, ServiceProvider};
pub use service_type::{ServiceInstance, ServiceType};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::monitor::{ErrorCause, Monitor};

    /// Monitor that drops every event.
    pub struct SilentMonitor;

    impl Monitor for SilentMonitor {
        fn severe(&self, _message: &str, _errors: &[ErrorCause<'_>]) {}
        fn warning(&self, _message: &str, _errors: &[ErrorCause<'_>]) {}
        fn info(&self, _message: &str, _errors: &[ErrorCause<'_>]) {}
        fn debug(&self, _message: &str, _errors: &[ErrorCause<'_>]) {}
    }
}
