//! Extension boot system.
//!
//! Discovers service extensions, orders them by their service
//! dependencies, injects what they require and drives them through the
//! initialize, provide, prepare and start phases.
//!
//! ```text
//! ServiceLocator ─▶ DependencyGraph ─▶ ExtensionLifecycleManager
//!                                        └─ Injector per extension
//! ```
//!
//! [`RuntimeBuilder`] wires everything together, including monitor
//! selection and configuration loading.

pub mod config;
pub mod dependency;
pub mod discovery;
pub mod error;
pub mod injection;
pub mod lifecycle;
pub mod loader;
pub mod logging;
pub mod monitor;
pub mod runtime;

pub use config::{ConfigurationLoader, TomlFileConfiguration, parse_property};
pub use dependency::DependencyGraph;
pub use discovery::{ServiceLocator, ServiceRegistry};
pub use error::{Error, Phase, Result};
pub use injection::{
    DefaultServiceSupplier, InjectionContainer, InjectionPointDefaultServiceSupplier, Injector,
};
pub use lifecycle::{ExtensionLifecycleManager, LifecycleState};
pub use loader::ExtensionLoader;
pub use monitor::{ConsoleMonitor, ConsoleSettings, MultiplexingMonitor};
pub use runtime::{PlannedExtension, Runtime, RuntimeBuilder};
