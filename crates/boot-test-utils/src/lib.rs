//! Shared test fixtures for the extension boot workspace.
//!
//! Dev-dependency only, never published. Depends on `boot-spi` alone so
//! that `boot-system` can use it from its own unit tests.
//!
//! # Modules
//!
//! - [`events`] - [`EventLog`] shared between extensions and assertions
//! - [`monitor`] - [`RecordingMonitor`] capturing every monitor call
//! - [`extension`] - [`TestExtension`] builder and the fixture services
//! - [`config`] - [`TempConfigFile`] for configuration file tests

pub mod config;
pub mod events;
pub mod extension;
pub mod monitor;

pub use config::TempConfigFile;
pub use events::EventLog;
pub use extension::{Hook, ServiceX, ServiceY, ServiceZ, TestExtension};
pub use monitor::{Record, RecordingMonitor};

use std::sync::Arc;

use boot_spi::{Config, ServiceExtensionContext};

/// A fresh context reporting to a new [`RecordingMonitor`].
pub fn test_context() -> (ServiceExtensionContext, RecordingMonitor) {
    let monitor = RecordingMonitor::new();
    let context = ServiceExtensionContext::new(Arc::new(monitor.clone()), Config::new());
    (context, monitor)
}
