//! Broadcast to several monitors.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use boot_spi::{ErrorCause, Monitor};

/// Forwards every call to each monitor in registration order.
///
/// A monitor that panics does not stop the broadcast: the panic is caught,
/// logged through `tracing` and the remaining monitors still receive the
/// call.
#[derive(Clone)]
pub struct MultiplexingMonitor {
    monitors: Vec<Arc<dyn Monitor>>,
}

impl MultiplexingMonitor {
    pub fn new(monitors: Vec<Arc<dyn Monitor>>) -> Self {
        Self { monitors }
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    fn broadcast(&self, call: impl Fn(&dyn Monitor)) {
        for (index, monitor) in self.monitors.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(monitor.as_ref())));
            if outcome.is_err() {
                tracing::warn!(index, "Monitor panicked, continuing broadcast");
            }
        }
    }
}

impl std::fmt::Debug for MultiplexingMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiplexingMonitor")
            .field("monitors", &self.monitors.len())
            .finish()
    }
}

impl Monitor for MultiplexingMonitor {
    fn severe(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.broadcast(|m| m.severe(message, errors));
    }

    fn warning(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.broadcast(|m| m.warning(message, errors));
    }

    fn info(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.broadcast(|m| m.info(message, errors));
    }

    fn debug(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.broadcast(|m| m.debug(message, errors));
    }

    fn severe_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        self.broadcast(|m| m.severe_with(message, errors));
    }

    fn warning_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        self.broadcast(|m| m.warning_with(message, errors));
    }

    fn info_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        self.broadcast(|m| m.info_with(message, errors));
    }

    fn debug_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        self.broadcast(|m| m.debug_with(message, errors));
    }

    fn severe_data(&self, data: &BTreeMap<String, serde_json::Value>) {
        self.broadcast(|m| m.severe_data(data));
    }
}
