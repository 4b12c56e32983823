//! Extension contracts discovered and driven by the boot system.

use std::sync::Arc;

use crate::config::Config;
use crate::context::ServiceExtensionContext;
use crate::error::BoxError;
use crate::inject::InjectionPoint;
use crate::monitor::Monitor;
use crate::provider::ProviderMethod;
use crate::service_type::ServiceType;

/// Result of an extension lifecycle hook.
pub type HookResult = std::result::Result<(), BoxError>;

/// A unit of functionality taking part in the boot lifecycle.
///
/// Hooks are called once each, in boot order, on a single thread:
/// `initialize` (interleaved with injection and providers), then
/// `prepare` for every extension, then `start` for every extension.
/// `shutdown` runs in reverse boot order when the runtime stops.
pub trait ServiceExtension: Send {
    /// Name used in progress messages and diagnostics. Must be unique
    /// within one boot.
    fn name(&self) -> &str;

    /// Declared dependency slots.
    fn injection_points(&self) -> Vec<InjectionPoint> {
        Vec::new()
    }

    /// Service types this extension registers itself during `initialize`.
    fn provides(&self) -> Vec<ServiceType> {
        Vec::new()
    }

    /// Services produced by explicit provider methods.
    fn provider_methods(&self) -> Vec<ProviderMethod> {
        Vec::new()
    }

    fn initialize(&mut self, _context: &mut ServiceExtensionContext) -> HookResult {
        Ok(())
    }

    fn prepare(&mut self) -> HookResult {
        Ok(())
    }

    fn start(&mut self) -> HookResult {
        Ok(())
    }

    fn shutdown(&mut self) -> HookResult {
        Ok(())
    }
}

/// Supplies a monitor implementation to the boot system.
pub trait MonitorExtension: Send {
    fn monitor(&self) -> Arc<dyn Monitor>;
}

/// Contributes a configuration layer before any service extension loads.
pub trait ConfigurationExtension: Send {
    fn name(&self) -> &str;

    fn initialize(&mut self, _monitor: &dyn Monitor) -> HookResult {
        Ok(())
    }

    /// The layer contributed, if any.
    fn config(&self) -> Option<Config>;
}
