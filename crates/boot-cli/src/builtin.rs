//! Extensions shipped with the `boot` binary.
//!
//! They form a small graph: `health` provides [`HealthCheckService`] and
//! needs a [`Clock`], which only exists as a default provider declared by
//! `clock`; `status` requires the health service and reports it on start.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use boot_spi::{
    ConfigurationExtension, HookResult, Inject, InjectionPoint, Monitor, ProviderMethod,
    ServiceExtension, ServiceExtensionContext,
};
use boot_system::{ServiceRegistry, TomlFileConfiguration};

/// Hostname reported when `edc.hostname` is not configured.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u128;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default()
    }
}

/// Declares the fallback [`Clock`].
#[derive(Debug, Default)]
pub struct ClockExtension;

impl ServiceExtension for ClockExtension {
    fn name(&self) -> &str {
        "clock"
    }

    fn provider_methods(&self) -> Vec<ProviderMethod> {
        vec![ProviderMethod::default_for::<dyn Clock, _>(|_| {
            Ok(Arc::new(SystemClock))
        })]
    }
}

/// Health summary of the running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckService {
    hostname: String,
    booted_at: u128,
}

impl HealthCheckService {
    pub fn report(&self) -> String {
        format!("{} is healthy (booted at {} ms)", self.hostname, self.booted_at)
    }
}

/// Provides [`HealthCheckService`] for the configured host.
#[derive(Debug, Default)]
pub struct HealthExtension {
    clock: Inject<dyn Clock>,
}

impl ServiceExtension for HealthExtension {
    fn name(&self) -> &str {
        "health"
    }

    fn injection_points(&self) -> Vec<InjectionPoint> {
        vec![self.clock.point()]
    }

    fn provider_methods(&self) -> Vec<ProviderMethod> {
        let clock = self.clock.clone();
        vec![ProviderMethod::new(move |context| {
            let booted_at = clock.get().map_or(0, |clock| clock.now_millis());
            Ok(Arc::new(HealthCheckService {
                hostname: context.setting("edc.hostname", DEFAULT_HOSTNAME),
                booted_at,
            }))
        })]
    }

    fn initialize(&mut self, context: &mut ServiceExtensionContext) -> HookResult {
        let hostname = context.setting("edc.hostname", DEFAULT_HOSTNAME);
        context
            .monitor()
            .debug(&format!("Health checks report host {hostname}"), &[]);
        Ok(())
    }
}

/// Reports health once everything has started.
#[derive(Default)]
pub struct StatusExtension {
    health: Inject<HealthCheckService>,
    monitor: Option<Arc<dyn Monitor>>,
}

impl ServiceExtension for StatusExtension {
    fn name(&self) -> &str {
        "status"
    }

    fn injection_points(&self) -> Vec<InjectionPoint> {
        vec![self.health.point()]
    }

    fn initialize(&mut self, context: &mut ServiceExtensionContext) -> HookResult {
        self.monitor = Some(Arc::clone(context.monitor()));
        Ok(())
    }

    fn start(&mut self) -> HookResult {
        let health = self.health.get().ok_or("health service was not injected")?;
        if let Some(monitor) = &self.monitor {
            monitor.info(&health.report(), &[]);
        }
        Ok(())
    }
}

/// Registry holding the built-in extensions and, when given, a TOML
/// configuration file.
pub fn registry(config: Option<&Path>) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry
        .register::<dyn ServiceExtension>("status", || Box::new(StatusExtension::default()))
        .register::<dyn ServiceExtension>("health", || Box::new(HealthExtension::default()))
        .register::<dyn ServiceExtension>("clock", || Box::new(ClockExtension));

    if let Some(path) = config {
        let path = path.to_path_buf();
        registry.register::<dyn ConfigurationExtension>("toml-file", move || {
            Box::new(TomlFileConfiguration::new(path.clone()))
        });
    }
    registry
}
