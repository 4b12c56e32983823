//! The shared service context passed through every boot phase.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::service_type::{ServiceInstance, ServiceType};

/// Registry of resolved services plus the monitor and configuration.
///
/// The context is mutable while extensions are injected, initialized and
/// provide their services. Once every extension has done so the lifecycle
/// manager freezes it, and all later registrations fail.
pub struct ServiceExtensionContext {
    services: HashMap<ServiceType, ServiceInstance>,
    monitor: Arc<dyn Monitor>,
    config: Config,
    frozen: bool,
}

impl fmt::Debug for ServiceExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceExtensionContext")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}

impl ServiceExtensionContext {
    /// Create a context with the monitor and configuration registered as
    /// the first two services.
    pub fn new(monitor: Arc<dyn Monitor>, config: Config) -> Self {
        let mut services = HashMap::new();
        let monitor_instance = ServiceInstance::new(Arc::clone(&monitor));
        services.insert(monitor_instance.service_type(), monitor_instance);
        let config_instance = ServiceInstance::new(Arc::new(config.clone()));
        services.insert(config_instance.service_type(), config_instance);
        Self {
            services,
            monitor,
            config,
            frozen: false,
        }
    }

    pub fn monitor(&self) -> &Arc<dyn Monitor> {
        &self.monitor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Configuration value for `key`, or `default` when unset.
    pub fn setting(&self, key: &str, default: &str) -> String {
        self.config.get_or(key, default)
    }

    pub fn has_service(&self, service_type: ServiceType) -> bool {
        self.services.contains_key(&service_type)
    }

    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        self.has_service(ServiceType::of::<T>())
    }

    /// Registered instance for a service type.
    pub fn instance(&self, service_type: ServiceType) -> Option<&ServiceInstance> {
        self.services.get(&service_type)
    }

    /// The service registered for `T`.
    pub fn service<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.try_service::<T>().ok_or(Error::ServiceNotFound {
            service_type: ServiceType::of::<T>(),
        })
    }

    pub fn try_service<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.instance(ServiceType::of::<T>())
            .and_then(|instance| instance.downcast::<T>())
    }

    /// Register `service` under the service type of `T`, replacing any
    /// earlier registration.
    pub fn register_service<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        service: Arc<T>,
    ) -> Result<()> {
        self.register_instance(ServiceInstance::new(service))
    }

    /// Register a type-erased instance under its own service type.
    pub fn register_instance(&mut self, instance: ServiceInstance) -> Result<()> {
        let service_type = instance.service_type();
        if self.frozen {
            return Err(Error::ContextFrozen { service_type });
        }
        self.services.insert(service_type, instance);
        Ok(())
    }

    /// Reject every registration from now on. Freezing is permanent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Registered service types, in no particular order.
    pub fn service_types(&self) -> impl Iterator<Item = ServiceType> + '_ {
        self.services.keys().copied()
    }
}
