//! Service type identifiers and type-erased service instances.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifier of a capability an extension can require or provide.
///
/// Two service types are equal when they were created from the same Rust
/// type, usually a trait object such as `dyn Clock`. The type name is kept
/// only for diagnostics.
#[derive(Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    /// Service type of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Fully qualified type name, used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceType").field(&self.name).finish()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A registered service, stored as an `Arc<T>` behind `Any`.
#[derive(Clone)]
pub struct ServiceInstance {
    service_type: ServiceType,
    value: Arc<dyn Any + Send + Sync>,
}

impl ServiceInstance {
    /// Wrap a shared service under the service type of `T`.
    pub fn new<T: ?Sized + Send + Sync + 'static>(service: Arc<T>) -> Self {
        Self {
            service_type: ServiceType::of::<T>(),
            value: Arc::new(service),
        }
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Recover the shared service. Returns `None` when `T` is not the type
    /// this instance was created with.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceInstance")
            .field("service_type", &self.service_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    trait Vault: Send + Sync {}

    #[test]
    fn test_equality_is_by_type_identity() {
        assert_eq!(ServiceType::of::<dyn Clock>(), ServiceType::of::<dyn Clock>());
        assert_ne!(ServiceType::of::<dyn Clock>(), ServiceType::of::<dyn Vault>());
        assert_ne!(ServiceType::of::<dyn Clock>(), ServiceType::of::<FixedClock>());
    }

    #[test]
    fn test_display_uses_type_name() {
        let rendered = ServiceType::of::<dyn Clock>().to_string();
        assert!(rendered.contains("Clock"), "got: {rendered}");
    }

    #[test]
    fn test_instance_round_trips_trait_objects() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(42));
        let instance = ServiceInstance::new(clock);

        assert_eq!(instance.service_type(), ServiceType::of::<dyn Clock>());
        let recovered = instance.downcast::<dyn Clock>().unwrap();
        assert_eq!(recovered.now(), 42);
    }

    #[test]
    fn test_downcast_to_wrong_type_is_none() {
        let instance = ServiceInstance::new(Arc::new(FixedClock(1)));
        assert!(instance.downcast::<dyn Clock>().is_none());
        assert!(instance.downcast::<FixedClock>().is_some());
    }
}
