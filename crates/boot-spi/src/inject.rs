//! Injection slots and the injection points that describe them.
//!
//! An extension keeps one [`Inject<T>`] field per dependency and lists the
//! matching [`InjectionPoint`]s from `ServiceExtension::injection_points`.
//! The injector resolves each point against the service context and writes
//! the value back through the point into the extension's field.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::provider::ServiceProvider;
use crate::service_type::{ServiceInstance, ServiceType};

/// Write side of an injection slot.
trait SlotTarget: Send + Sync {
    fn fill(&self, instance: &ServiceInstance) -> std::result::Result<(), String>;
}

struct Slot<T: ?Sized>(Arc<OnceLock<Arc<T>>>);

impl<T: ?Sized + Send + Sync + 'static> SlotTarget for Slot<T> {
    fn fill(&self, instance: &ServiceInstance) -> std::result::Result<(), String> {
        let service = instance
            .downcast::<T>()
            .ok_or_else(|| format!("instance has type [{}]", instance.service_type()))?;
        self.0
            .set(service)
            .map_err(|_| "slot was already injected".to_string())
    }
}

/// A dependency slot held by an extension.
///
/// Clones share the same slot, so a clone handed to a helper sees the value
/// once the injector has run.
pub struct Inject<T: ?Sized> {
    slot: Arc<OnceLock<Arc<T>>>,
    required: bool,
}

impl<T: ?Sized + Send + Sync + 'static> Inject<T> {
    /// A slot that must be resolved for boot to continue.
    pub fn required() -> Self {
        Self {
            slot: Arc::new(OnceLock::new()),
            required: true,
        }
    }

    /// A slot that stays empty when nothing provides `T`.
    pub fn optional() -> Self {
        Self {
            slot: Arc::new(OnceLock::new()),
            required: false,
        }
    }

    /// Injection point describing this slot. The owner is filled in when the
    /// extension is loaded into its container.
    pub fn point(&self) -> InjectionPoint {
        InjectionPoint {
            owner: String::new(),
            service_type: ServiceType::of::<T>(),
            required: self.required,
            default_provider: None,
            target: Some(Arc::new(Slot(Arc::clone(&self.slot)))),
        }
    }

    /// The injected service, if the slot has been filled.
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.get().cloned()
    }

    pub fn is_injected(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            required: self.required,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Inject<T> {
    fn default() -> Self {
        Self::required()
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("type", &std::any::type_name::<T>())
            .field("required", &self.required)
            .field("injected", &self.slot.get().is_some())
            .finish()
    }
}

/// One declared dependency of an extension.
#[derive(Clone)]
pub struct InjectionPoint {
    owner: String,
    service_type: ServiceType,
    required: bool,
    default_provider: Option<ServiceProvider>,
    target: Option<Arc<dyn SlotTarget>>,
}

impl InjectionPoint {
    /// A requirement without a slot: the extension needs `T` to exist (and
    /// to be booted first) but reads it from the context itself.
    pub fn requires<T: ?Sized + 'static>() -> Self {
        Self {
            owner: String::new(),
            service_type: ServiceType::of::<T>(),
            required: true,
            default_provider: None,
            target: None,
        }
    }

    /// Set the owning extension's name.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_provider(&self) -> Option<&ServiceProvider> {
        self.default_provider.as_ref()
    }

    pub fn set_default_provider(&mut self, provider: ServiceProvider) {
        self.default_provider = Some(provider);
    }

    /// Write the resolved service into the owner's slot.
    ///
    /// Points created with [`InjectionPoint::requires`] have no slot and
    /// accept any value of their type.
    pub fn set_target_value(&self, instance: &ServiceInstance) -> Result<()> {
        let Some(target) = &self.target else {
            return Ok(());
        };
        target.fill(instance).map_err(|reason| Error::SlotRejected {
            owner: self.owner.clone(),
            service_type: self.service_type,
            reason,
        })
    }
}

impl fmt::Debug for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("owner", &self.owner)
            .field("service_type", &self.service_type)
            .field("required", &self.required)
            .field("has_default", &self.default_provider.is_some())
            .finish()
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Service of type [{}] required by '{}'",
            self.service_type, self.owner
        )
    }
}
