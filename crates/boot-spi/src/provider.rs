//! Provider methods: explicit descriptors for services an extension produces.

use std::fmt;
use std::sync::Arc;

use crate::context::ServiceExtensionContext;
use crate::error::{BoxError, Error, Result};
use crate::service_type::{ServiceInstance, ServiceType};

type Factory = dyn Fn(&ServiceExtensionContext) -> std::result::Result<ServiceInstance, BoxError>
    + Send
    + Sync;

/// A service an extension can produce and register into the context.
///
/// Non-default providers run during the provide phase, right after the
/// owning extension's `initialize`. Default providers only run when an
/// injection point finds nothing in the context.
#[derive(Clone)]
pub struct ProviderMethod {
    produced: ServiceType,
    is_default: bool,
    factory: Arc<Factory>,
}

impl ProviderMethod {
    /// A provider run unconditionally during the provide phase.
    pub fn new<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceExtensionContext) -> std::result::Result<Arc<T>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self::build(factory, false)
    }

    /// A fallback provider, used only when no other extension provides `T`.
    pub fn default_for<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceExtensionContext) -> std::result::Result<Arc<T>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self::build(factory, true)
    }

    fn build<T, F>(factory: F, is_default: bool) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceExtensionContext) -> std::result::Result<Arc<T>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            produced: ServiceType::of::<T>(),
            is_default,
            factory: Arc::new(move |context| factory(context).map(ServiceInstance::new)),
        }
    }

    pub fn produced_type(&self) -> ServiceType {
        self.produced
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Run the factory without registering the result.
    pub fn invoke(
        &self,
        context: &ServiceExtensionContext,
    ) -> std::result::Result<ServiceInstance, BoxError> {
        (self.factory)(context)
    }
}

impl fmt::Debug for ProviderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderMethod")
            .field("produced", &self.produced)
            .field("is_default", &self.is_default)
            .finish_non_exhaustive()
    }
}

/// A provider method bound to the extension that declared it.
#[derive(Debug, Clone)]
pub struct ServiceProvider {
    extension: String,
    method: ProviderMethod,
}

impl ServiceProvider {
    pub fn new(extension: impl Into<String>, method: ProviderMethod) -> Self {
        Self {
            extension: extension.into(),
            method,
        }
    }

    /// Name of the extension that declared the provider.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn method(&self) -> &ProviderMethod {
        &self.method
    }

    pub fn produced_type(&self) -> ServiceType {
        self.method.produced_type()
    }

    /// Invoke the provider and register its service under the produced type.
    pub fn register(&self, context: &mut ServiceExtensionContext) -> Result<ServiceInstance> {
        let instance =
            self.method
                .invoke(context)
                .map_err(|source| Error::ProviderInvocation {
                    extension: self.extension.clone(),
                    service_type: self.produced_type(),
                    source,
                })?;
        context.register_instance(instance.clone())?;
        Ok(instance)
    }
}
