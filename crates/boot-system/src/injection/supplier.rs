//! Fallback resolution for injection points the context cannot satisfy.

use boot_spi::{InjectionPoint, ServiceExtensionContext, ServiceInstance};

use crate::error::{Error, Result};

/// Produces a service for an injection point that found nothing in the
/// context. Returning `Ok(None)` leaves the slot empty.
pub trait DefaultServiceSupplier {
    fn provide_for(
        &self,
        point: &InjectionPoint,
        context: &mut ServiceExtensionContext,
    ) -> Result<Option<ServiceInstance>>;
}

/// Uses the default provider attached to the injection point, registering
/// its result in the context so later extensions share the same instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectionPointDefaultServiceSupplier;

impl DefaultServiceSupplier for InjectionPointDefaultServiceSupplier {
    fn provide_for(
        &self,
        point: &InjectionPoint,
        context: &mut ServiceExtensionContext,
    ) -> Result<Option<ServiceInstance>> {
        match point.default_provider() {
            Some(provider) => Ok(Some(provider.register(context)?)),
            None if point.is_required() => Err(Error::Injection {
                extension: point.owner().to_string(),
                service_type: point.service_type(),
                reason: "no service in context and no default provider".to_string(),
            }),
            None => Ok(None),
        }
    }
}
