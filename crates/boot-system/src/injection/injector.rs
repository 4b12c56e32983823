//! Resolves an extension's injection points and writes them into its slots.

use boot_spi::{ServiceExtensionContext, ServiceInstance};

use crate::error::{Error, Result};
use crate::injection::container::InjectionContainer;
use crate::injection::supplier::{DefaultServiceSupplier, InjectionPointDefaultServiceSupplier};

/// Resolves injection points from the context, falling back to a
/// [`DefaultServiceSupplier`].
#[derive(Debug, Clone, Default)]
pub struct Injector<S = InjectionPointDefaultServiceSupplier> {
    supplier: S,
}

impl Injector {
    /// Injector using the injection points' own default providers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: DefaultServiceSupplier> Injector<S> {
    pub fn with_supplier(supplier: S) -> Self {
        Self { supplier }
    }

    /// Resolve every injection point of `container` and fill its slots.
    ///
    /// All points are resolved before any slot is written, so an extension
    /// is either fully injected or not touched at all. Default services
    /// registered while resolving stay in the context.
    ///
    /// # Errors
    ///
    /// Returns `Error::Injection` when a required point cannot be resolved.
    pub fn inject(
        &self,
        container: &mut InjectionContainer,
        context: &mut ServiceExtensionContext,
    ) -> Result<()> {
        let mut resolved: Vec<(usize, ServiceInstance)> = Vec::new();

        for (index, point) in container.injection_points().iter().enumerate() {
            if let Some(instance) = context.instance(point.service_type()) {
                resolved.push((index, instance.clone()));
                continue;
            }

            match self.supplier.provide_for(point, context)? {
                Some(instance) => {
                    tracing::debug!(
                        extension = point.owner(),
                        service = point.service_type().name(),
                        "Resolved from default provider"
                    );
                    resolved.push((index, instance));
                }
                None if point.is_required() => {
                    return Err(Error::Injection {
                        extension: point.owner().to_string(),
                        service_type: point.service_type(),
                        reason: "default supplier produced no instance".to_string(),
                    });
                }
                None => {
                    tracing::debug!(
                        extension = point.owner(),
                        service = point.service_type().name(),
                        "Optional service not available, leaving slot empty"
                    );
                }
            }
        }

        let points = container.injection_points();
        for (index, instance) in resolved {
            let point = &points[index];
            point
                .set_target_value(&instance)
                .map_err(|err| Error::Injection {
                    extension: point.owner().to_string(),
                    service_type: point.service_type(),
                    reason: err.to_string(),
                })?;
        }

        Ok(())
    }
}
