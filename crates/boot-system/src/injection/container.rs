//! One extension together with its injection points and service providers.

use std::fmt;

use boot_spi::{InjectionPoint, ServiceExtension, ServiceProvider, ServiceType};

/// An extension prepared for boot.
///
/// Injection points carry the extension's name as owner. Providers are the
/// extension's non-default provider methods; default providers are attached
/// to other extensions' injection points by the dependency graph instead.
pub struct InjectionContainer {
    target: Box<dyn ServiceExtension>,
    injection_points: Vec<InjectionPoint>,
    service_providers: Vec<ServiceProvider>,
    default_providers: Vec<ServiceProvider>,
    provided_types: Vec<ServiceType>,
}

impl InjectionContainer {
    /// Collect the declarations of `target`.
    pub fn new(target: Box<dyn ServiceExtension>) -> Self {
        let name = target.name().to_string();
        let injection_points = target
            .injection_points()
            .into_iter()
            .map(|point| point.with_owner(name.clone()))
            .collect();

        let (default_providers, service_providers): (Vec<_>, Vec<_>) = target
            .provider_methods()
            .into_iter()
            .map(|method| ServiceProvider::new(name.clone(), method))
            .partition(|provider| provider.method().is_default());

        let mut provided_types = target.provides();
        for provider in &service_providers {
            if !provided_types.contains(&provider.produced_type()) {
                provided_types.push(provider.produced_type());
            }
        }

        Self {
            target,
            injection_points,
            service_providers,
            default_providers,
            provided_types,
        }
    }

    pub fn name(&self) -> &str {
        self.target.name()
    }

    pub fn target_mut(&mut self) -> &mut dyn ServiceExtension {
        self.target.as_mut()
    }

    pub fn injection_points(&self) -> &[InjectionPoint] {
        &self.injection_points
    }

    pub fn injection_points_mut(&mut self) -> &mut [InjectionPoint] {
        &mut self.injection_points
    }

    /// Providers run during the provide phase.
    pub fn service_providers(&self) -> &[ServiceProvider] {
        &self.service_providers
    }

    /// Fallback providers declared by this extension.
    pub fn default_providers(&self) -> &[ServiceProvider] {
        &self.default_providers
    }

    /// Types this extension makes available: its declared `provides` plus
    /// the output of its non-default providers.
    pub fn provided_types(&self) -> &[ServiceType] {
        &self.provided_types
    }

    /// Types required by the extension's injection points.
    pub fn required_types(&self) -> impl Iterator<Item = ServiceType> + '_ {
        self.injection_points
            .iter()
            .filter(|point| point.is_required())
            .map(InjectionPoint::service_type)
    }
}

impl fmt::Debug for InjectionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionContainer")
            .field("target", &self.name())
            .field("injection_points", &self.injection_points)
            .field("provided_types", &self.provided_types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boot_spi::{Inject, ProviderMethod};
    use std::sync::Arc;

    struct Clock;
    struct Vault;

    struct Sample {
        clock: Inject<Clock>,
        vault: Inject<Vault>,
    }

    impl ServiceExtension for Sample {
        fn name(&self) -> &str {
            "sample"
        }

        fn injection_points(&self) -> Vec<InjectionPoint> {
            vec![self.clock.point(), self.vault.point()]
        }

        fn provider_methods(&self) -> Vec<ProviderMethod> {
            vec![
                ProviderMethod::new(|_| Ok(Arc::new(Clock))),
                ProviderMethod::default_for(|_| Ok(Arc::new(Vault))),
            ]
        }
    }

    fn sample() -> InjectionContainer {
        InjectionContainer::new(Box::new(Sample {
            clock: Inject::required(),
            vault: Inject::optional(),
        }))
    }

    #[test]
    fn test_points_are_owned_by_extension() {
        let container = sample();
        assert_eq!(container.injection_points().len(), 2);
        assert!(container.injection_points().iter().all(|p| p.owner() == "sample"));
    }

    #[test]
    fn test_providers_split_by_default_flag() {
        let container = sample();
        assert_eq!(container.service_providers().len(), 1);
        assert_eq!(container.default_providers().len(), 1);
        assert_eq!(container.provided_types(), &[ServiceType::of::<Clock>()]);
    }

    #[test]
    fn test_required_types_skip_optional_points() {
        let container = sample();
        let required: Vec<ServiceType> = container.required_types().collect();
        assert_eq!(required, vec![ServiceType::of::<Clock>()]);
    }
}
