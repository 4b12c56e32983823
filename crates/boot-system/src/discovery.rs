//! Service discovery: a static registry of implementations per capability.
//!
//! Implementations are registered under a capability (usually a trait
//! object such as `dyn ServiceExtension`) with a stable id and a factory.
//! Discovery instantiates them in registration order. Callers must not
//! rely on that order for anything but tie-breaking.
//!
//! # Example
//!
//! ```
//! use boot_system::discovery::{ServiceLocator, ServiceRegistry};
//!
//! trait Greeter: Send {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let mut registry = ServiceRegistry::new();
//! registry.register::<dyn Greeter>("english", || Box::new(English));
//!
//! let greeters = registry.load_implementors::<dyn Greeter>(true).unwrap();
//! assert_eq!(greeters[0].greet(), "hello");
//! ```

use std::any::Any;
use std::collections::HashMap;

use boot_spi::ServiceType;

use crate::error::{Error, Result};

type Factory<T> = Box<dyn Fn() -> Box<T> + Send + Sync>;

struct Registration {
    id: String,
    /// Holds a `Factory<T>` for the capability it is filed under.
    factory: Box<dyn Any + Send + Sync>,
}

/// Pluggable discovery mechanism.
pub trait ServiceLocator {
    /// Instantiate every implementation of `T`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when `required` is set and nothing is
    /// registered.
    fn load_implementors<T: ?Sized + 'static>(&self, required: bool) -> Result<Vec<Box<T>>>;

    /// Instantiate the single implementation of `T`, if any.
    ///
    /// # Errors
    ///
    /// Returns `Error::MultipleFound` when more than one implementation is
    /// registered, and `Error::NotFound` when `required` is set and none is.
    fn load_singleton_implementor<T: ?Sized + 'static>(
        &self,
        required: bool,
    ) -> Result<Option<Box<T>>>;
}

/// In-process registry of implementation factories.
#[derive(Default)]
pub struct ServiceRegistry {
    entries: HashMap<ServiceType, Vec<Registration>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation of capability `T` under `id`.
    pub fn register<T: ?Sized + 'static>(
        &mut self,
        id: impl Into<String>,
        factory: impl Fn() -> Box<T> + Send + Sync + 'static,
    ) -> &mut Self {
        let factory: Factory<T> = Box::new(factory);
        self.entries
            .entry(ServiceType::of::<T>())
            .or_default()
            .push(Registration {
                id: id.into(),
                factory: Box::new(factory),
            });
        self
    }

    /// Ids registered for `T`, in registration order.
    pub fn implementation_ids<T: ?Sized + 'static>(&self) -> Vec<&str> {
        self.entries
            .get(&ServiceType::of::<T>())
            .map(|registrations| registrations.iter().map(|r| r.id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Number of implementations registered for `T`.
    pub fn count<T: ?Sized + 'static>(&self) -> usize {
        self.entries
            .get(&ServiceType::of::<T>())
            .map_or(0, Vec::len)
    }

    fn instantiate<T: ?Sized + 'static>(&self) -> Vec<Box<T>> {
        self.entries
            .get(&ServiceType::of::<T>())
            .map(|registrations| {
                registrations
                    .iter()
                    .filter_map(|r| r.factory.downcast_ref::<Factory<T>>())
                    .map(|factory| factory())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ServiceLocator for ServiceRegistry {
    fn load_implementors<T: ?Sized + 'static>(&self, required: bool) -> Result<Vec<Box<T>>> {
        let implementors = self.instantiate::<T>();
        if implementors.is_empty() && required {
            return Err(Error::NotFound {
                capability: ServiceType::of::<T>(),
            });
        }
        tracing::debug!(
            capability = ServiceType::of::<T>().name(),
            count = implementors.len(),
            "Discovered implementations"
        );
        Ok(implementors)
    }

    fn load_singleton_implementor<T: ?Sized + 'static>(
        &self,
        required: bool,
    ) -> Result<Option<Box<T>>> {
        let ids = self.implementation_ids::<T>();
        if ids.len() > 1 {
            return Err(Error::MultipleFound {
                capability: ServiceType::of::<T>(),
                implementations: ids.into_iter().map(String::from).collect(),
            });
        }
        let mut implementors = self.load_implementors::<T>(required)?;
        Ok(implementors.pop())
    }
}
