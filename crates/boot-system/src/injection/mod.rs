//! Dependency injection: containers, the injector and default suppliers.

pub mod container;
pub mod injector;
pub mod supplier;

pub use container::InjectionContainer;
pub use injector::Injector;
pub use supplier::{DefaultServiceSupplier, InjectionPointDefaultServiceSupplier};
