//! Loads extensions through a [`ServiceLocator`].

use std::sync::Arc;

use boot_spi::{Monitor, MonitorExtension, ServiceExtension, ServiceExtensionContext};

use crate::dependency::DependencyGraph;
use crate::discovery::ServiceLocator;
use crate::error::Result;
use crate::injection::InjectionContainer;
use crate::monitor;

/// Entry point from discovery to boot-ordered containers.
#[derive(Debug, Clone)]
pub struct ExtensionLoader<L> {
    locator: L,
}

impl<L: ServiceLocator> ExtensionLoader<L> {
    pub fn new(locator: L) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Discover every service extension and return them in boot order.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when no service extension is registered, plus
    /// everything [`DependencyGraph::of`] reports.
    pub fn load_service_extensions(
        &self,
        context: &ServiceExtensionContext,
    ) -> Result<Vec<InjectionContainer>> {
        let extensions = self.load_extensions::<dyn ServiceExtension>(true)?;
        DependencyGraph::of(extensions, context)
    }

    /// Discover every implementation of `T`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when `required` is set and none exists.
    pub fn load_extensions<T: ?Sized + 'static>(&self, required: bool) -> Result<Vec<Box<T>>> {
        self.locator.load_implementors::<T>(required)
    }

    /// Discover the single implementation of `T`, if any.
    ///
    /// # Errors
    ///
    /// `Error::MultipleFound` when several exist, `Error::NotFound` when
    /// `required` is set and none exists.
    pub fn load_singleton<T: ?Sized + 'static>(&self, required: bool) -> Result<Option<Box<T>>> {
        self.locator.load_singleton_implementor::<T>(required)
    }

    /// Select the boot monitor from the registered monitor extensions.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` when the console monitor is needed and
    /// `program_args` carries a malformed `--log-level`.
    pub fn load_monitor<S: AsRef<str>>(&self, program_args: &[S]) -> Result<Arc<dyn Monitor>> {
        let extensions = self.load_extensions::<dyn MonitorExtension>(false)?;
        monitor::load_monitor(extensions, program_args)
    }
}
