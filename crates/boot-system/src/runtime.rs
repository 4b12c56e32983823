//! Runtime facade: the whole boot sequence behind one call.

use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use boot_spi::{Config, ErrorCause, Monitor, ServiceExtension, ServiceExtensionContext};

use crate::config::ConfigurationLoader;
use crate::dependency::DependencyGraph;
use crate::discovery::{ServiceLocator, ServiceRegistry};
use crate::error::{Error, Result};
use crate::lifecycle::{ExtensionLifecycleManager, LifecycleState};
use crate::loader::ExtensionLoader;

/// Configures and boots a [`Runtime`].
///
/// ```
/// use boot_spi::ServiceExtension;
/// use boot_system::{RuntimeBuilder, ServiceRegistry};
///
/// struct Hello;
///
/// impl ServiceExtension for Hello {
///     fn name(&self) -> &str { "hello" }
/// }
///
/// let mut registry = ServiceRegistry::new();
/// registry.register::<dyn ServiceExtension>("hello", || Box::new(Hello));
///
/// let runtime = RuntimeBuilder::new(registry)
///     .program_args(["--log-level=severe"])
///     .environment(Vec::<(String, String)>::new())
///     .boot()
///     .unwrap();
/// assert_eq!(runtime.boot_order(), vec!["hello"]);
/// runtime.shutdown();
/// ```
pub struct RuntimeBuilder<L = ServiceRegistry> {
    loader: ExtensionLoader<L>,
    program_args: Vec<String>,
    environment: Option<Vec<(String, String)>>,
    properties: Vec<(String, String)>,
}

impl<L: ServiceLocator> RuntimeBuilder<L> {
    pub fn new(locator: L) -> Self {
        Self {
            loader: ExtensionLoader::new(locator),
            program_args: Vec::new(),
            environment: None,
            properties: Vec::new(),
        }
    }

    /// Arguments scanned for `--log-level=<LEVEL>` and `--no-color`.
    pub fn program_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.program_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Environment layer of the configuration. Defaults to the process
    /// environment.
    pub fn environment<K, V>(mut self, variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = Some(
            variables
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Add one property to the highest configuration layer.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Load the monitor and configuration, order the service extensions
    /// and drive them to started.
    ///
    /// Failures after the monitor is available are reported to it as
    /// severe before being returned.
    ///
    /// # Errors
    ///
    /// Any [`Error`] raised while discovering, ordering or booting.
    pub fn boot(self) -> Result<Runtime> {
        let monitor = self.loader.load_monitor(self.program_args.as_slice())?;
        match self.boot_with(&monitor) {
            Ok(runtime) => {
                monitor.info(
                    &format!(
                        "Runtime ready with {} service extensions",
                        runtime.manager.boot_order().len()
                    ),
                    &[],
                );
                Ok(runtime)
            }
            Err(err) => Err(report(monitor.as_ref(), err)),
        }
    }

    /// Compute the boot order without running any extension hook.
    ///
    /// # Errors
    ///
    /// The discovery and graph errors [`RuntimeBuilder::boot`] would report.
    pub fn plan(self) -> Result<Vec<PlannedExtension>> {
        let monitor = self.loader.load_monitor(self.program_args.as_slice())?;
        self.plan_with(&monitor)
            .map_err(|err| report(monitor.as_ref(), err))
    }

    fn boot_with(&self, monitor: &Arc<dyn Monitor>) -> Result<Runtime> {
        let mut context = self.context(monitor)?;
        let containers = self.loader.load_service_extensions(&context)?;
        let mut manager = ExtensionLifecycleManager::new(containers);
        manager.boot(&mut context)?;
        Ok(Runtime {
            context,
            manager,
            monitor: Arc::clone(monitor),
        })
    }

    fn plan_with(&self, monitor: &Arc<dyn Monitor>) -> Result<Vec<PlannedExtension>> {
        let context = self.context(monitor)?;
        let extensions = self.loader.load_extensions::<dyn ServiceExtension>(true)?;
        let graph = DependencyGraph::build(extensions, &context)?;

        let dependencies: Vec<(String, Vec<String>)> = graph
            .node_names()
            .map(|name| {
                let depends_on = graph
                    .dependencies_of(name)
                    .into_iter()
                    .map(String::from)
                    .collect();
                (name.to_string(), depends_on)
            })
            .collect();

        let order = graph.topological_sort()?;
        Ok(order
            .iter()
            .filter_map(|container| {
                dependencies
                    .iter()
                    .find(|(name, _)| name == container.name())
                    .map(|(name, depends_on)| PlannedExtension {
                        name: name.clone(),
                        depends_on: depends_on.clone(),
                    })
            })
            .collect())
    }

    fn context(&self, monitor: &Arc<dyn Monitor>) -> Result<ServiceExtensionContext> {
        let config = self.configuration(monitor.as_ref())?;
        Ok(ServiceExtensionContext::new(Arc::clone(monitor), config))
    }

    fn configuration(&self, monitor: &dyn Monitor) -> Result<Config> {
        let environment = match &self.environment {
            Some(variables) => variables.clone(),
            None => process_environment(std::env::vars_os()),
        };
        ConfigurationLoader::new()
            .with_environment(environment)
            .with_properties(self.properties.iter().cloned())
            .load(self.loader.locator(), monitor)
    }
}

/// Environment variables with valid UTF-8 names and values. Other pairs
/// are skipped.
fn process_environment(
    variables: impl IntoIterator<Item = (OsString, OsString)>,
) -> Vec<(String, String)> {
    variables
        .into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                tracing::debug!(variable = ?key, "Skipping non UTF-8 environment variable");
                None
            }
        })
        .collect()
}

fn report(monitor: &dyn Monitor, err: Error) -> Error {
    let cause: ErrorCause<'_> = &err;
    monitor.severe("Error booting runtime", &[cause]);
    err
}

/// One extension in a computed boot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedExtension {
    pub name: String,
    /// Extensions providing services this one requires, in discovery order.
    pub depends_on: Vec<String>,
}

/// A booted set of extensions sharing one frozen context.
pub struct Runtime {
    context: ServiceExtensionContext,
    manager: ExtensionLifecycleManager,
    monitor: Arc<dyn Monitor>,
}

impl Runtime {
    pub fn context(&self) -> &ServiceExtensionContext {
        &self.context
    }

    pub fn monitor(&self) -> &Arc<dyn Monitor> {
        &self.monitor
    }

    pub fn config(&self) -> &Config {
        self.context.config()
    }

    /// Look up a registered service.
    ///
    /// # Errors
    ///
    /// `Error::Spi` when nothing is registered for `T`.
    pub fn service<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        Ok(self.context.service::<T>()?)
    }

    pub fn boot_order(&self) -> Vec<&str> {
        self.manager.boot_order()
    }

    pub fn extension_states(&self) -> Vec<(&str, LifecycleState)> {
        self.manager.states()
    }

    /// Shut extensions down in reverse boot order. Individual failures are
    /// reported to the monitor; the number of failures is returned.
    pub fn shutdown(mut self) -> usize {
        let failures = self.manager.shutdown(self.monitor.as_ref());
        if failures == 0 {
            self.monitor.info("Runtime shut down", &[]);
        } else {
            self.monitor.warning(
                &format!("Runtime shut down with {failures} failing extensions"),
                &[],
            );
        }
        failures
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("context", &self.context)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}
