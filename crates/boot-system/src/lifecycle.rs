//! Drives ordered extensions through the boot phases.

use std::fmt;
use std::sync::Arc;

use boot_spi::{ErrorCause, HookResult, Monitor, ServiceExtension, ServiceExtensionContext};

use crate::error::{Error, Phase, Result};
use crate::injection::{
    DefaultServiceSupplier, InjectionContainer, InjectionPointDefaultServiceSupplier, Injector,
};

/// Furthest phase an extension has completed. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Loaded,
    Injected,
    Initialized,
    Provided,
    Prepared,
    Started,
    Shutdown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loaded => "loaded",
            Self::Injected => "injected",
            Self::Initialized => "initialized",
            Self::Provided => "provided",
            Self::Prepared => "prepared",
            Self::Started => "started",
            Self::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Runs the lifecycle for containers already in boot order.
///
/// Inject, initialize and provide run per extension before moving to the
/// next one, so every extension sees the services of all its predecessors.
/// The context is then frozen and two full sweeps call `prepare` and
/// `start`. The first failure aborts the boot; completed hooks are not
/// rolled back.
pub struct ExtensionLifecycleManager<S = InjectionPointDefaultServiceSupplier> {
    containers: Vec<InjectionContainer>,
    states: Vec<LifecycleState>,
    injector: Injector<S>,
}

impl ExtensionLifecycleManager {
    pub fn new(containers: Vec<InjectionContainer>) -> Self {
        Self::with_injector(containers, Injector::new())
    }
}

impl<S: DefaultServiceSupplier> ExtensionLifecycleManager<S> {
    pub fn with_injector(containers: Vec<InjectionContainer>, injector: Injector<S>) -> Self {
        let states = vec![LifecycleState::Loaded; containers.len()];
        Self {
            containers,
            states,
            injector,
        }
    }

    /// Run every phase up to started and leave `context` frozen.
    ///
    /// # Errors
    ///
    /// - `Error::Injection` when a required service cannot be resolved
    /// - `Error::LifecycleHook` when an extension hook fails
    /// - `Error::Spi` when a provider fails or writes to a frozen context
    pub fn boot(&mut self, context: &mut ServiceExtensionContext) -> Result<()> {
        let monitor = Arc::clone(context.monitor());

        for index in 0..self.containers.len() {
            self.inject(index, context)?;
            self.initialize(index, context)?;
            monitor.info(&format!("Initialized {}", self.containers[index].name()), &[]);
            self.provide(index, context)?;
        }

        context.freeze();
        tracing::debug!(services = context.service_types().count(), "Context frozen");

        self.sweep(
            (Phase::Prepare, LifecycleState::Prepared, "Prepared"),
            |target| target.prepare(),
            monitor.as_ref(),
        )?;
        self.sweep(
            (Phase::Start, LifecycleState::Started, "Started"),
            |target| target.start(),
            monitor.as_ref(),
        )?;
        Ok(())
    }

    /// Call `shutdown` in reverse boot order on every extension that got
    /// past initialization.
    ///
    /// Failures are reported to `monitor` and do not stop the remaining
    /// extensions from shutting down. Returns the number of failures.
    pub fn shutdown(&mut self, monitor: &dyn Monitor) -> usize {
        let mut failures = 0;

        for index in (0..self.containers.len()).rev() {
            let state = self.states[index];
            if state < LifecycleState::Initialized || state == LifecycleState::Shutdown {
                continue;
            }

            let container = &mut self.containers[index];
            let name = container.name().to_string();
            match container.target_mut().shutdown() {
                Ok(()) => monitor.debug(&format!("Shutdown {name}"), &[]),
                Err(err) => {
                    failures += 1;
                    let error = Error::LifecycleHook {
                        extension: name,
                        phase: Phase::Shutdown,
                        source: err,
                    };
                    let cause: ErrorCause<'_> = &error;
                    monitor.severe(&error.to_string(), &[cause]);
                }
            }
            self.states[index] = LifecycleState::Shutdown;
        }

        failures
    }

    /// Extension names in boot order.
    pub fn boot_order(&self) -> Vec<&str> {
        self.containers.iter().map(InjectionContainer::name).collect()
    }

    /// Each extension with the state it reached, in boot order.
    pub fn states(&self) -> Vec<(&str, LifecycleState)> {
        self.containers
            .iter()
            .map(InjectionContainer::name)
            .zip(self.states.iter().copied())
            .collect()
    }

    pub fn state_of(&self, name: &str) -> Option<LifecycleState> {
        self.containers
            .iter()
            .position(|container| container.name() == name)
            .map(|index| self.states[index])
    }

    fn inject(&mut self, index: usize, context: &mut ServiceExtensionContext) -> Result<()> {
        self.injector.inject(&mut self.containers[index], context)?;
        self.states[index] = LifecycleState::Injected;
        Ok(())
    }

    fn initialize(&mut self, index: usize, context: &mut ServiceExtensionContext) -> Result<()> {
        let container = &mut self.containers[index];
        container
            .target_mut()
            .initialize(context)
            .map_err(|source| Error::LifecycleHook {
                extension: container.name().to_string(),
                phase: Phase::Initialize,
                source,
            })?;
        self.states[index] = LifecycleState::Initialized;
        Ok(())
    }

    fn provide(&mut self, index: usize, context: &mut ServiceExtensionContext) -> Result<()> {
        let container = &self.containers[index];
        for provider in container.service_providers() {
            provider.register(context)?;
            tracing::debug!(
                extension = container.name(),
                service = provider.produced_type().name(),
                "Registered provided service"
            );
        }
        self.states[index] = LifecycleState::Provided;
        Ok(())
    }

    fn sweep(
        &mut self,
        (phase, reached, label): (Phase, LifecycleState, &str),
        hook: fn(&mut dyn ServiceExtension) -> HookResult,
        monitor: &dyn Monitor,
    ) -> Result<()> {
        for (container, state) in self.containers.iter_mut().zip(self.states.iter_mut()) {
            hook(container.target_mut()).map_err(|source| Error::LifecycleHook {
                extension: container.name().to_string(),
                phase,
                source,
            })?;
            *state = reached;
            monitor.info(&format!("{label} {}", container.name()), &[]);
        }
        Ok(())
    }
}

impl<S> fmt::Debug for ExtensionLifecycleManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionLifecycleManager")
            .field("containers", &self.containers)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boot_spi::{Config, HookResult, ServiceExtension};
    use boot_test_utils::{EventLog, RecordingMonitor};

    struct Recorder {
        name: &'static str,
        log: EventLog,
        fail_prepare: bool,
    }

    impl ServiceExtension for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&mut self, _context: &mut ServiceExtensionContext) -> HookResult {
            self.log.record(format!("initialize:{}", self.name));
            Ok(())
        }

        fn prepare(&mut self) -> HookResult {
            self.log.record(format!("prepare:{}", self.name));
            if self.fail_prepare {
                return Err("port in use".into());
            }
            Ok(())
        }

        fn start(&mut self) -> HookResult {
            self.log.record(format!("start:{}", self.name));
            Ok(())
        }

        fn shutdown(&mut self) -> HookResult {
            self.log.record(format!("shutdown:{}", self.name));
            Ok(())
        }
    }

    fn manager(log: &EventLog, failing: Option<&'static str>) -> ExtensionLifecycleManager {
        let containers = ["a", "b"]
            .into_iter()
            .map(|name| {
                InjectionContainer::new(Box::new(Recorder {
                    name,
                    log: log.clone(),
                    fail_prepare: failing == Some(name),
                }))
            })
            .collect();
        ExtensionLifecycleManager::new(containers)
    }

    #[test]
    fn test_phases_run_as_sweeps_after_initialize() {
        let log = EventLog::new();
        let monitor = RecordingMonitor::new();
        let mut context = ServiceExtensionContext::new(Arc::new(monitor.clone()), Config::new());

        let mut manager = manager(&log, None);
        manager.boot(&mut context).unwrap();

        assert_eq!(
            log.events(),
            vec![
                "initialize:a",
                "initialize:b",
                "prepare:a",
                "prepare:b",
                "start:a",
                "start:b"
            ]
        );
        assert!(context.is_frozen());
        assert_eq!(manager.state_of("b"), Some(LifecycleState::Started));
        assert_eq!(
            monitor.messages(),
            vec![
                "Initialized a",
                "Initialized b",
                "Prepared a",
                "Prepared b",
                "Started a",
                "Started b"
            ]
        );
    }

    #[test]
    fn test_failing_hook_aborts_remaining_extensions() {
        let log = EventLog::new();
        let mut context =
            ServiceExtensionContext::new(Arc::new(RecordingMonitor::new()), Config::new());

        let mut manager = manager(&log, Some("a"));
        let err = manager.boot(&mut context).unwrap_err();

        assert_eq!(err.to_string(), "extension 'a' failed to prepare: port in use");
        assert!(!log.contains("prepare:b"));
        assert!(!log.contains("start:a"));
        assert_eq!(manager.state_of("a"), Some(LifecycleState::Provided));
    }

    #[test]
    fn test_shutdown_runs_in_reverse_order_once() {
        let log = EventLog::new();
        let monitor = RecordingMonitor::new();
        let mut context = ServiceExtensionContext::new(Arc::new(monitor.clone()), Config::new());

        let mut manager = manager(&log, None);
        manager.boot(&mut context).unwrap();
        assert_eq!(manager.shutdown(&monitor), 0);
        assert_eq!(manager.shutdown(&monitor), 0);

        let shutdowns: Vec<String> = log
            .events()
            .into_iter()
            .filter(|event| event.starts_with("shutdown"))
            .collect();
        assert_eq!(shutdowns, vec!["shutdown:b", "shutdown:a"]);
    }
}
