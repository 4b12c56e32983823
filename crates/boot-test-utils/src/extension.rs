//! [`TestExtension`] builder and the fixture services it exchanges.
//!
//! Every hook records `"<hook>:<name>"` into the shared [`EventLog`], and
//! every provider records `"provide:<name>"` (or `"default:<name>"`) when it
//! runs, so tests can assert on the exact call sequence.

use std::sync::Arc;

use boot_spi::{
    HookResult, Inject, InjectionPoint, ProviderMethod, ServiceExtension,
    ServiceExtensionContext, ServiceType,
};

use crate::events::EventLog;

#[derive(Debug, Default)]
pub struct ServiceX;

#[derive(Debug, Default)]
pub struct ServiceY;

#[derive(Debug, Default)]
pub struct ServiceZ;

/// Hook a [`TestExtension`] can be told to fail in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Initialize,
    Prepare,
    Start,
    Shutdown,
}

type SlotCheck = Box<dyn Fn() -> bool + Send>;
type Registration = Box<dyn Fn(&mut ServiceExtensionContext) -> HookResult + Send>;

/// Configurable extension for boot scenarios.
///
/// ```
/// use boot_test_utils::{EventLog, ServiceX, ServiceY, TestExtension};
///
/// let log = EventLog::new();
/// let extension = TestExtension::new("api", &log)
///     .requires::<ServiceX>()
///     .provides::<ServiceY>();
/// # let _ = extension;
/// ```
pub struct TestExtension {
    name: String,
    log: EventLog,
    points: Vec<InjectionPoint>,
    required_slots: Vec<(ServiceType, SlotCheck)>,
    declared: Vec<ServiceType>,
    providers: Vec<ProviderMethod>,
    registrations: Vec<Registration>,
    fail_on: Option<Hook>,
}

impl TestExtension {
    pub fn new(name: impl Into<String>, log: &EventLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            points: Vec::new(),
            required_slots: Vec::new(),
            declared: Vec::new(),
            providers: Vec::new(),
            registrations: Vec::new(),
            fail_on: None,
        }
    }

    /// Add a required `Inject<T>` slot. `initialize` fails if it is empty.
    pub fn requires<T: Send + Sync + 'static>(mut self) -> Self {
        let slot = Inject::<T>::required();
        self.points.push(slot.point());
        let check: SlotCheck = Box::new(move || slot.is_injected());
        self.required_slots.push((ServiceType::of::<T>(), check));
        self
    }

    /// Add an optional `Inject<T>` slot.
    pub fn optional<T: Send + Sync + 'static>(mut self) -> Self {
        self.points.push(Inject::<T>::optional().point());
        self
    }

    /// Produce `T` from a provider method during the provide phase.
    pub fn provides<T: Default + Send + Sync + 'static>(mut self) -> Self {
        let log = self.log.clone();
        let event = format!("provide:{}", self.name);
        self.providers.push(ProviderMethod::new(move |_| {
            log.record(event.clone());
            Ok(Arc::new(T::default()))
        }));
        self
    }

    /// Offer `T` as a fallback for extensions nobody else serves.
    pub fn default_provides<T: Default + Send + Sync + 'static>(mut self) -> Self {
        let log = self.log.clone();
        let event = format!("default:{}", self.name);
        self.providers.push(ProviderMethod::default_for(move |_| {
            log.record(event.clone());
            Ok(Arc::new(T::default()))
        }));
        self
    }

    /// Provide `T` from a factory that always fails.
    pub fn failing_provider<T: Send + Sync + 'static>(mut self) -> Self {
        self.providers
            .push(ProviderMethod::new::<T, _>(|_| Err("factory failed".into())));
        self
    }

    /// Declare `T` in `provides` without ever registering it.
    pub fn declares<T: Send + Sync + 'static>(mut self) -> Self {
        self.declared.push(ServiceType::of::<T>());
        self
    }

    /// Declare `T` in `provides` and register it from `initialize`.
    pub fn registers_on_initialize<T: Default + Send + Sync + 'static>(mut self) -> Self {
        self.declared.push(ServiceType::of::<T>());
        let register: Registration = Box::new(|context: &mut ServiceExtensionContext| {
            context.register_service(Arc::new(T::default()))?;
            Ok(())
        });
        self.registrations.push(register);
        self
    }

    pub fn fails_on(mut self, hook: Hook) -> Self {
        self.fail_on = Some(hook);
        self
    }

    pub fn boxed(self) -> Box<dyn ServiceExtension> {
        Box::new(self)
    }

    fn run(&self, hook: Hook, label: &str) -> HookResult {
        self.log.record(format!("{label}:{}", self.name));
        if self.fail_on == Some(hook) {
            return Err(format!("{} refused to {label}", self.name).into());
        }
        Ok(())
    }
}

impl ServiceExtension for TestExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn injection_points(&self) -> Vec<InjectionPoint> {
        self.points.clone()
    }

    fn provides(&self) -> Vec<ServiceType> {
        self.declared.clone()
    }

    fn provider_methods(&self) -> Vec<ProviderMethod> {
        self.providers.clone()
    }

    fn initialize(&mut self, context: &mut ServiceExtensionContext) -> HookResult {
        for (service_type, injected) in &self.required_slots {
            if !injected() {
                return Err(format!("{service_type} was not injected into {}", self.name).into());
            }
        }
        self.run(Hook::Initialize, "initialize")?;
        for register in &self.registrations {
            register(context)?;
        }
        Ok(())
    }

    fn prepare(&mut self) -> HookResult {
        self.run(Hook::Prepare, "prepare")
    }

    fn start(&mut self) -> HookResult {
        self.run(Hook::Start, "start")
    }

    fn shutdown(&mut self) -> HookResult {
        self.run(Hook::Shutdown, "shutdown")
    }
}
