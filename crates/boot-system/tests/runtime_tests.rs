//! Tests for the runtime facade: boot, plan and shutdown

use boot_spi::{Config, ConfigurationExtension, Level, Monitor, MonitorExtension, ServiceExtension};
use boot_system::{
    Error, LifecycleState, PlannedExtension, RuntimeBuilder, ServiceRegistry,
    TomlFileConfiguration,
};
use boot_test_utils::{
    EventLog, Hook, RecordingMonitor, ServiceX, ServiceY, TempConfigFile, TestExtension,
};
use pretty_assertions::assert_eq;

fn registry(log: &EventLog, monitor: &RecordingMonitor) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    let recording = monitor.clone();
    registry.register::<dyn MonitorExtension>("recording", move || Box::new(recording.clone()));

    let consumer = log.clone();
    let producer = log.clone();
    registry
        .register::<dyn ServiceExtension>("api", move || {
            TestExtension::new("api", &consumer)
                .requires::<ServiceX>()
                .optional::<ServiceY>()
                .boxed()
        })
        .register::<dyn ServiceExtension>("store", move || {
            TestExtension::new("store", &producer)
                .provides::<ServiceX>()
                .boxed()
        });
    registry
}

fn builder(registry: ServiceRegistry) -> RuntimeBuilder {
    RuntimeBuilder::new(registry).environment(Vec::<(String, String)>::new())
}

#[test]
fn test_boot_starts_every_extension() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let runtime = builder(registry(&log, &monitor)).boot().unwrap();

    assert_eq!(runtime.boot_order(), vec!["store", "api"]);
    assert!(
        runtime
            .extension_states()
            .iter()
            .all(|(_, state)| *state == LifecycleState::Started)
    );
    assert!(runtime.service::<ServiceX>().is_ok());
    assert!(runtime.context().is_frozen());
    assert!(monitor.contains(Level::Info, "Runtime ready with 2 service extensions"));
}

#[test]
fn test_base_services_are_registered() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let runtime = builder(registry(&log, &monitor))
        .property("edc.hostname", "localhost")
        .boot()
        .unwrap();

    let config = runtime.service::<Config>().unwrap();
    assert_eq!(config.get("edc.hostname"), Some("localhost"));

    let shared = runtime.service::<dyn Monitor>().unwrap();
    shared.debug("through the context", &[]);
    assert!(monitor.contains(Level::Debug, "through the context"));
}

#[test]
fn test_configuration_layers() {
    let file = TempConfigFile::new(
        r#"
[edc]
hostname = "file-host"
id = "file-id"

[edc.api]
port = 8181
"#,
    );
    let path = file.path().to_path_buf();

    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let mut registry = registry(&log, &monitor);
    registry.register::<dyn ConfigurationExtension>("toml", move || {
        Box::new(TomlFileConfiguration::new(path.clone()))
    });

    let runtime = RuntimeBuilder::new(registry)
        .environment([("EDC_API_PORT", "9191"), ("EDC_ID", "env-id")])
        .property("edc.id", "property-id")
        .boot()
        .unwrap();

    let config = runtime.config();
    assert_eq!(config.get("edc.hostname"), Some("file-host"));
    assert_eq!(config.get("edc.api.port"), Some("9191"));
    assert_eq!(config.get("edc.id"), Some("property-id"));
    assert!(monitor.contains(Level::Info, "Initialized TOML File Configuration"));
}

#[test]
fn test_boot_failure_is_reported_as_severe() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let mut registry = ServiceRegistry::new();
    let recording = monitor.clone();
    registry.register::<dyn MonitorExtension>("recording", move || Box::new(recording.clone()));
    let orphan = log.clone();
    registry.register::<dyn ServiceExtension>("orphan", move || {
        TestExtension::new("orphan", &orphan)
            .requires::<ServiceY>()
            .boxed()
    });

    let err = builder(registry).boot().unwrap_err();

    assert!(matches!(err, Error::UnsatisfiableDependency { .. }));
    let severe: Vec<_> = monitor
        .records()
        .into_iter()
        .filter(|r| r.level == Level::Severe)
        .collect();
    assert_eq!(severe.len(), 1);
    assert_eq!(severe[0].message, "Error booting runtime");
    assert!(severe[0].causes[0].contains("required by 'orphan'"));
    assert!(log.is_empty());
}

#[test]
fn test_hook_failure_aborts_boot() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let mut registry = registry(&log, &monitor);
    let failing = log.clone();
    registry.register::<dyn ServiceExtension>("flaky", move || {
        TestExtension::new("flaky", &failing)
            .fails_on(Hook::Prepare)
            .boxed()
    });

    let err = builder(registry).boot().unwrap_err();

    assert_eq!(err.to_string(), "extension 'flaky' failed to prepare: flaky refused to prepare");
    assert!(log.with_prefix("start:").is_empty());
}

#[test]
fn test_invalid_log_level_fails_before_boot() {
    let log = EventLog::new();
    let mut registry = ServiceRegistry::new();
    let only = log.clone();
    registry.register::<dyn ServiceExtension>("only", move || {
        TestExtension::new("only", &only).boxed()
    });

    let err = builder(registry)
        .program_args(["--log-level=chatty"])
        .boot()
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(err.to_string().contains("Invalid value \"chatty\""));
    assert!(log.is_empty());
}

#[test]
fn test_plan_runs_no_hooks() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let plan = builder(registry(&log, &monitor)).plan().unwrap();

    assert_eq!(
        plan,
        vec![
            PlannedExtension {
                name: "store".to_string(),
                depends_on: Vec::new(),
            },
            PlannedExtension {
                name: "api".to_string(),
                depends_on: vec!["store".to_string()],
            },
        ]
    );
    assert!(log.is_empty());
}

#[test]
fn test_shutdown_in_reverse_boot_order() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let runtime = builder(registry(&log, &monitor)).boot().unwrap();

    assert_eq!(runtime.shutdown(), 0);
    assert_eq!(
        log.with_prefix("shutdown:"),
        vec!["shutdown:api", "shutdown:store"]
    );
    assert!(monitor.contains(Level::Info, "Runtime shut down"));
}
