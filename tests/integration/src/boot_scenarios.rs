//! End-to-end boot scenarios
//!
//! Each scenario registers extensions with a `ServiceRegistry`, boots them
//! through the public runtime API and checks the observable outcome: boot
//! order, hook sequence, registered services and monitor output.

use std::collections::HashMap;

use boot_spi::{Level, MonitorExtension, ServiceExtension, ServiceExtensionContext};
use boot_system::{
    DependencyGraph, Error, ExtensionLifecycleManager, ExtensionLoader, RuntimeBuilder,
    ServiceRegistry,
};
use boot_test_utils::{EventLog, RecordingMonitor, ServiceX, ServiceY, ServiceZ, TestExtension};
use pretty_assertions::assert_eq;
use rstest::rstest;

// =============================================================================
// Test Infrastructure
// =============================================================================

type Blueprint = fn(TestExtension) -> TestExtension;

/// Registry of `TestExtension`s built from `(name, blueprint)` pairs, all
/// journaling into `log`.
fn registry(log: &EventLog, extensions: &[(&'static str, Blueprint)]) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    for &(name, blueprint) in extensions {
        let log = log.clone();
        registry.register::<dyn ServiceExtension>(name, move || {
            blueprint(TestExtension::new(name, &log)).boxed()
        });
    }
    registry
}

/// Runtime builder with a recording monitor and an empty environment.
fn builder(mut registry: ServiceRegistry, monitor: &RecordingMonitor) -> RuntimeBuilder {
    let recording = monitor.clone();
    registry.register::<dyn MonitorExtension>("recording", move || Box::new(recording.clone()));
    RuntimeBuilder::new(registry).environment(Vec::<(String, String)>::new())
}

/// Assert that every extension in `order` comes after the providers it
/// depends on according to `edges`.
fn assert_topological(order: &[&str], edges: &[(&str, &str)]) {
    let position: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(index, name)| (*name, index))
        .collect();
    for (dependent, dependency) in edges {
        assert!(
            position[dependency] < position[dependent],
            "{dependency} must boot before {dependent} in {order:?}"
        );
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_provider_boots_before_consumer() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let runtime = builder(
        registry(
            &log,
            &[("a", |e| e.requires::<ServiceX>()), ("b", |e| e.provides::<ServiceX>())],
        ),
        &monitor,
    )
    .boot()
    .unwrap();

    assert_eq!(runtime.boot_order(), vec!["b", "a"]);
    assert_eq!(
        log.with_prefix("initialize:"),
        vec!["initialize:b", "initialize:a"]
    );
}

#[test]
fn test_layered_application_boots_in_valid_order() {
    let extensions: [(&'static str, Blueprint); 5] = [
        ("web", |e| e.requires::<ServiceY>().requires::<ServiceZ>()),
        ("auth", |e| e.requires::<ServiceX>().provides::<ServiceY>()),
        ("metrics", |e| e.optional::<ServiceY>()),
        ("catalog", |e| e.requires::<ServiceX>().provides::<ServiceZ>()),
        ("store", |e| e.provides::<ServiceX>()),
    ];
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let runtime = builder(registry(&log, &extensions), &monitor)
        .boot()
        .unwrap();

    let order = runtime.boot_order();
    assert_eq!(order.len(), 5);
    assert_topological(
        &order,
        &[
            ("web", "auth"),
            ("web", "catalog"),
            ("auth", "store"),
            ("catalog", "store"),
        ],
    );
}

#[test]
fn test_identical_discovery_gives_identical_order() {
    let extensions: [(&'static str, Blueprint); 4] = [
        ("d", |e| e.requires::<ServiceY>().requires::<ServiceZ>()),
        ("c", |e| e.requires::<ServiceX>().provides::<ServiceZ>()),
        ("b", |e| e.requires::<ServiceX>().provides::<ServiceY>()),
        ("a", |e| e.provides::<ServiceX>()),
    ];

    let orders: Vec<Vec<String>> = (0..3)
        .map(|_| {
            let log = EventLog::new();
            let monitor = RecordingMonitor::new();
            let runtime = builder(registry(&log, &extensions), &monitor)
                .boot()
                .unwrap();
            runtime
                .boot_order()
                .into_iter()
                .map(String::from)
                .collect()
        })
        .collect();

    assert_eq!(orders[0], vec!["a", "c", "b", "d"]);
    assert_eq!(orders[0], orders[1]);
    assert_eq!(orders[1], orders[2]);
}

#[test]
fn test_plan_matches_boot_order() {
    let extensions: [(&'static str, Blueprint); 3] = [
        ("api", |e| e.requires::<ServiceX>()),
        ("store", |e| e.provides::<ServiceX>()),
        ("audit", |e| e),
    ];
    let log = EventLog::new();

    let plan = builder(registry(&log, &extensions), &RecordingMonitor::new())
        .plan()
        .unwrap();
    let runtime = builder(registry(&log, &extensions), &RecordingMonitor::new())
        .boot()
        .unwrap();

    let planned: Vec<&str> = plan.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(planned, runtime.boot_order());
    assert_eq!(plan[1].depends_on, vec!["store"]);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_full_lifecycle_sequence() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let runtime = builder(
        registry(
            &log,
            &[("api", |e| e.requires::<ServiceX>()), ("store", |e| e.provides::<ServiceX>())],
        ),
        &monitor,
    )
    .boot()
    .unwrap();

    assert_eq!(
        log.events(),
        vec![
            "initialize:store",
            "provide:store",
            "initialize:api",
            "prepare:store",
            "prepare:api",
            "start:store",
            "start:api",
        ]
    );
    assert_eq!(
        monitor.messages_at(Level::Info),
        vec![
            "Initialized store",
            "Initialized api",
            "Prepared store",
            "Prepared api",
            "Started store",
            "Started api",
            "Runtime ready with 2 service extensions",
        ]
    );

    assert_eq!(runtime.shutdown(), 0);
    assert_eq!(
        log.with_prefix("shutdown:"),
        vec!["shutdown:api", "shutdown:store"]
    );
}

#[test]
fn test_context_is_read_only_after_boot() {
    let log = EventLog::new();
    let loader = ExtensionLoader::new(registry(
        &log,
        &[("store", |e| e.provides::<ServiceX>())],
    ));
    let (mut context, _monitor) = boot_test_utils::test_context();

    let containers = loader.load_service_extensions(&context).unwrap();
    let mut manager = ExtensionLifecycleManager::new(containers);
    manager.boot(&mut context).unwrap();

    assert!(context.is_frozen());
    assert!(context.service::<ServiceX>().is_ok());
    assert!(context.register_service(std::sync::Arc::new(ServiceY)).is_err());
    assert!(!context.has::<ServiceY>());
}

#[test]
fn test_default_provider_fills_missing_service() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let runtime = builder(
        registry(
            &log,
            &[
                ("api", |e| e.requires::<ServiceX>()),
                ("fallback", |e| e.default_provides::<ServiceX>()),
            ],
        ),
        &monitor,
    )
    .boot()
    .unwrap();

    assert_eq!(runtime.boot_order(), vec!["api", "fallback"]);
    assert!(runtime.service::<ServiceX>().is_ok());
    assert_eq!(log.with_prefix("default:"), vec!["default:fallback"]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_provider_aborts_before_initialize() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let err = builder(
        registry(
            &log,
            &[("store", |e| e.provides::<ServiceY>()), ("api", |e| e.requires::<ServiceX>())],
        ),
        &monitor,
    )
    .boot()
    .unwrap_err();

    assert!(matches!(err, Error::UnsatisfiableDependency { .. }));
    assert!(err.to_string().contains("'api'"), "got: {err}");
    assert!(log.with_prefix("initialize:").is_empty());
    assert!(monitor.contains(Level::Severe, "Error booting runtime"));
}

#[rstest]
#[case::mutual(&[
    ("a", (|e| e.requires::<ServiceY>().provides::<ServiceX>()) as Blueprint),
    ("b", (|e| e.requires::<ServiceX>().provides::<ServiceY>()) as Blueprint),
], &["a", "b"])]
#[case::self_loop(&[
    ("solo", (|e| e.requires::<ServiceX>().provides::<ServiceX>()) as Blueprint),
], &["solo"])]
fn test_cycles_are_reported(
    #[case] extensions: &[(&'static str, Blueprint)],
    #[case] participants: &[&str],
) {
    let log = EventLog::new();
    let err = builder(registry(&log, extensions), &RecordingMonitor::new())
        .boot()
        .unwrap_err();

    match err {
        Error::CyclicDependency { participants: found } => {
            for name in participants {
                assert!(found.iter().any(|f| f == name), "{name} missing from {found:?}");
            }
        }
        other => panic!("expected a cycle, got {other}"),
    }
    assert!(log.with_prefix("initialize:").is_empty());
}

#[test]
fn test_failing_start_stops_the_boot() {
    let log = EventLog::new();
    let monitor = RecordingMonitor::new();
    let err = builder(
        registry(
            &log,
            &[
                ("first", |e| e.fails_on(boot_test_utils::Hook::Start)),
                ("second", |e| e),
            ],
        ),
        &monitor,
    )
    .boot()
    .unwrap_err();

    assert!(matches!(err, Error::LifecycleHook { .. }));
    assert!(log.contains("prepare:second"));
    assert!(!log.contains("start:second"));
}

#[test]
fn test_duplicate_singleton_lists_both() {
    let mut registry = ServiceRegistry::new();
    registry
        .register::<dyn MonitorExtension>("console", || Box::new(RecordingMonitor::new()))
        .register::<dyn MonitorExtension>("remote", || Box::new(RecordingMonitor::new()));

    let err = ExtensionLoader::new(registry)
        .load_singleton::<dyn MonitorExtension>(false)
        .err()
        .unwrap();

    match err {
        Error::MultipleFound {
            implementations, ..
        } => assert_eq!(implementations, vec!["console", "remote"]),
        other => panic!("expected MultipleFound, got {other}"),
    }
}

#[test]
fn test_graph_reports_every_unsatisfied_point() {
    let log = EventLog::new();
    let extensions = vec![
        TestExtension::new("api", &log).requires::<ServiceX>().boxed(),
        TestExtension::new("web", &log).requires::<ServiceY>().boxed(),
    ];
    let context = ServiceExtensionContext::new(
        std::sync::Arc::new(RecordingMonitor::new()),
        boot_spi::Config::new(),
    );

    let err = DependencyGraph::build(extensions, &context).err().unwrap();

    match err {
        Error::UnsatisfiableDependency { points } => assert_eq!(points.len(), 2),
        other => panic!("expected UnsatisfiableDependency, got {other}"),
    }
}

// =============================================================================
// Monitors
// =============================================================================

#[test]
fn test_broadcast_survives_failing_monitor() {
    let journal = EventLog::new();
    let monitors = [
        RecordingMonitor::journaled("one", &journal).panicking(),
        RecordingMonitor::journaled("two", &journal),
        RecordingMonitor::journaled("three", &journal),
    ];
    let mut registry = registry(&EventLog::new(), &[("store", |e| e)]);
    for (id, monitor) in ["one", "two", "three"].into_iter().zip(monitors.clone()) {
        registry.register::<dyn MonitorExtension>(id, move || Box::new(monitor.clone()));
    }

    let runtime = RuntimeBuilder::new(registry)
        .environment(Vec::<(String, String)>::new())
        .boot()
        .unwrap();
    runtime.monitor().warning("disk almost full", &[]);

    let received: Vec<String> = journal
        .events()
        .into_iter()
        .filter(|event| event.ends_with(":disk almost full"))
        .collect();
    assert_eq!(
        received,
        vec![
            "one:disk almost full",
            "two:disk almost full",
            "three:disk almost full",
        ]
    );
    for monitor in &monitors {
        assert_eq!(monitor.messages_at(Level::Warning), vec!["disk almost full"]);
    }
}
