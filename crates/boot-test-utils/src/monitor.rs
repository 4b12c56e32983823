//! [`RecordingMonitor`]: a monitor that remembers what it was told.

use std::sync::{Arc, Mutex, PoisonError};

use boot_spi::{ErrorCause, Level, Monitor, MonitorExtension};

use crate::events::EventLog;

/// One captured monitor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
    /// `to_string()` of every attached error cause.
    pub causes: Vec<String>,
}

/// Captures every call. Clones share the same records, so a test can keep
/// one handle and give the other to the system under test.
#[derive(Debug, Clone, Default)]
pub struct RecordingMonitor {
    records: Arc<Mutex<Vec<Record>>>,
    journal: Option<(String, EventLog)>,
    panics: bool,
}

impl RecordingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also append `"<name>:<message>"` to a log shared with other monitors.
    pub fn journaled(name: impl Into<String>, log: &EventLog) -> Self {
        Self {
            journal: Some((name.into(), log.clone())),
            ..Self::default()
        }
    }

    /// Panic after recording each call.
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages of every level, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .map(|r| r.message)
            .collect()
    }

    pub fn contains(&self, level: Level, fragment: &str) -> bool {
        self.records()
            .iter()
            .any(|r| r.level == level && r.message.contains(fragment))
    }

    fn capture(&self, level: Level, message: &str, errors: &[ErrorCause<'_>]) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Record {
                level,
                message: message.to_string(),
                causes: errors.iter().map(ToString::to_string).collect(),
            });
        if let Some((name, log)) = &self.journal {
            log.record(format!("{name}:{message}"));
        }
        if self.panics {
            panic!("recording monitor told to fail on '{message}'");
        }
    }
}

impl Monitor for RecordingMonitor {
    fn severe(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.capture(Level::Severe, message, errors);
    }

    fn warning(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.capture(Level::Warning, message, errors);
    }

    fn info(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.capture(Level::Info, message, errors);
    }

    fn debug(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.capture(Level::Debug, message, errors);
    }
}

/// Registering a `RecordingMonitor` as a monitor extension hands out
/// handles sharing its records.
impl MonitorExtension for RecordingMonitor {
    fn monitor(&self) -> Arc<dyn Monitor> {
        Arc::new(self.clone())
    }
}
