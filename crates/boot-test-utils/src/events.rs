//! [`EventLog`]: ordered record of what fixtures observed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Append-only event list. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.lock().push(event.into());
    }

    /// Snapshot of every event so far, oldest first.
    pub fn events(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Events starting with `prefix`, e.g. `"initialize:"`.
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.lock().iter().any(|e| e == event)
    }

    /// Index of the first occurrence of `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.lock().iter().position(|e| e == event)
    }

    /// Panics unless `first` was recorded before `second`.
    pub fn assert_before(&self, first: &str, second: &str) {
        let a = self.position(first);
        let b = self.position(second);
        match (a, b) {
            (Some(a), Some(b)) => assert!(
                a < b,
                "expected '{first}' before '{second}', got {:?}",
                self.events()
            ),
            _ => panic!(
                "expected both '{first}' and '{second}' in {:?}",
                self.events()
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking monitor under test must not poison the log for the rest.
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
