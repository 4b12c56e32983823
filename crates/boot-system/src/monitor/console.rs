//! Monitor writing to the console through `tracing`.

use boot_spi::{ErrorCause, Level, Monitor};

/// Emits monitor calls as `tracing` events under the `boot` target.
///
/// Calls below the configured level are dropped before reaching the
/// subscriber. Error causes are rendered into a `causes` field.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleMonitor {
    level: Level,
}

impl Default for ConsoleMonitor {
    fn default() -> Self {
        Self::new(Level::default_level())
    }
}

impl ConsoleMonitor {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    fn emit(&self, level: Level, message: &str, errors: &[ErrorCause<'_>]) {
        if !self.enabled(level) {
            return;
        }
        let causes = render_causes(errors);
        match (level, causes.is_empty()) {
            (Level::Severe, true) => tracing::error!(target: "boot", "{message}"),
            (Level::Severe, false) => {
                tracing::error!(target: "boot", causes = %causes, "{message}")
            }
            (Level::Warning, true) => tracing::warn!(target: "boot", "{message}"),
            (Level::Warning, false) => {
                tracing::warn!(target: "boot", causes = %causes, "{message}")
            }
            (Level::Info, true) => tracing::info!(target: "boot", "{message}"),
            (Level::Info, false) => tracing::info!(target: "boot", causes = %causes, "{message}"),
            (Level::Debug, true) => tracing::debug!(target: "boot", "{message}"),
            (Level::Debug, false) => tracing::debug!(target: "boot", causes = %causes, "{message}"),
        }
    }
}

impl Monitor for ConsoleMonitor {
    fn severe(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.emit(Level::Severe, message, errors);
    }

    fn warning(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.emit(Level::Warning, message, errors);
    }

    fn info(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.emit(Level::Info, message, errors);
    }

    fn debug(&self, message: &str, errors: &[ErrorCause<'_>]) {
        self.emit(Level::Debug, message, errors);
    }

    fn severe_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        if self.enabled(Level::Severe) {
            self.severe(&message(), errors);
        }
    }

    fn warning_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        if self.enabled(Level::Warning) {
            self.warning(&message(), errors);
        }
    }

    fn info_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        if self.enabled(Level::Info) {
            self.info(&message(), errors);
        }
    }

    fn debug_with(&self, message: &dyn Fn() -> String, errors: &[ErrorCause<'_>]) {
        if self.enabled(Level::Debug) {
            self.debug(&message(), errors);
        }
    }
}

/// Each cause followed by its `source()` chain, joined with `: `.
fn render_causes(errors: &[ErrorCause<'_>]) -> String {
    let mut rendered = Vec::new();
    for error in errors {
        let mut chain = vec![error.to_string()];
        let mut source = error.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }
        rendered.push(chain.join(": "));
    }
    rendered.join("; ")
}
