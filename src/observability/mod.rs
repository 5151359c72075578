//! Diagnostics reporting for the bootstrap sequence.
//!
//! The sequencer never lets optional-module problems reach its control flow;
//! they are reported here instead. A [`DiagnosticsSink`] receives
//! `(module_id, severity, message)` tuples and may forward them anywhere the
//! host likes. [`TracingSink`] (the default) forwards to `tracing` events;
//! [`MemorySink`] captures them for assertions and diagnostic surfaces.

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, error, info, warn};

/// How serious a recorded diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Receiver for bootstrap diagnostics.
///
/// Implementations must be non-blocking and must not panic; the sequencer
/// calls them from its single-threaded startup path and does not inspect any
/// result.
pub trait DiagnosticsSink: Send + Sync {
    /// Record one diagnostic event attributed to `module_id`.
    fn record(&self, module_id: &str, severity: Severity, message: &str);
}

/// Default sink: forwards every event to the corresponding `tracing` macro.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, module_id: &str, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => debug!(module_id = %module_id, "{}", message),
            Severity::Info => info!(module_id = %module_id, "{}", message),
            Severity::Warning => warn!(module_id = %module_id, "{}", message),
            Severity::Error => error!(module_id = %module_id, "{}", message),
        }
    }
}

/// One captured diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub module_id: String,
    pub severity: Severity,
    pub message: String,
}

/// In-memory sink that captures events for later inspection.
///
/// Used by the crate's own tests and useful for exposing a "what went wrong
/// during startup" surface to the host.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events attributed to one module.
    pub fn events_for(&self, module_id: &str) -> Vec<DiagnosticEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.module_id == module_id)
            .collect()
    }

    /// Highest severity recorded, if anything was recorded at all.
    pub fn max_severity(&self) -> Option<Severity> {
        self.events().iter().map(|e| e.severity).max()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, module_id: &str, severity: Severity, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(DiagnosticEvent {
                module_id: module_id.to_string(),
                severity,
                message: message.to_string(),
            });
        }
    }
}
