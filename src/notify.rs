//! Status notifications emitted while the graph is edited and validated.
//!
//! Notifications are purely observational: a status bar or log consumes them,
//! but nothing in the graph core depends on their delivery.

use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Ok => "ok",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// A single (source, message, severity) tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub source: String,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.source, self.message)
    }
}

/// Receives notifications from the graph. Injected through
/// [`GraphContext`](crate::config::GraphContext).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);

    fn ok(&self, source: &str, message: &str) {
        self.emit(source, message, Severity::Ok);
    }

    fn info(&self, source: &str, message: &str) {
        self.emit(source, message, Severity::Info);
    }

    fn warning(&self, source: &str, message: &str) {
        self.emit(source, message, Severity::Warning);
    }

    fn error(&self, source: &str, message: &str) {
        self.emit(source, message, Severity::Error);
    }

    fn emit(&self, source: &str, message: &str, severity: Severity) {
        self.notify(Notification {
            source: source.to_string(),
            message: message.to_string(),
            severity,
        });
    }
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Ok | Severity::Info => log::info!("{}: {}", n.source, n.message),
            Severity::Warning => log::warn!("{}: {}", n.source, n.message),
            Severity::Error => log::error!("{}: {}", n.source, n.message),
        }
    }
}

/// Keeps every notification in memory, e.g. to back a status panel.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of all notifications received so far.
    pub fn records(&self) -> Vec<Notification> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// The most recent notification for `source`, if any.
    pub fn last_for(&self, source: &str) -> Option<Notification> {
        self.records
            .lock()
            .ok()?
            .iter()
            .rev()
            .find(|n| n.source == source)
            .cloned()
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        log::trace!("{}", notification);
        if let Ok(mut records) = self.records.lock() {
            records.push(notification);
        }
    }
}
