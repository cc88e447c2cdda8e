//! Console sinks for rendered log entries.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::observability::entry::LogLevel;

/// Destination for rendered console entries.
pub trait ConsoleSink: Send + Sync {
    fn write_entry(&self, level: LogLevel, rendered: &str);
}

/// Process stdout, with the error level routed to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl ConsoleSink for StdConsole {
    fn write_entry(&self, level: LogLevel, rendered: &str) {
        // A closed stdout must not take the process down.
        let _ = match level {
            LogLevel::Error => writeln!(std::io::stderr().lock(), "{}", rendered),
            _ => writeln!(std::io::stdout().lock(), "{}", rendered),
        };
    }
}

/// Keeps rendered entries in memory.
#[derive(Debug, Default)]
pub struct BufferConsole {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent rendered entry.
    pub fn last(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|(_, rendered)| rendered.clone())
    }
}

impl ConsoleSink for BufferConsole {
    fn write_entry(&self, level: LogLevel, rendered: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, rendered.to_string()));
    }
}
