//! Log levels, structured context and console rendering.
//!
//! # Responsibilities
//! - Define the closed set of application log levels
//! - Carry per-call structured context (string keys, JSON values)
//! - Render a `LogEntry` into a human-oriented console block
//!
//! # Design Decisions
//! - Field order on the console is fixed: timestamp, identifier, level, message, context
//! - Identifier presence depends only on the level
//! - Context serialization failures degrade to a placeholder, never an error

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::observability::collector::Severity;
use crate::observability::color::{hex_to_ansi, Ground, DIM, RESET};
use crate::observability::identifier::IdGenerator;

/// Application log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Error,
    Warn,
    Log,
    Debug,
    Verbose,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Log,
        LogLevel::Debug,
        LogLevel::Verbose,
    ];

    /// Whether entries at this level get a correlation identifier.
    pub fn carries_identifier(self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Warn | LogLevel::Verbose)
    }

    /// Collector severity for this level.
    pub fn severity(self) -> Severity {
        match self {
            LogLevel::Error => Severity::Error,
            LogLevel::Warn => Severity::Warning,
            LogLevel::Log => Severity::Info,
            LogLevel::Debug | LogLevel::Verbose => Severity::Debug,
        }
    }

    /// Display color as an RGB hex triplet.
    pub fn color(self) -> &'static str {
        match self {
            LogLevel::Error => "#ef4444",
            LogLevel::Warn => "#f59e0b",
            LogLevel::Log => "#22c55e",
            LogLevel::Debug => "#a855f7",
            LogLevel::Verbose => "#06b6d4",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Log => "log",
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "verbose",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Log => "LOG",
            LogLevel::Debug => "DEBUG",
            LogLevel::Verbose => "VERBOSE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured context attached to a log call.
///
/// Build it from a `serde_json::Value` object, a `Map`, any `Serialize` type
/// via [`LogContext::from_serialize`], or `()` for no context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
    fields: Map<String, Value>,
    failure: Option<String>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize any value into context.
    ///
    /// Objects become the context map, `null` is empty, and any other value
    /// is stored under `"value"`. A serialization failure is remembered and
    /// rendered as a placeholder.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::from(value),
            Err(e) => Self {
                fields: Map::new(),
                failure: Some(e.to_string()),
            },
        }
    }

    /// Add one field. A value that fails to serialize poisons the context
    /// the same way [`LogContext::from_serialize`] does.
    pub fn with<T: Serialize + ?Sized>(mut self, key: impl Into<String>, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.fields.insert(key.into(), value);
            }
            Err(e) => self.failure = Some(e.to_string()),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.failure.is_none()
    }

    /// The serializable part of the context.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Pretty-printed JSON block, or `None` when there is nothing to show.
    pub fn render(&self) -> Option<String> {
        if let Some(reason) = &self.failure {
            return Some(unserializable(reason));
        }
        if self.fields.is_empty() {
            return None;
        }
        Some(match serde_json::to_string_pretty(&self.fields) {
            Ok(json) => json,
            Err(e) => unserializable(&e.to_string()),
        })
    }
}

fn unserializable(reason: &str) -> String {
    format!("[Unserializable context: {}]", reason)
}

impl From<()> for LogContext {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<Map<String, Value>> for LogContext {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            failure: None,
        }
    }
}

impl From<Value> for LogContext {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::from(fields),
            Value::Null => Self::default(),
            other => {
                let mut fields = Map::new();
                fields.insert("value".to_string(), other);
                Self::from(fields)
            }
        }
    }
}

/// One application log event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub identifier: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub context: LogContext,
}

impl LogEntry {
    pub fn new(
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
        ids: &dyn IdGenerator,
    ) -> Self {
        Self {
            level,
            identifier: level.carries_identifier().then(|| ids.next_id()),
            timestamp: Utc::now(),
            message: message.into(),
            context,
        }
    }

    /// Timestamp formatted as an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`).
    pub fn http_date(&self) -> String {
        self.timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// Render the console block for this entry.
    pub fn render(&self, colors: bool) -> String {
        let mut out = String::new();

        if colors {
            out.push_str(DIM);
            out.push_str(&self.http_date());
            out.push_str(RESET);
        } else {
            out.push_str(&self.http_date());
        }

        if let Some(id) = &self.identifier {
            out.push_str(" [");
            out.push_str(id);
            out.push(']');
        }

        out.push(' ');
        if colors {
            out.push_str(&hex_to_ansi(self.level.color(), Ground::Foreground));
            out.push_str(self.level.tag());
            out.push_str(RESET);
        } else {
            out.push_str(self.level.tag());
        }

        out.push(' ');
        out.push_str(&self.message);

        if let Some(block) = self.context.render() {
            out.push('\n');
            out.push_str(&block);
        }

        out
    }
}
