//! Application logger.
//!
//! # Data Flow
//! ```text
//! logger.warn("msg", context)
//!     → LogEntry (level, identifier?, timestamp, message, context)
//!     → ConsoleSink (rendered block)
//!     → Collector (breadcrumb, plus capture for error/warn)
//! ```
//!
//! # Design Decisions
//! - No operation returns an error or panics on bad input
//! - Collector forwarding needs both `collector.enabled` and
//!   `collector.logging_enabled`; debug and verbose additionally need the
//!   development environment
//! - Collaborators (console, collector, identifiers) are injected

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{AppConfig, Environment};
use crate::observability::collector::{
    Breadcrumb, CaptureScope, Collector, CollectorUser, NoopCollector, Severity,
};
use crate::observability::console::{ConsoleSink, StdConsole};
use crate::observability::entry::{LogContext, LogEntry, LogLevel};
use crate::observability::identifier::{IdGenerator, RandomIds};

/// Tag key carrying the console identifier on captured events.
pub const IDENTIFIER_TAG: &str = "log_identifier";

/// Synthetic exception captured for `error` calls.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LoggedError {
    pub message: String,
}

/// Flags the logger reads; fixed for the lifetime of a `Logger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerSettings {
    pub environment: Environment,
    pub collector_enabled: bool,
    pub collector_logging_enabled: bool,
    pub colors: bool,
}

impl LoggerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            environment: config.environment,
            collector_enabled: config.collector.enabled,
            collector_logging_enabled: config.collector.logging_enabled,
            colors: config.logging.console_colors,
        }
    }

    fn forwards(&self, level: LogLevel) -> bool {
        if !(self.collector_enabled && self.collector_logging_enabled) {
            return false;
        }
        match level {
            LogLevel::Debug | LogLevel::Verbose => self.environment.is_development(),
            LogLevel::Error | LogLevel::Warn | LogLevel::Log => true,
        }
    }
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Leveled logger that mirrors to the error-tracking collector.
#[derive(Clone)]
pub struct Logger {
    settings: LoggerSettings,
    console: Arc<dyn ConsoleSink>,
    collector: Arc<dyn Collector>,
    ids: Arc<dyn IdGenerator>,
}

impl Logger {
    pub fn new(settings: LoggerSettings) -> Self {
        Self {
            settings,
            console: Arc::new(StdConsole),
            collector: Arc::new(NoopCollector),
            ids: Arc::new(RandomIds::default()),
        }
    }

    /// Logger for the given configuration, writing to the process console.
    pub fn from_config(config: &AppConfig, collector: Arc<dyn Collector>) -> Self {
        Self::new(LoggerSettings::from_config(config)).with_collector(collector)
    }

    pub fn with_console(mut self, console: Arc<dyn ConsoleSink>) -> Self {
        self.console = console;
        self
    }

    pub fn with_collector(mut self, collector: Arc<dyn Collector>) -> Self {
        self.collector = collector;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn settings(&self) -> &LoggerSettings {
        &self.settings
    }

    pub fn error(&self, message: &str, context: impl Into<LogContext>) {
        self.emit(LogLevel::Error, message, context.into());
    }

    pub fn warn(&self, message: &str, context: impl Into<LogContext>) {
        self.emit(LogLevel::Warn, message, context.into());
    }

    pub fn log(&self, message: &str, context: impl Into<LogContext>) {
        self.emit(LogLevel::Log, message, context.into());
    }

    pub fn debug(&self, message: &str, context: impl Into<LogContext>) {
        self.emit(LogLevel::Debug, message, context.into());
    }

    pub fn verbose(&self, message: &str, context: impl Into<LogContext>) {
        self.emit(LogLevel::Verbose, message, context.into());
    }

    /// Direct access to the collector, bypassing the console.
    pub fn collector(&self) -> CollectorHandle<'_> {
        CollectorHandle {
            collector: self.collector.as_ref(),
            enabled: self.settings.collector_enabled,
        }
    }

    fn emit(&self, level: LogLevel, message: &str, context: LogContext) {
        let entry = LogEntry::new(level, message, context, self.ids.as_ref());
        self.console
            .write_entry(level, &entry.render(self.settings.colors));

        if self.settings.forwards(level) {
            self.forward(&entry);
        }
    }

    fn forward(&self, entry: &LogEntry) {
        let data = entry.context.fields().clone();
        self.collector.add_breadcrumb(
            Breadcrumb::new(entry.message.clone(), entry.level.severity())
                .category(format!("log.{}", entry.level))
                .data(data.clone()),
        );

        let scope = || {
            let scope = CaptureScope::default().extra(data.clone());
            match &entry.identifier {
                Some(id) => scope.tag(IDENTIFIER_TAG, id.clone()),
                None => scope,
            }
        };

        match entry.level {
            LogLevel::Error => {
                let error = LoggedError {
                    message: entry.message.clone(),
                };
                self.collector.capture_exception(&error, scope());
            }
            LogLevel::Warn => {
                self.collector
                    .capture_message(&entry.message, Severity::Warning, scope());
            }
            LogLevel::Log | LogLevel::Debug | LogLevel::Verbose => {}
        }
    }
}

/// Passthroughs to the collector; no-ops while the collector is disabled.
pub struct CollectorHandle<'a> {
    collector: &'a dyn Collector,
    enabled: bool,
}

impl CollectorHandle<'_> {
    pub fn capture_exception(&self, error: &dyn std::error::Error, context: impl Into<LogContext>) {
        if self.enabled {
            let extra = context.into().fields().clone();
            self.collector
                .capture_exception(error, CaptureScope::default().extra(extra));
        }
    }

    pub fn capture_message(&self, message: &str, severity: Severity, context: impl Into<LogContext>) {
        if self.enabled {
            let extra = context.into().fields().clone();
            self.collector
                .capture_message(message, severity, CaptureScope::default().extra(extra));
        }
    }

    pub fn set_context(&self, key: &str, context: Map<String, Value>) {
        if self.enabled {
            self.collector.set_context(key, context);
        }
    }

    pub fn set_user(&self, user: CollectorUser) {
        if self.enabled {
            self.collector.set_user(user);
        }
    }

    pub fn set_tag(&self, key: &str, value: &str) {
        if self.enabled {
            self.collector.set_tag(key, value);
        }
    }

    /// Severity defaults to info.
    pub fn add_breadcrumb(
        &self,
        message: &str,
        category: Option<&str>,
        severity: Option<Severity>,
        data: Option<Map<String, Value>>,
    ) {
        if !self.enabled {
            return;
        }
        let mut breadcrumb = Breadcrumb::new(message, severity.unwrap_or(Severity::Info));
        if let Some(category) = category {
            breadcrumb = breadcrumb.category(category);
        }
        if let Some(data) = data {
            breadcrumb = breadcrumb.data(data);
        }
        self.collector.add_breadcrumb(breadcrumb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::console::BufferConsole;
    use crate::observability::memory_collector::{MemoryCollector, RecordedCall};
    use serde_json::json;

    fn settings(environment: Environment, enabled: bool, logging: bool) -> LoggerSettings {
        LoggerSettings {
            environment,
            collector_enabled: enabled,
            collector_logging_enabled: logging,
            colors: false,
        }
    }

    fn harness(settings: LoggerSettings) -> (Logger, Arc<BufferConsole>, Arc<MemoryCollector>) {
        let console = Arc::new(BufferConsole::new());
        let collector = Arc::new(MemoryCollector::new());
        let logger = Logger::new(settings)
            .with_console(console.clone())
            .with_collector(collector.clone())
            .with_id_generator(Arc::new(|| "id42".to_string()));
        (logger, console, collector)
    }

    #[test]
    fn test_error_forwards_breadcrumb_and_exception() {
        let (logger, console, collector) = harness(settings(Environment::Production, true, true));
        logger.error("payment failed", json!({"order": 7}));

        let rendered = console.last().unwrap();
        assert!(rendered.contains(" [id42] ERROR payment failed\n"));

        let calls = collector.calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            RecordedCall::Breadcrumb(b) => {
                assert_eq!(b.message, "payment failed");
                assert_eq!(b.level, Severity::Error);
                assert_eq!(b.data.get("order"), Some(&json!(7)));
            }
            other => panic!("expected breadcrumb, got {:?}", other),
        }
        match &calls[1] {
            RecordedCall::Exception { message, scope } => {
                assert_eq!(message, "payment failed");
                assert_eq!(scope.tags.get(IDENTIFIER_TAG).map(String::as_str), Some("id42"));
            }
            other => panic!("expected exception, got {:?}", other),
        }
    }

    #[test]
    fn test_warn_captures_warning_message() {
        let (logger, _, collector) = harness(settings(Environment::Staging, true, true));
        logger.warn("disk almost full", ());

        let calls = collector.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(
            &calls[1],
            RecordedCall::Message { level: Severity::Warning, scope, .. }
                if scope.tags.get(IDENTIFIER_TAG).map(String::as_str) == Some("id42")
        ));
    }

    #[test]
    fn test_log_is_breadcrumb_only() {
        let (logger, _, collector) = harness(settings(Environment::Production, true, true));
        logger.log("user signed in", ());

        assert_eq!(collector.capture_count(), 0);
        let crumbs = collector.breadcrumbs();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].level, Severity::Info);
    }

    #[test]
    fn test_debug_and_verbose_only_forward_in_development() {
        let (logger, _, collector) = harness(settings(Environment::Production, true, true));
        logger.debug("cache miss", ());
        logger.verbose("sql", ());
        assert!(collector.is_empty());

        let (logger, _, collector) = harness(settings(Environment::Development, true, true));
        logger.debug("cache miss", ());
        logger.verbose("sql", ());
        assert_eq!(collector.breadcrumbs().len(), 2);
        assert_eq!(collector.capture_count(), 0);
    }

    #[test]
    fn test_any_flag_off_disables_forwarding() {
        for (enabled, logging) in [(false, false), (true, false), (false, true)] {
            let (logger, console, collector) =
                harness(settings(Environment::Development, enabled, logging));
            for level in LogLevel::ALL {
                logger.emit(level, "message", LogContext::new());
            }
            assert!(collector.is_empty());
            assert_eq!(console.entries().len(), 5);
        }
    }

    #[test]
    fn test_passthroughs_respect_enabled_flag() {
        let (logger, _, collector) = harness(settings(Environment::Production, false, false));
        logger.collector().set_tag("k", "v");
        assert!(collector.is_empty());

        let (logger, _, collector) = harness(settings(Environment::Production, true, false));
        let handle = logger.collector();
        handle.set_tag("k", "v");
        handle.set_user(CollectorUser {
            email: Some("a@example.com".into()),
            ..CollectorUser::default()
        });
        handle.add_breadcrumb("navigated", Some("ui"), None, None);
        handle.capture_message("manual", Severity::Info, json!({"x": 1}));

        let calls = collector.calls();
        assert_eq!(calls.len(), 4);
        assert!(matches!(&calls[0], RecordedCall::Tag { key, value } if key == "k" && value == "v"));
        match &calls[2] {
            RecordedCall::Breadcrumb(b) => {
                assert_eq!(b.category.as_deref(), Some("ui"));
                assert_eq!(b.level, Severity::Info);
            }
            other => panic!("expected breadcrumb, got {:?}", other),
        }
    }

    #[test]
    fn test_console_written_even_when_forwarding() {
        let (logger, console, _) = harness(settings(Environment::Development, true, true));
        for level in LogLevel::ALL {
            logger.emit(level, "m", LogContext::new());
        }
        let levels: Vec<_> = console.entries().into_iter().map(|(level, _)| level).collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
    }
}
