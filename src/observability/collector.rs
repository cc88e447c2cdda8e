//! Error-tracking collector abstraction.
//!
//! # Responsibilities
//! - Define the capability surface the logger needs from a collector client
//! - Provide a disabled (no-op) client and a factory driven by `AppConfig`
//!
//! # Design Decisions
//! - Every call is non-blocking from the caller's perspective
//! - Implementations swallow delivery failures; nothing propagates to callers
//! - The trait is object-safe so tests can swap in a recording client

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AppConfig;
use crate::observability::http_collector::{CollectorError, HttpCollector};

/// Collector-side severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Error,
    Warning,
    Info,
    Debug,
}

/// A trail entry attached to later captures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breadcrumb {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub level: Severity,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Breadcrumb {
    pub fn new(message: impl Into<String>, level: Severity) -> Self {
        Self {
            message: message.into(),
            category: None,
            level,
            data: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }
}

/// User attached to the collector scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Per-capture tags and extra data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureScope {
    pub tags: BTreeMap<String, String>,
    pub extra: Map<String, Value>,
}

impl CaptureScope {
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }
}

/// Minimal capability interface of an error-tracking client.
pub trait Collector: Send + Sync {
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb);

    fn capture_exception(&self, error: &dyn std::error::Error, scope: CaptureScope);

    fn capture_message(&self, message: &str, level: Severity, scope: CaptureScope);

    fn set_context(&self, key: &str, context: Map<String, Value>);

    fn set_user(&self, user: CollectorUser);

    fn set_tag(&self, key: &str, value: &str);
}

/// Collector used when error tracking is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCollector;

impl Collector for NoopCollector {
    fn add_breadcrumb(&self, _breadcrumb: Breadcrumb) {}

    fn capture_exception(&self, _error: &dyn std::error::Error, _scope: CaptureScope) {}

    fn capture_message(&self, _message: &str, _level: Severity, _scope: CaptureScope) {}

    fn set_context(&self, _key: &str, _context: Map<String, Value>) {}

    fn set_user(&self, _user: CollectorUser) {}

    fn set_tag(&self, _key: &str, _value: &str) {}
}

/// Build the collector client described by the configuration.
pub fn build_collector(config: &AppConfig) -> Result<Arc<dyn Collector>, CollectorError> {
    if !config.collector.enabled {
        return Ok(Arc::new(NoopCollector));
    }
    let collector = HttpCollector::new(&config.collector, config.environment)?;
    Ok(Arc::new(collector))
}

/// Flatten an error and its sources into display strings, outermost first.
pub fn error_chain(error: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn test_error_chain() {
        assert_eq!(error_chain(&Outer(Inner)), vec!["outer", "inner"]);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Severity::Warning).unwrap(), json!("warning"));
    }

    #[test]
    fn test_breadcrumb_skips_empty_fields() {
        let crumb = Breadcrumb::new("started", Severity::Info);
        let value = serde_json::to_value(&crumb).unwrap();
        assert!(value.get("category").is_none());
        assert!(value.get("data").is_none());
        assert_eq!(value["level"], json!("info"));
    }

    #[test]
    fn test_disabled_config_builds_noop() {
        let collector = build_collector(&AppConfig::default()).unwrap();
        collector.set_tag("k", "v");
        collector.add_breadcrumb(Breadcrumb::new("ignored", Severity::Debug));
    }
}
