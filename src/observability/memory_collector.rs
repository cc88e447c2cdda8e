//! In-process collector that records every call.
//!
//! Used by tests and local tooling to assert on what would have been sent.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::observability::collector::{
    error_chain, Breadcrumb, CaptureScope, Collector, CollectorUser, Severity,
};

/// One recorded collector call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Breadcrumb(Breadcrumb),
    Exception {
        message: String,
        scope: CaptureScope,
    },
    Message {
        message: String,
        level: Severity,
        scope: CaptureScope,
    },
    Context {
        key: String,
        context: Map<String, Value>,
    },
    User(CollectorUser),
    Tag {
        key: String,
        value: String,
    },
}

#[derive(Debug, Default)]
pub struct MemoryCollector {
    calls: Mutex<Vec<RecordedCall>>,
}

impl MemoryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn calls_mut(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: RecordedCall) {
        self.calls_mut().push(call);
    }

    /// Snapshot of every call so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls_mut().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.calls_mut().is_empty()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.calls_mut()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Breadcrumb(b) => Some(b.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of captured exceptions and messages.
    pub fn capture_count(&self) -> usize {
        self.calls_mut()
            .iter()
            .filter(|call| {
                matches!(call, RecordedCall::Exception { .. } | RecordedCall::Message { .. })
            })
            .count()
    }

    pub fn clear(&self) {
        self.calls_mut().clear();
    }
}

impl Collector for MemoryCollector {
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        self.record(RecordedCall::Breadcrumb(breadcrumb));
    }

    fn capture_exception(&self, error: &dyn std::error::Error, scope: CaptureScope) {
        self.record(RecordedCall::Exception {
            message: error_chain(error).join(": "),
            scope,
        });
    }

    fn capture_message(&self, message: &str, level: Severity, scope: CaptureScope) {
        self.record(RecordedCall::Message {
            message: message.to_string(),
            level,
            scope,
        });
    }

    fn set_context(&self, key: &str, context: Map<String, Value>) {
        self.record(RecordedCall::Context {
            key: key.to_string(),
            context,
        });
    }

    fn set_user(&self, user: CollectorUser) {
        self.record(RecordedCall::User(user));
    }

    fn set_tag(&self, key: &str, value: &str) {
        self.record(RecordedCall::Tag {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}
