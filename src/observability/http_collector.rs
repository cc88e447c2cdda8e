//! HTTP delivery of collector events.
//!
//! # Responsibilities
//! - Keep scope state (tags, user, named contexts, breadcrumb trail)
//! - Assemble JSON events for captured exceptions and messages
//! - POST events to the configured endpoint
//!
//! # Design Decisions
//! - Fire-and-forget: each event is sent on a spawned tokio task
//! - Delivery failures are reported to `tracing` and otherwise dropped
//! - Breadcrumb trail is bounded; oldest entries are evicted first

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::{CollectorConfig, Environment};
use crate::observability::collector::{
    error_chain, Breadcrumb, CaptureScope, Collector, CollectorUser, Severity,
};

/// Errors raised while constructing an [`HttpCollector`].
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("collector endpoint is not configured")]
    MissingEndpoint,

    #[error("invalid collector endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("failed to build collector client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Exception part of an event.
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    /// Display strings of the source chain, outermost first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

/// Wire format of one captured event.
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionPayload>,
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<CollectorUser>,
    pub contexts: Map<String, Value>,
    pub extra: Map<String, Value>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Default)]
struct ScopeState {
    tags: BTreeMap<String, String>,
    user: Option<CollectorUser>,
    contexts: Map<String, Value>,
    breadcrumbs: VecDeque<Breadcrumb>,
}

/// Collector client that ships events over HTTP.
pub struct HttpCollector {
    client: reqwest::Client,
    endpoint: Url,
    auth_token: Option<String>,
    environment: Environment,
    release: Option<String>,
    max_breadcrumbs: usize,
    scope: Mutex<ScopeState>,
}

impl HttpCollector {
    pub fn new(config: &CollectorConfig, environment: Environment) -> Result<Self, CollectorError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or(CollectorError::MissingEndpoint)?;
        let endpoint = Url::parse(endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            auth_token: config.auth_token.clone(),
            environment,
            release: config.release.clone(),
            max_breadcrumbs: config.max_breadcrumbs,
            scope: Mutex::new(ScopeState::default()),
        })
    }

    fn scope(&self) -> MutexGuard<'_, ScopeState> {
        self.scope.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Assemble an event from the current scope plus per-capture data.
    pub fn build_event(
        &self,
        level: Severity,
        message: Option<String>,
        exception: Option<ExceptionPayload>,
        capture: CaptureScope,
    ) -> EventPayload {
        let scope = self.scope();
        let mut tags = scope.tags.clone();
        tags.extend(capture.tags);

        EventPayload {
            event_id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now(),
            level,
            environment: self.environment,
            release: self.release.clone(),
            message,
            exception,
            tags,
            user: scope.user.clone(),
            contexts: scope.contexts.clone(),
            extra: capture.extra,
            breadcrumbs: scope.breadcrumbs.iter().cloned().collect(),
        }
    }

    fn dispatch(&self, event: EventPayload) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::debug!(event_id = %event.event_id, "No async runtime; dropping collector event");
                return;
            }
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&event);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let event_id = event.event_id;

        handle.spawn(async move {
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::debug!(
                        event_id = %event_id,
                        status = %response.status(),
                        "Collector rejected event"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(event_id = %event_id, error = %e, "Collector delivery failed");
                }
            }
        });
    }

    /// Current breadcrumb trail, oldest first.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.scope().breadcrumbs.iter().cloned().collect()
    }
}

impl Collector for HttpCollector {
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        if self.max_breadcrumbs == 0 {
            return;
        }
        let mut scope = self.scope();
        while scope.breadcrumbs.len() >= self.max_breadcrumbs {
            scope.breadcrumbs.pop_front();
        }
        scope.breadcrumbs.push_back(breadcrumb);
    }

    fn capture_exception(&self, error: &dyn std::error::Error, scope: CaptureScope) {
        let mut chain = error_chain(error);
        let value = chain.remove(0);
        let exception = ExceptionPayload {
            kind: "Error".to_string(),
            value,
            causes: chain,
        };
        let event = self.build_event(Severity::Error, None, Some(exception), scope);
        self.dispatch(event);
    }

    fn capture_message(&self, message: &str, level: Severity, scope: CaptureScope) {
        let event = self.build_event(level, Some(message.to_string()), None, scope);
        self.dispatch(event);
    }

    fn set_context(&self, key: &str, context: Map<String, Value>) {
        self.scope()
            .contexts
            .insert(key.to_string(), Value::Object(context));
    }

    fn set_user(&self, user: CollectorUser) {
        self.scope().user = Some(user);
    }

    fn set_tag(&self, key: &str, value: &str) {
        self.scope().tags.insert(key.to_string(), value.to_string());
    }
}
