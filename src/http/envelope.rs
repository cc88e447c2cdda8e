//! Response envelopes.
//!
//! # Responsibilities
//! - Build the success and error JSON bodies every handler returns
//! - Provide total predicates that tell the two shapes apart
//! - Turn envelopes into axum responses with the matching status line
//!
//! # Design Decisions
//! - The `success` discriminant is a type-level constant, so a success
//!   envelope can never serialize `false` (and vice versa)
//! - `data` is dropped on NO_CONTENT even when the caller supplies it
//! - Optional fields are omitted from the JSON, never sent as `null`
//! - `issues` is never empty; it defaults to one issue built from the message

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::http::status::StatusKey;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";
pub const DEFAULT_ERROR_NAME: &str = "Error";

/// Boolean fixed at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flag<const B: bool>;

impl<const B: bool> Serialize for Flag<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(B)
    }
}

impl<'de, const B: bool> Deserialize<'de> for Flag<B> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = bool::deserialize(deserializer)?;
        if value == B {
            Ok(Flag)
        } else {
            let expected: &str = if B { "true" } else { "false" };
            Err(de::Error::invalid_value(Unexpected::Bool(value), &expected))
        }
    }
}

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEnvelope<T = Value> {
    success: Flag<true>,
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Body of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    success: Flag<false>,
    pub error: ErrorBody,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub name: String,
    pub issues: Vec<Issue>,
    /// Diagnostics for non-production environments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// One problem reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Issue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            code: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Either envelope shape, e.g. for clients parsing a response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T = Value> {
    Success(SuccessEnvelope<T>),
    Error(ErrorEnvelope),
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error(_))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Envelope::Success(envelope) => envelope.status_code,
            Envelope::Error(envelope) => envelope.status_code,
        }
    }
}

/// Options for [`build_success`].
#[derive(Debug, Clone)]
pub struct SuccessOptions<T> {
    pub status: StatusKey,
    pub message: Option<String>,
    pub data: Option<T>,
    pub include_timestamp: bool,
    pub request_id: Option<String>,
}

impl<T> Default for SuccessOptions<T> {
    fn default() -> Self {
        Self {
            status: StatusKey::Ok,
            message: None,
            data: None,
            include_timestamp: true,
            request_id: None,
        }
    }
}

impl<T> SuccessOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusKey) -> Self {
        self.status = status;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn include_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn request_id(mut self, request_id: impl Into<Option<String>>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

/// Options for [`build_error`].
#[derive(Debug, Clone)]
pub struct ErrorOptions {
    pub name: Option<String>,
    pub issues: Option<Vec<Issue>>,
    pub include_timestamp: bool,
    pub request_id: Option<String>,
    pub stack: Option<String>,
}

impl Default for ErrorOptions {
    fn default() -> Self {
        Self {
            name: None,
            issues: None,
            include_timestamp: true,
            request_id: None,
            stack: None,
        }
    }
}

impl ErrorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = Some(issues);
        self
    }

    pub fn include_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn request_id(mut self, request_id: impl Into<Option<String>>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn stack(mut self, stack: impl Into<Option<String>>) -> Self {
        self.stack = stack.into();
        self
    }
}

/// Application-wide envelope settings.
///
/// Extractors reach it through `FromRef`, so rejections built outside a
/// handler follow the same settings as handler envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeSettings {
    pub include_timestamp: bool,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            include_timestamp: true,
        }
    }
}

impl EnvelopeSettings {
    pub fn error_options(&self, request_id: Option<String>) -> ErrorOptions {
        ErrorOptions::new()
            .include_timestamp(self.include_timestamp)
            .request_id(request_id)
    }
}

/// Current time as ISO-8601 with millisecond precision (`2024-01-31T12:00:00.000Z`).
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Default message for a success status.
pub fn default_success_message(status: StatusKey) -> &'static str {
    match status {
        StatusKey::Ok => DEFAULT_SUCCESS_MESSAGE,
        StatusKey::Created => "Resource created successfully",
        StatusKey::Accepted => "Request accepted for processing",
        StatusKey::NoContent => DEFAULT_SUCCESS_MESSAGE,
        _ => DEFAULT_SUCCESS_MESSAGE,
    }
}

/// Build a success envelope.
pub fn build_success<T>(options: SuccessOptions<T>) -> SuccessEnvelope<T> {
    let SuccessOptions {
        status,
        message,
        data,
        include_timestamp,
        request_id,
    } = options;

    SuccessEnvelope {
        success: Flag,
        message: message.unwrap_or_else(|| default_success_message(status).to_string()),
        status_code: status.code(),
        data: if status == StatusKey::NoContent { None } else { data },
        timestamp: include_timestamp.then(now_iso8601),
        request_id,
    }
}

/// Build an error envelope.
pub fn build_error(status: StatusKey, message: impl Into<String>, options: ErrorOptions) -> ErrorEnvelope {
    let ErrorOptions {
        name,
        issues,
        include_timestamp,
        request_id,
        stack,
    } = options;

    let issues = match issues {
        Some(issues) if !issues.is_empty() => issues,
        _ => vec![Issue::new(message)],
    };
    let name = name.unwrap_or_else(|| {
        status
            .reason_phrase()
            .unwrap_or(DEFAULT_ERROR_NAME)
            .to_string()
    });

    ErrorEnvelope {
        success: Flag,
        error: ErrorBody { name, issues, stack },
        status_code: status.code(),
        timestamp: include_timestamp.then(now_iso8601),
        request_id,
    }
}

/// True when `value` is an object whose `success` field is `false`.
pub fn is_error(value: &Value) -> bool {
    matches!(value.get("success"), Some(Value::Bool(false)))
}

/// True when `value` is an object whose `success` field is `true`.
pub fn is_success(value: &Value) -> bool {
    matches!(value.get("success"), Some(Value::Bool(true)))
}

fn response_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl<T: Serialize> IntoResponse for SuccessEnvelope<T> {
    fn into_response(self) -> Response {
        let status = response_status(self.status_code);
        // 204 responses cannot carry a body.
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (response_status(self.status_code), Json(self)).into_response()
    }
}
