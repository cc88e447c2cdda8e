//! Request validation and the validation-failure hook.
//!
//! # Data Flow
//! ```text
//! request body / query string
//!     → serde deserialization (axum Json / Query)
//!     → validator::Validate
//!     → Ok: handler runs with the typed value
//!     → Err: validation_hook → 422 ErrorEnvelope (issues per failed field)
//! ```
//!
//! # Design Decisions
//! - Handlers never build validation errors themselves; the extractors call the hook
//! - Issue order is deterministic (fields sorted, list indices ascending)
//! - Payloads that are not JSON at all keep their own status (400/413/415)
//! - Rejections follow the application's `EnvelopeSettings`, read from state via `FromRef`

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRef, FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::http::envelope::{build_error, EnvelopeSettings, ErrorEnvelope, ErrorOptions, Issue};
use crate::http::request::request_id_from_headers;
use crate::http::status::StatusKey;

pub const VALIDATION_MESSAGE: &str = "Validation failed";
pub const VALIDATION_ERROR_NAME: &str = "Validation Error";

/// Key validator uses for struct-level (schema) errors.
const ROOT_FIELD: &str = "__all__";

/// Why a request did not pass validation.
#[derive(Debug)]
pub enum ValidationFailure {
    /// Per-field errors from `validator`.
    Structured(ValidationErrors),
    /// The input could not be checked field by field (e.g. wrong JSON shape).
    Unstructured(String),
}

/// Turn a validation result into the handler input or a 422 error envelope.
///
/// `options` carries the request id and timestamp setting; name and issues are
/// filled in here.
pub fn validation_hook<T>(result: Result<T, ValidationFailure>, options: ErrorOptions) -> Result<T, ErrorEnvelope> {
    result.map_err(|failure| validation_envelope(&failure, options))
}

/// Error envelope for a validation failure.
pub fn validation_envelope(failure: &ValidationFailure, options: ErrorOptions) -> ErrorEnvelope {
    let issues = match failure {
        ValidationFailure::Structured(errors) => validation_issues(errors),
        ValidationFailure::Unstructured(reason) => {
            tracing::debug!(reason = %reason, "Request failed validation");
            Vec::new()
        }
    };
    let issues = if issues.is_empty() {
        vec![Issue::new(VALIDATION_MESSAGE)]
    } else {
        issues
    };

    build_error(
        StatusKey::UnprocessableEntity,
        VALIDATION_MESSAGE,
        options.name(VALIDATION_ERROR_NAME).issues(issues),
    )
}

/// Flatten nested validator errors into issues with dot-joined paths.
pub fn validation_issues(errors: &ValidationErrors) -> Vec<Issue> {
    let mut issues = Vec::new();
    collect_issues(errors, &[], &mut issues);
    issues
}

fn collect_issues(errors: &ValidationErrors, prefix: &[String], issues: &mut Vec<Issue>) {
    let mut fields: Vec<(String, &ValidationErrorsKind)> = errors
        .errors()
        .iter()
        .map(|(field, kind)| (field.to_string(), kind))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, kind) in fields {
        let mut path = prefix.to_vec();
        if field != ROOT_FIELD {
            path.push(field);
        }

        match kind {
            ValidationErrorsKind::Field(errors) => {
                for error in errors {
                    issues.push(field_issue(error, &path));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_issues(nested, &path, issues),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    let mut item_path = path.clone();
                    item_path.push(index.to_string());
                    collect_issues(nested, &item_path, issues);
                }
            }
        }
    }
}

fn field_issue(error: &ValidationError, path: &[String]) -> Issue {
    let message = match &error.message {
        Some(message) => message.to_string(),
        None => default_message(&error.code, &error.params),
    };
    let issue = Issue::new(message).code(error.code.to_string());
    if path.is_empty() {
        issue
    } else {
        issue.at(path.join("."))
    }
}

fn default_message(code: &str, params: &HashMap<Cow<'static, str>, Value>) -> String {
    let param = |name: &str| params.get(name).map(ToString::to_string);
    match code {
        "email" => "Invalid email address".to_string(),
        "url" => "Invalid URL".to_string(),
        "required" => "Required".to_string(),
        "length" => match (param("min"), param("max"), param("equal")) {
            (_, _, Some(equal)) => format!("Must be exactly {} characters", equal),
            (Some(min), Some(max), _) => format!("Must be between {} and {} characters", min, max),
            (Some(min), None, _) => format!("Must be at least {} characters", min),
            (None, Some(max), _) => format!("Must be at most {} characters", max),
            (None, None, _) => "Invalid length".to_string(),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {}", min, max),
            (Some(min), None) => format!("Must be greater than or equal to {}", min),
            (None, Some(max)) => format!("Must be less than or equal to {}", max),
            (None, None) => "Out of range".to_string(),
        },
        _ => "Invalid value".to_string(),
    }
}

/// JSON body extractor that runs `validator` and the validation hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    EnvelopeSettings: FromRef<S>,
{
    type Rejection = ErrorEnvelope;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let options = EnvelopeSettings::from_ref(state).error_options(request_id_from_headers(req.headers()));

        let result = match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => value
                .validate()
                .map(|_| value)
                .map_err(ValidationFailure::Structured),
            Err(JsonRejection::JsonDataError(e)) => Err(ValidationFailure::Unstructured(e.body_text())),
            Err(rejection) => return Err(malformed_request(rejection.status().as_u16(), rejection.body_text(), options)),
        };

        validation_hook(result, options).map(ValidatedJson)
    }
}

/// Query string extractor that runs `validator` and the validation hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    EnvelopeSettings: FromRef<S>,
{
    type Rejection = ErrorEnvelope;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let options = EnvelopeSettings::from_ref(state).error_options(request_id_from_headers(&parts.headers));

        let result = match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => value
                .validate()
                .map(|_| value)
                .map_err(ValidationFailure::Structured),
            Err(QueryRejection::FailedToDeserializeQueryString(e)) => {
                Err(ValidationFailure::Unstructured(e.body_text()))
            }
            Err(rejection) => return Err(malformed_request(rejection.status().as_u16(), rejection.body_text(), options)),
        };

        validation_hook(result, options).map(ValidatedQuery)
    }
}

fn malformed_request(status: u16, message: String, options: ErrorOptions) -> ErrorEnvelope {
    build_error(StatusKey::from_code(status), message, options)
}
