//! Status keys used by the envelope builder.

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use thiserror::Error;

/// Symbolic HTTP status selected by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKey {
    Ok,
    Created,
    Accepted,
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    RequestTimeout,
    Conflict,
    PayloadTooLarge,
    UnsupportedMediaType,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    /// Any other numeric status.
    Other(u16),
}

const NAMED: [(StatusKey, &str, u16); 19] = [
    (StatusKey::Ok, "OK", 200),
    (StatusKey::Created, "CREATED", 201),
    (StatusKey::Accepted, "ACCEPTED", 202),
    (StatusKey::NoContent, "NO_CONTENT", 204),
    (StatusKey::BadRequest, "BAD_REQUEST", 400),
    (StatusKey::Unauthorized, "UNAUTHORIZED", 401),
    (StatusKey::Forbidden, "FORBIDDEN", 403),
    (StatusKey::NotFound, "NOT_FOUND", 404),
    (StatusKey::MethodNotAllowed, "METHOD_NOT_ALLOWED", 405),
    (StatusKey::RequestTimeout, "REQUEST_TIMEOUT", 408),
    (StatusKey::Conflict, "CONFLICT", 409),
    (StatusKey::PayloadTooLarge, "PAYLOAD_TOO_LARGE", 413),
    (StatusKey::UnsupportedMediaType, "UNSUPPORTED_MEDIA_TYPE", 415),
    (StatusKey::UnprocessableEntity, "UNPROCESSABLE_ENTITY", 422),
    (StatusKey::TooManyRequests, "TOO_MANY_REQUESTS", 429),
    (StatusKey::InternalServerError, "INTERNAL_SERVER_ERROR", 500),
    (StatusKey::BadGateway, "BAD_GATEWAY", 502),
    (StatusKey::ServiceUnavailable, "SERVICE_UNAVAILABLE", 503),
    (StatusKey::GatewayTimeout, "GATEWAY_TIMEOUT", 504),
];

impl StatusKey {
    /// Numeric HTTP status.
    pub fn code(self) -> u16 {
        match self {
            StatusKey::Other(code) => code,
            named => NAMED
                .iter()
                .find(|(key, _, _)| *key == named)
                .map(|(_, _, code)| *code)
                .unwrap_or(500),
        }
    }

    /// SCREAMING_SNAKE_CASE name, `None` for `Other`.
    pub fn name(self) -> Option<&'static str> {
        NAMED
            .iter()
            .find(|(key, _, _)| *key == self)
            .map(|(_, name, _)| *name)
    }

    /// Standard reason phrase, e.g. "Unprocessable Entity".
    pub fn reason_phrase(self) -> Option<&'static str> {
        StatusCode::from_u16(self.code())
            .ok()
            .and_then(|status| status.canonical_reason())
    }

    /// Status for the response line; falls back to 500 for codes outside 100..=999.
    pub fn status_code(self) -> StatusCode {
        StatusCode::from_u16(self.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn from_code(code: u16) -> Self {
        NAMED
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(key, _, _)| *key)
            .unwrap_or(StatusKey::Other(code))
    }
}

impl From<StatusCode> for StatusKey {
    fn from(status: StatusCode) -> Self {
        Self::from_code(status.as_u16())
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status key '{0}'")]
pub struct UnknownStatusKey(pub String);

impl FromStr for StatusKey {
    type Err = UnknownStatusKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMED
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(key, _, _)| *key)
            .ok_or_else(|| UnknownStatusKey(s.to_string()))
    }
}
