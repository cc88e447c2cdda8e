//! HTTP surface: envelopes, validation, errors and the server.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (middleware: request id, trace, panic capture, timeout)
//!     → request.rs (request id extractor)
//!     → validation.rs (ValidatedJson / ValidatedQuery → 422 envelope)
//!     → handler (notes, health)
//!     → envelope.rs / pagination.rs (success body)
//!     → error.rs (ApiError → error body)
//!     → Send to client
//! ```

pub mod envelope;
pub mod error;
pub mod pagination;
pub mod request;
pub mod server;
pub mod status;
pub mod validation;

pub use envelope::{build_error, build_success, Envelope, ErrorEnvelope, ErrorOptions, Issue, SuccessEnvelope, SuccessOptions};
pub use error::ApiError;
pub use pagination::{build_paginated, Page, PaginatedOptions, Pagination, PaginationMeta};
pub use request::{RequestId, X_REQUEST_ID};
pub use server::{apply_middleware, AppState, HttpServer};
pub use status::StatusKey;
pub use validation::{validation_hook, ValidatedJson, ValidatedQuery, ValidationFailure};
