//! API starter library: response envelopes, validation, and a leveled
//! logger that mirrors to an error-tracking collector.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod notes;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{Application, Shutdown, ShutdownSignal};
pub use observability::Logger;
