//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to the logger and HTTP state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; nothing reads ambient globals afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::CollectorConfig;
pub use schema::Environment;
pub use schema::LoggingConfig;
pub use schema::ResponseConfig;
pub use schema::ServerConfig;
