//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment environment the process runs in.
    pub environment: Environment,

    /// HTTP server settings (bind address, limits).
    pub server: ServerConfig,

    /// Framework diagnostics and console rendering.
    pub logging: LoggingConfig,

    /// External error-tracking collector.
    pub collector: CollectorConfig,

    /// Response envelope defaults.
    pub response: ResponseConfig,
}

impl AppConfig {
    /// Whether `error.stack` diagnostics may be sent to clients.
    pub fn expose_diagnostics(&self) -> bool {
        self.response
            .expose_diagnostics
            .unwrap_or(!self.environment.is_production())
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive for framework diagnostics.
    pub filter: String,

    /// Emit ANSI colors on the application console.
    pub console_colors: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "api_starter=info,tower_http=info".to_string(),
            console_colors: true,
        }
    }
}

/// Error-tracking collector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Master switch for the collector client.
    pub enabled: bool,

    /// Mirror logger calls to the collector (requires `enabled`).
    pub logging_enabled: bool,

    /// Event ingestion endpoint.
    pub endpoint: Option<String>,

    /// Bearer token sent with every event.
    pub auth_token: Option<String>,

    /// Release identifier attached to events.
    pub release: Option<String>,

    /// Breadcrumbs kept in the trail attached to captured events.
    pub max_breadcrumbs: usize,

    /// Delivery timeout in seconds.
    pub timeout_secs: u64,
}

impl CollectorConfig {
    /// True when logger calls should be mirrored to the collector.
    pub fn forwards_logs(&self) -> bool {
        self.enabled && self.logging_enabled
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            logging_enabled: false,
            endpoint: None,
            auth_token: None,
            release: None,
            max_breadcrumbs: 100,
            timeout_secs: 5,
        }
    }
}

/// Response envelope configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Attach `timestamp` to envelopes built by handlers.
    pub include_timestamp: bool,

    /// Send `error.stack` diagnostics to clients.
    /// Unset means "everywhere except production".
    pub expose_diagnostics: Option<bool>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            include_timestamp: true,
            expose_diagnostics: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("environment = \"production\"").unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert!(!config.collector.enabled);
        assert!(config.response.include_timestamp);
        assert!(!config.expose_diagnostics());
    }

    #[test]
    fn test_forwards_logs_requires_both_flags() {
        let mut collector = CollectorConfig::default();
        collector.logging_enabled = true;
        assert!(!collector.forwards_logs());
        collector.enabled = true;
        assert!(collector.forwards_logs());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Development".parse::<Environment>().unwrap(), Environment::Development);
        assert!("qa".parse::<Environment>().is_err());
    }
}
