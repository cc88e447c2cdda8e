//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that enabled features carry what they need (collector endpoint)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if config.server.max_body_size == 0 {
        errors.push(ValidationError::new("server.max_body_size", "must be greater than zero"));
    }

    let collector = &config.collector;
    if collector.enabled {
        match collector.endpoint.as_deref() {
            None => errors.push(ValidationError::new(
                "collector.endpoint",
                "required when collector.enabled is true",
            )),
            Some(endpoint) => {
                if let Err(e) = Url::parse(endpoint) {
                    errors.push(ValidationError::new(
                        "collector.endpoint",
                        format!("invalid URL: {}", e),
                    ));
                }
            }
        }
        if collector.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "collector.timeout_secs",
                "must be greater than zero",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.server.bind_address = "not-an-address".into();
        config.server.request_timeout_secs = 0;
        config.collector.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["server.bind_address", "server.request_timeout_secs", "collector.endpoint"]
        );
    }

    #[test]
    fn test_collector_endpoint_must_be_url() {
        let mut config = AppConfig::default();
        config.collector.enabled = true;
        config.collector.endpoint = Some("::nope".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("collector.endpoint: invalid URL"));
    }

    #[test]
    fn test_disabled_collector_needs_no_endpoint() {
        let mut config = AppConfig::default();
        config.collector.logging_enabled = true;
        assert!(validate_config(&config).is_ok());
    }
}
