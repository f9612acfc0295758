//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the target URL
//! - Validate value ranges (timeouts > 0, rotation size > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ProxyConfig;
use crate::routing::TargetError;

/// A single semantic problem in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Target(#[from] TargetError),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("invalid log level '{0}'")]
    LogLevel(String),
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.target() {
        errors.push(ValidationError::Target(e));
    }

    let transport = &config.transport;
    let positive = [
        ("transport.dial_timeout_secs", transport.dial_timeout_secs),
        ("transport.tls_handshake_timeout_secs", transport.tls_handshake_timeout_secs),
        ("transport.response_header_timeout_secs", transport.response_header_timeout_secs),
        ("transport.idle_timeout_secs", transport.idle_timeout_secs),
        ("logging.max_size_mb", config.logging.max_size_mb),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::LogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
