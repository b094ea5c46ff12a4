//! Configuration validation module.
//!
//! Fails fast on invalid configuration rather than at runtime.

use crate::AppConfig;
use std::fmt;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { value: u16 },
    /// A count that must be at least one was zero.
    ZeroCount { name: String },
    /// Timeout or interval value must be positive.
    NonPositiveTimeout { name: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { value } => {
                write!(f, "Invalid server port: {} (must be 1-65535)", value)
            }
            Self::ZeroCount { name } => write!(f, "'{}' must be at least 1", name),
            Self::NonPositiveTimeout { name } => write!(f, "'{}' must be positive", name),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if config.server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                value: config.server.port,
            });
        }
        if config.server.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "server.request_timeout_secs".to_string(),
            });
        }

        let jobs = &config.jobs;
        if jobs.workers == 0 {
            errors.push(ConfigValidationError::ZeroCount {
                name: "jobs.workers".to_string(),
            });
        }
        if jobs.queue_size == 0 {
            errors.push(ConfigValidationError::ZeroCount {
                name: "jobs.queue_size".to_string(),
            });
        }
        if jobs.monitor_interval_ms == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "jobs.monitor_interval_ms".to_string(),
            });
        }
        if jobs.shutdown_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "jobs.shutdown_timeout_secs".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
