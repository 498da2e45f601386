//! Error types for the settings system

use cypress_migration_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for settings operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings parsing failed
    #[error("Failed to parse settings: {source}")]
    ParseError { source: Box<figment::Error> },

    /// Settings validation failed
    #[error("Settings validation failed: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// Build a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

impl Severity for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigError::ParseError { .. } => ErrorSeverity::Error,
            ConfigError::ValidationError { .. } => ErrorSeverity::Error,
        }
    }
}
