//! Error types for the migration workflow

use crate::steps::MigrationStep;
use cypress_migration_common::{CommonError, ErrorSeverity, Severity};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for migration operations
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Errors raised by the migration session and its components
///
/// A watcher that cannot observe its directory is not an error: the failure
/// is reported in the status snapshot instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MigrationError {
    /// The session is missing something it needs before it can run
    #[error("Migration precondition failed: {message}")]
    Precondition {
        /// What was missing
        message: String,
    },

    /// No migration step applies to this project
    #[error("Impossible to initialize a migration. No steps fit the configuration of this project")]
    NoApplicableSteps,

    /// The requested step is not part of this migration
    #[error("Cannot move to step '{step}': it is not part of this migration")]
    InvalidTransition {
        /// The rejected step
        step: MigrationStep,
    },

    /// Reading or parsing the legacy config failed
    #[error("Failed to read legacy config {}: {source}", path.display())]
    ConfigRead {
        /// Path of the legacy config file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: Box<MigrationError>,
    },

    /// The legacy config parsed but is not a JSON object
    #[error("Legacy config must be an object, found {found}")]
    InvalidLegacyConfig {
        /// JSON type that was found instead
        found: String,
    },

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Glob compilation or file listing failed
    #[error(transparent)]
    Common(#[from] CommonError),

    /// The filesystem watcher could not be created
    #[error("Watch error: {message}")]
    Watch {
        /// Error message
        message: String,
    },
}

impl MigrationError {
    /// Build a [`MigrationError::Precondition`]
    pub fn precondition(message: impl Into<String>) -> Self {
        MigrationError::Precondition {
            message: message.into(),
        }
    }

    /// Build a [`MigrationError::Watch`]
    pub fn watch(message: impl Into<String>) -> Self {
        MigrationError::Watch {
            message: message.into(),
        }
    }

    /// Whether the session cannot go on after this error
    pub fn is_terminal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}

impl Severity for MigrationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            MigrationError::Precondition { .. } => ErrorSeverity::Error,
            MigrationError::NoApplicableSteps => ErrorSeverity::Critical,
            MigrationError::InvalidTransition { .. } => ErrorSeverity::Warning,
            MigrationError::ConfigRead { .. } => ErrorSeverity::Critical,
            MigrationError::InvalidLegacyConfig { .. } => ErrorSeverity::Critical,
            MigrationError::Io(_) => ErrorSeverity::Error,
            MigrationError::Json(_) => ErrorSeverity::Error,
            MigrationError::Yaml(_) => ErrorSeverity::Error,
            MigrationError::Common(e) => e.severity(),
            MigrationError::Watch { .. } => ErrorSeverity::Error,
        }
    }
}
