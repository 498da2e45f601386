//! Errors surfaced by the CLI commands

use cypress_migration::MigrationError;
use cypress_migration_common::{ErrorSeverity, Severity};
use cypress_migration_config::ConfigError;
use thiserror::Error;

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code when the project cannot be migrated at all
pub const CANNOT_MIGRATE_EXIT_CODE: i32 = 2;

/// Everything a command can fail with
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The migration itself failed
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// Writing output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Migration(e) if e.is_terminal() => CANNOT_MIGRATE_EXIT_CODE,
            _ => 1,
        }
    }
}

impl Severity for CliError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CliError::Config(e) => e.severity(),
            CliError::Migration(e) => e.severity(),
            CliError::Io(_) => ErrorSeverity::Error,
            CliError::Json(_) => ErrorSeverity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::from(MigrationError::NoApplicableSteps).exit_code(),
            CANNOT_MIGRATE_EXIT_CODE
        );
        assert_eq!(
            CliError::from(MigrationError::precondition("no project")).exit_code(),
            1
        );
        assert_eq!(
            CliError::from(std::io::Error::other("closed pipe")).exit_code(),
            1
        );
    }

    #[test]
    fn test_migration_message_is_transparent() {
        let error = CliError::from(MigrationError::NoApplicableSteps);
        assert_eq!(
            error.to_string(),
            MigrationError::NoApplicableSteps.to_string()
        );
    }
}
