//! Error types shared by the migration crates
//!
//! Domain crates define their own error enums and implement [`Severity`] so
//! callers can decide how loudly to report a failure.

use std::fmt;
use std::io;
use thiserror::Error as ThisError;

/// Severity levels for error classification
///
/// - **Warning**: the operation can proceed, but the user should know.
/// - **Error**: the operation failed; the session stays usable.
/// - **Critical**: the migration cannot continue.
///
/// ```rust
/// use cypress_migration_common::ErrorSeverity;
///
/// let stalled = ErrorSeverity::Warning;
/// assert_ne!(stalled, ErrorSeverity::Critical);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,
    /// Operation failed but the session can continue
    Error,
    /// The migration cannot continue
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Trait for error types that have severity levels
///
/// ```rust
/// use cypress_migration_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum StepError {
///     Empty,
///     Unknown,
/// }
///
/// impl Severity for StepError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             StepError::Empty => ErrorSeverity::Critical,
///             StepError::Unknown => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert_eq!(StepError::Empty.severity(), ErrorSeverity::Critical);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Infrastructure errors raised by the common utilities
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum CommonError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A glob pattern could not be compiled
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob {
        /// The offending pattern
        pattern: String,
        /// Why it was rejected
        message: String,
    },

    /// A path that was expected to be a directory is something else
    #[error("Path is not a directory: {path}")]
    NotADirectory {
        /// The offending path
        path: String,
    },

    /// Part of a directory tree could not be read
    #[error("Cannot read {path}: {message}")]
    Walk {
        /// Directory being listed
        path: String,
        /// What went wrong below it
        message: String,
    },

    /// A listing found more files than it may return
    #[error("More than {limit} matching files under {path}")]
    TooManyFiles {
        /// Directory being listed
        path: String,
        /// The configured maximum
        limit: usize,
    },
}

impl CommonError {
    /// Build an [`CommonError::InvalidGlob`]
    pub fn invalid_glob(pattern: impl Into<String>, message: impl fmt::Display) -> Self {
        CommonError::InvalidGlob {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }
}

impl Severity for CommonError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CommonError::Io(_) => ErrorSeverity::Error,
            CommonError::InvalidGlob { .. } => ErrorSeverity::Error,
            CommonError::NotADirectory { .. } => ErrorSeverity::Warning,
            CommonError::Walk { .. } => ErrorSeverity::Error,
            CommonError::TooManyFiles { .. } => ErrorSeverity::Error,
        }
    }
}

/// Error chain formatter for detailed error reporting
pub struct ErrorChain<'a>(&'a dyn std::error::Error);

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: {}", self.0)?;

        let mut current = self.0.source();
        let mut level = 1;

        while let Some(err) = current {
            writeln!(f, "{:indent$}Caused by: {}", "", err, indent = level * 2)?;
            current = err.source();
            level += 1;
        }

        Ok(())
    }
}

/// Extension trait for error types to format the full error chain
pub trait ErrorChainExt {
    /// Format the full error chain
    fn error_chain(&self) -> ErrorChain<'_>;
}

impl<E: std::error::Error> ErrorChainExt for E {
    fn error_chain(&self) -> ErrorChain<'_> {
        ErrorChain(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn test_invalid_glob_message() {
        let error = CommonError::invalid_glob("**/[", "unclosed character class");
        assert_eq!(
            error.to_string(),
            "Invalid glob pattern '**/[': unclosed character class"
        );
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_not_a_directory_is_warning() {
        let error = CommonError::NotADirectory {
            path: "cypress/component".to_string(),
        };
        assert_eq!(error.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_listing_failures_are_errors() {
        let walk = CommonError::Walk {
            path: "src".to_string(),
            message: "permission denied".to_string(),
        };
        assert_eq!(walk.to_string(), "Cannot read src: permission denied");
        assert_eq!(walk.severity(), ErrorSeverity::Error);

        let too_many = CommonError::TooManyFiles {
            path: "src".to_string(),
            limit: 10,
        };
        assert_eq!(too_many.to_string(), "More than 10 matching files under src");
        assert_eq!(too_many.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_error_chain_includes_sources() {
        #[derive(Debug, ThisError)]
        #[error("outer failure")]
        struct Outer {
            #[source]
            inner: io::Error,
        }

        let error = Outer {
            inner: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let rendered = error.error_chain().to_string();
        assert!(rendered.starts_with("Error: outer failure"));
        assert!(rendered.contains("Caused by: denied"));
    }
}
