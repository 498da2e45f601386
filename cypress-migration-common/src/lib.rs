//! # Cypress Migration Common
//!
//! Foundational pieces shared by the migration crates:
//!
//! - [`error`] - severity classification and the common error type
//! - [`glob_utils`] - gitignore-aware file listing against legacy test-file globs
//! - [`logging`] - the [`Pretty`] wrapper for YAML-formatted log output
//! - [`paths`] - helpers for project-relative, `/`-separated paths

pub mod error;
pub mod glob_utils;
pub mod logging;
pub mod paths;

pub use error::{CommonError, ErrorChain, ErrorChainExt, ErrorSeverity, Result, Severity};
pub use glob_utils::{build_glob_set, list_matching_files, FileListingConfig, MAX_FILES};
pub use logging::Pretty;
pub use paths::{join_relative, normalize_relative, to_relative_string};
