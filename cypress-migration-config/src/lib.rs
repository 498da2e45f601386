//! Settings for the Cypress config migration tools, loaded with Figment
//!
//! The migration library itself is configured by a small [`MigrationSettings`]
//! value: which legacy file to read, which file to write, how the watcher
//! buffers events and whether spec discovery honours `.gitignore`.
//!
//! # Sources
//!
//! Later sources override earlier ones:
//!
//! 1. Built-in defaults
//! 2. Global file: `<config dir>/cypress-migrate/config.{toml,yaml,yml,json}`
//! 3. Project file: `<project>/.cypress-migrate.{toml,yaml,yml,json}`
//! 4. Environment variables prefixed with `CYPRESS_MIGRATE_`
//!
//! ```toml
//! legacy_config_file = "cypress.json"
//! new_config_file = "cypress.config.ts"
//! watch_channel_capacity = 256
//! respect_gitignore = false
//! ```
//!
//! ```bash
//! export CYPRESS_MIGRATE_NEW_CONFIG_FILE="cypress.config.mjs"
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use cypress_migration_config::load_settings;
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("."))?;
//! println!("reading {}", settings.legacy_config_file);
//! # Ok::<(), cypress_migration_config::ConfigError>(())
//! ```

/// File discovery logic for settings files
pub mod discovery;
/// Error types and handling
pub mod error;
/// Figment-backed settings provider
pub mod provider;
/// Settings types
pub mod types;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery};
pub use error::{ConfigError, ConfigResult};
pub use provider::SettingsProvider;
pub use types::{
    MigrationSettings, DEFAULT_LEGACY_CONFIG_FILE, DEFAULT_NEW_CONFIG_FILE,
    DEFAULT_WATCH_CHANNEL_CAPACITY, ENV_PREFIX,
};

use std::path::Path;

/// Load settings for a project from every source
pub fn load_settings(project_root: &Path) -> ConfigResult<MigrationSettings> {
    SettingsProvider::for_project(project_root).load()
}
