use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "CYPRESS_MIGRATE_";

/// Legacy config file read at the project root
pub const DEFAULT_LEGACY_CONFIG_FILE: &str = "cypress.json";

/// Config file written by the migration
pub const DEFAULT_NEW_CONFIG_FILE: &str = "cypress.config.js";

/// Buffered filesystem events per watcher
pub const DEFAULT_WATCH_CHANNEL_CAPACITY: usize = 100;

/// Tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
    /// Legacy config file, relative to the project root
    pub legacy_config_file: String,
    /// New config file, relative to the project root
    pub new_config_file: String,
    /// Capacity of the channel between the filesystem watcher and the migration watcher
    pub watch_channel_capacity: usize,
    /// Whether spec discovery honours `.gitignore`
    pub respect_gitignore: bool,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            legacy_config_file: DEFAULT_LEGACY_CONFIG_FILE.to_string(),
            new_config_file: DEFAULT_NEW_CONFIG_FILE.to_string(),
            watch_channel_capacity: DEFAULT_WATCH_CHANNEL_CAPACITY,
            respect_gitignore: true,
        }
    }
}

impl MigrationSettings {
    /// Reject settings the migration cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.legacy_config_file.trim().is_empty() {
            return Err(ConfigError::validation("legacy_config_file cannot be empty"));
        }
        if self.new_config_file.trim().is_empty() {
            return Err(ConfigError::validation("new_config_file cannot be empty"));
        }
        if self.legacy_config_file == self.new_config_file {
            return Err(ConfigError::validation(format!(
                "legacy_config_file and new_config_file are both '{}'",
                self.new_config_file
            )));
        }
        if self.watch_channel_capacity == 0 {
            return Err(ConfigError::validation(
                "watch_channel_capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}
