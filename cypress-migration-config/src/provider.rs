//! Settings provider using Figment

use crate::{
    discovery::{ConfigFile, ConfigFormat, FileDiscovery},
    error::ConfigResult,
    types::{MigrationSettings, ENV_PREFIX},
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::Path;
use tracing::{debug, trace};

/// Settings provider
///
/// Settings are read fresh on every [`SettingsProvider::load`] call.
pub struct SettingsProvider {
    discovery: FileDiscovery,
}

impl SettingsProvider {
    /// Provider for the project at `project_root`
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            discovery: FileDiscovery::new(project_root),
        }
    }

    /// Provider with a custom discovery
    pub fn with_discovery(discovery: FileDiscovery) -> Self {
        Self { discovery }
    }

    /// Load and validate settings from all sources
    pub fn load(&self) -> ConfigResult<MigrationSettings> {
        let settings: MigrationSettings = self.build_figment().extract()?;
        settings.validate()?;
        debug!(
            legacy = %settings.legacy_config_file,
            new = %settings.new_config_file,
            "Loaded migration settings"
        );
        Ok(settings)
    }

    /// Build the figment with all sources in precedence order
    ///
    /// 1. Defaults
    /// 2. Discovered settings files (global, then project)
    /// 3. `CYPRESS_MIGRATE_` environment variables
    fn build_figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(MigrationSettings::default()));

        for file in self.discovery.discover_all() {
            trace!("Merging settings file {}", file.path.display());
            figment = figment.merge(Self::file_provider(&file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn file_provider(file: &ConfigFile) -> Figment {
        let path = &file.path;
        match file.format {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        }
    }
}
