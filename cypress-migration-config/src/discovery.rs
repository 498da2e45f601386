//! Settings file discovery
//!
//! Finds the optional global and project settings files. The project file
//! sits next to the legacy `cypress.json` as `.cypress-migrate.<ext>`.

use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Base name of the project settings file
const PROJECT_FILE_STEM: &str = ".cypress-migrate";

/// Base name of the global settings file
const GLOBAL_FILE_STEM: &str = "config";

/// Directory under the user's config dir holding the global settings file
const GLOBAL_DIR_NAME: &str = "cypress-migrate";

/// Extensions tried for each settings file, in order
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// A discovered settings file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Format detected from the extension
    pub format: ConfigFormat,
    /// Where the file was found
    pub scope: ConfigScope,
    /// Priority for ordering (higher values take precedence)
    pub priority: u8,
}

impl ConfigFile {
    /// Create a new ConfigFile with the given path, format, and scope
    pub fn new(path: PathBuf, format: ConfigFormat, scope: ConfigScope) -> Self {
        let priority = scope.priority();
        Self {
            path,
            format,
            scope,
            priority,
        }
    }
}

/// Settings file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (.toml extension)
    Toml,
    /// YAML format (.yaml or .yml extensions)
    Yaml,
    /// JSON format (.json extension)
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where a settings file was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// User-wide settings
    Global,
    /// Settings stored in the project being migrated
    Project,
}

impl ConfigScope {
    /// Get priority value for this scope (higher values override lower ones)
    pub fn priority(self) -> u8 {
        match self {
            Self::Global => 10,
            Self::Project => 20,
        }
    }
}

/// File discovery service for finding settings files
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    project_root: PathBuf,
    global_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Discover settings for the project at `project_root`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            global_dir: dirs::config_dir().map(|dir| dir.join(GLOBAL_DIR_NAME)),
        }
    }

    /// Discover with an explicit global directory (or none)
    pub fn with_global_dir(project_root: impl Into<PathBuf>, global_dir: Option<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            global_dir,
        }
    }

    /// Discover all settings files in priority order
    ///
    /// Lower priority first so figment merges later files on top.
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let mut files = Vec::new();

        if let Some(ref global_dir) = self.global_dir {
            files.extend(self.search(global_dir, GLOBAL_FILE_STEM, ConfigScope::Global));
        }
        files.extend(self.search(&self.project_root, PROJECT_FILE_STEM, ConfigScope::Project));

        files.sort_by_key(|f| f.priority);

        debug!("Discovered {} settings files", files.len());
        for file in &files {
            trace!("Found settings: {} ({:?})", file.path.display(), file.format);
        }
        files
    }

    fn search(&self, dir: &Path, stem: &str, scope: ConfigScope) -> Vec<ConfigFile> {
        if !dir.exists() {
            trace!("Settings directory does not exist: {}", dir.display());
            return Vec::new();
        }
        if !dir.is_dir() {
            warn!("Path exists but is not a directory: {}", dir.display());
            return Vec::new();
        }

        EXTENSIONS
            .iter()
            .filter_map(|ext| {
                let candidate = dir.join(format!("{stem}.{ext}"));
                if !candidate.is_file() {
                    return None;
                }
                let format = ConfigFormat::from_extension(ext)?;
                Some(ConfigFile::new(candidate, format, scope))
            })
            .collect()
    }
}
