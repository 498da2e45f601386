//! Filesystem access used by the migration
//!
//! Everything the migration reads or writes on disk goes through
//! [`ProjectFs`], so tests and embedding hosts can substitute their own
//! storage.

use crate::error::Result;
use cypress_migration_common::{list_matching_files, FileListingConfig};
use cypress_migration_config::MigrationSettings;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, trace};

/// File operations the migration needs from its host
pub trait ProjectFs: Send + Sync {
    /// Read a JSON (or YAML) file into a structured value
    fn read_structured_file(&self, path: &Path) -> Result<Value>;

    /// List files under `dir` matching any of `globs`
    ///
    /// Returns `/`-separated paths relative to `dir`, sorted. A missing
    /// directory yields an empty list.
    fn list_files(&self, dir: &Path, globs: &[String]) -> Result<Vec<String>>;

    /// Whether a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Move a file, creating the destination's parent directories
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Write a file, replacing any previous contents
    fn write_file(&self, path: &Path, contents: &str) -> Result<()>;
}

/// [`ProjectFs`] backed by the local disk
#[derive(Debug, Clone, Default)]
pub struct LocalFs {
    listing: FileListingConfig,
}

impl LocalFs {
    /// Local filesystem with default listing behaviour
    pub fn new() -> Self {
        Self::default()
    }

    /// Local filesystem honouring the tool settings
    pub fn with_settings(settings: &MigrationSettings) -> Self {
        Self {
            listing: FileListingConfig {
                respect_gitignore: settings.respect_gitignore,
                ..FileListingConfig::default()
            },
        }
    }
}

impl ProjectFs for LocalFs {
    fn read_structured_file(&self, path: &Path) -> Result<Value> {
        trace!("reading {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "yaml" | "yml"));
        if is_yaml {
            Ok(serde_yaml_ng::from_str(&contents)?)
        } else {
            Ok(serde_json::from_str(&contents)?)
        }
    }

    fn list_files(&self, dir: &Path, globs: &[String]) -> Result<Vec<String>> {
        let files = list_matching_files(dir, globs, &[], &self.listing)?;
        debug!("found {} files in {}", files.len(), dir.display());
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(from, to)?;
        debug!("moved {} -> {}", from.display(), to.display());
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}
