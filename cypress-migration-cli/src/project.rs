//! Opening a migration session for the selected project

use crate::error::Result;
use cypress_migration::MigrationSession;
use cypress_migration_config::load_settings;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The project root: `--project` if given, otherwise the current directory
pub fn resolve_root(project: Option<&Path>) -> Result<PathBuf> {
    match project {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Load settings for `root` and initialize a session on it
pub fn open_session(root: &Path) -> Result<MigrationSession> {
    let settings = load_settings(root)?;
    debug!(
        root = %root.display(),
        legacy = %settings.legacy_config_file,
        "opening migration session"
    );
    let mut session = MigrationSession::for_project(root, settings);
    session.initialize()?;
    Ok(session)
}
