//! Glob-based file listing
//!
//! Legacy test-file globs (`testFiles`, `ignoreTestFiles`) are evaluated
//! relative to a spec folder. Brace alternation such as
//! `**/*.{js,ts,jsx,tsx}` is common in those globs, so matching goes through
//! `globset` while directory traversal uses `ignore::WalkBuilder` for
//! gitignore support.

use crate::error::{CommonError, Result};
use crate::paths::to_relative_string;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::Path;

/// Maximum number of files to return from a single listing
pub const MAX_FILES: usize = 10_000;

/// Configuration for file listing
#[derive(Debug, Clone)]
pub struct FileListingConfig {
    /// Whether to respect .gitignore files
    pub respect_gitignore: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum number of files to return
    pub max_files: usize,
}

impl Default for FileListingConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            max_files: MAX_FILES,
        }
    }
}

/// Compile a set of glob patterns
///
/// Returns `Ok(None)` for an empty pattern list.
pub fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| CommonError::invalid_glob(pattern, e))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| CommonError::invalid_glob(patterns.join(","), e))?;
    Ok(Some(set))
}

/// List files under `dir` matching any of `patterns` and none of `excludes`
///
/// Paths are returned relative to `dir`, `/`-separated and sorted. A missing
/// directory yields an empty list; a path that exists but is not a directory
/// is an error. So is any part of the tree that cannot be read, and more
/// than `config.max_files` matches.
///
/// # Examples
/// ```no_run
/// use cypress_migration_common::glob_utils::{list_matching_files, FileListingConfig};
/// use std::path::Path;
///
/// let specs = list_matching_files(
///     Path::new("cypress/integration"),
///     &["**/*.*".to_string()],
///     &["*.hot-update.js".to_string()],
///     &FileListingConfig::default(),
/// )?;
/// # Ok::<(), cypress_migration_common::CommonError>(())
/// ```
pub fn list_matching_files(
    dir: &Path,
    patterns: &[String],
    excludes: &[String],
    config: &FileListingConfig,
) -> Result<Vec<String>> {
    if !dir.exists() {
        tracing::debug!("list_matching_files: {} does not exist", dir.display());
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(CommonError::NotADirectory {
            path: dir.display().to_string(),
        });
    }

    let Some(include_set) = build_glob_set(patterns)? else {
        return Ok(Vec::new());
    };
    let exclude_set = build_glob_set(excludes)?;

    let walker = WalkBuilder::new(dir)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .ignore(config.respect_gitignore)
        .parents(config.respect_gitignore)
        .require_git(false)
        .hidden(!config.include_hidden)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| CommonError::Walk {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let entry_path = entry.path();
        if !entry_path.is_file() {
            continue;
        }
        let Some(relative) = to_relative_string(dir, entry_path) else {
            continue;
        };
        if !include_set.is_match(&relative) {
            continue;
        }
        if exclude_set.as_ref().is_some_and(|set| set.is_match(&relative)) {
            tracing::trace!("list_matching_files: excluded {}", relative);
            continue;
        }
        if files.len() >= config.max_files {
            tracing::warn!(
                "list_matching_files: more than {} files in {}",
                config.max_files,
                dir.display()
            );
            return Err(CommonError::TooManyFiles {
                path: dir.display().to_string(),
                limit: config.max_files,
            });
        }
        files.push(relative);
    }

    files.sort();
    tracing::debug!(
        "list_matching_files: {} files under {} for {:?}",
        files.len(),
        dir.display(),
        patterns
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "it('works', () => {})").unwrap();
    }

    #[test]
    fn test_list_matching_files_nested_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "b.spec.js");
        write(temp_dir.path(), "a/nested.spec.ts");
        write(temp_dir.path(), "README");

        let files = list_matching_files(
            temp_dir.path(),
            &["**/*.*".to_string()],
            &[],
            &FileListingConfig::default(),
        )
        .unwrap();

        assert_eq!(files, vec!["a/nested.spec.ts", "b.spec.js"]);
    }

    #[test]
    fn test_list_matching_files_brace_patterns() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "one.spec.jsx");
        write(temp_dir.path(), "two.spec.coffee");
        write(temp_dir.path(), "data.json");

        let files = list_matching_files(
            temp_dir.path(),
            &["**/*.{js,jsx,ts,tsx}".to_string()],
            &[],
            &FileListingConfig::default(),
        )
        .unwrap();

        assert_eq!(files, vec!["one.spec.jsx"]);
    }

    #[test]
    fn test_list_matching_files_excludes() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "app.spec.js");
        write(temp_dir.path(), "deep/app.hot-update.js");

        let files = list_matching_files(
            temp_dir.path(),
            &["**/*.js".to_string()],
            &["*.hot-update.js".to_string()],
            &FileListingConfig::default(),
        )
        .unwrap();

        assert_eq!(files, vec!["app.spec.js"]);
    }

    #[test]
    fn test_list_matching_files_skips_hidden() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "visible.spec.js");
        write(temp_dir.path(), ".cache/hidden.spec.js");

        let files = list_matching_files(
            temp_dir.path(),
            &["**/*.js".to_string()],
            &[],
            &FileListingConfig::default(),
        )
        .unwrap();

        assert_eq!(files, vec!["visible.spec.js"]);
    }

    #[test]
    fn test_list_matching_files_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = list_matching_files(
            &temp_dir.path().join("nope"),
            &["**/*.*".to_string()],
            &[],
            &FileListingConfig::default(),
        )
        .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_list_matching_files_file_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "cypress.json");

        let result = list_matching_files(
            &temp_dir.path().join("cypress.json"),
            &["**/*.*".to_string()],
            &[],
            &FileListingConfig::default(),
        );
        assert!(matches!(result, Err(CommonError::NotADirectory { .. })));
    }

    #[test]
    fn test_list_matching_files_over_limit_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.spec.js");
        write(temp_dir.path(), "b.spec.js");
        write(temp_dir.path(), "notes.md");

        let limited = |max_files| FileListingConfig {
            max_files,
            ..FileListingConfig::default()
        };
        let patterns = ["**/*.js".to_string()];

        let result = list_matching_files(temp_dir.path(), &patterns, &[], &limited(1));
        assert!(matches!(
            result,
            Err(CommonError::TooManyFiles { limit: 1, .. })
        ));

        let files = list_matching_files(temp_dir.path(), &patterns, &[], &limited(2)).unwrap();
        assert_eq!(files, vec!["a.spec.js", "b.spec.js"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_matching_files_unreadable_directory_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "open/a.spec.js");
        write(temp_dir.path(), "locked/b.spec.js");
        let locked = temp_dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let readable_anyway = fs::read_dir(&locked).is_ok();
        let result = list_matching_files(
            temp_dir.path(),
            &["**/*.js".to_string()],
            &[],
            &FileListingConfig::default(),
        );
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Privileged users read through the mode bits.
        if readable_anyway {
            return;
        }
        assert!(matches!(result, Err(CommonError::Walk { .. })));
    }

    #[test]
    fn test_build_glob_set() {
        let set = build_glob_set(&["**/*.cy.{js,ts}".to_string()])
            .unwrap()
            .unwrap();
        assert!(set.is_match("nested/login.cy.ts"));
        assert!(!set.is_match("nested/login.spec.ts"));
        assert!(build_glob_set(&[]).unwrap().is_none());
        assert!(matches!(
            build_glob_set(&["**/[".to_string()]),
            Err(CommonError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config = FileListingConfig::default();
        assert!(config.respect_gitignore);
        assert!(!config.include_hidden);
        assert_eq!(config.max_files, MAX_FILES);
    }
}
