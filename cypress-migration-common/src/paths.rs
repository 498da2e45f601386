//! Project-relative path helpers
//!
//! Everything the migration reasons about (spec files, folders, support
//! files) is a `/`-separated path relative to the project root, independent of
//! the host platform.

use std::path::{Component, Path, PathBuf};

/// Normalize a user-supplied relative path
///
/// Converts `\` to `/`, drops `.` segments, collapses repeated separators and
/// strips leading `./` and trailing `/`.
///
/// ```
/// use cypress_migration_common::normalize_relative;
///
/// assert_eq!(normalize_relative("./cypress//integration/"), "cypress/integration");
/// assert_eq!(normalize_relative("tests\\e2e"), "tests/e2e");
/// ```
pub fn normalize_relative(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Express `path` relative to `root` as a `/`-separated string
///
/// Returns `None` when `path` is not under `root`.
pub fn to_relative_string(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(segments.join("/"))
}

/// Join a `/`-separated relative path onto `root`
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    normalize_relative(relative)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}
