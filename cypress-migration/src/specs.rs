//! Spec discovery and rename mapping
//!
//! Every discovered spec gets a [`SpecMapping`] from its legacy location to
//! the location the new schema expects, together with the diff [`FilePart`]s
//! a migration guide uses to highlight what changes.

use crate::error::Result;
use crate::fs::ProjectFs;
use crate::legacy::{
    LegacyConfig, TestingType, DEFAULT_INTEGRATION_FOLDER, LEGACY_SUPPORT_FOLDER,
};
use cypress_migration_common::{build_glob_set, join_relative};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Folder holding e2e specs in the new schema
pub const NEW_E2E_FOLDER: &str = "cypress/e2e";

/// File name of the new e2e support file, without extension
pub const NEW_E2E_SUPPORT_STEM: &str = "e2e";

/// Spec file name: stem, optional legacy spec marker, extension
static SPEC_FILE_NAME: OnceLock<Regex> = OnceLock::new();

/// Spec file already using the new `.cy.` marker
static NEW_SPEC_FILE_NAME: OnceLock<Regex> = OnceLock::new();

/// Legacy default support file path
static LEGACY_SUPPORT_FILE_NAME: OnceLock<Regex> = OnceLock::new();

fn spec_file_name_regex() -> &'static Regex {
    SPEC_FILE_NAME.get_or_init(|| {
        Regex::new(
            r"^(?P<stem>.+?)(?:[._-](?:spec|Spec|test|Test)|Spec|Test)?\.(?P<ext>js|jsx|ts|tsx|coffee|cjsx)$",
        )
        .expect("Invalid spec file name regex")
    })
}

fn new_spec_file_name_regex() -> &'static Regex {
    NEW_SPEC_FILE_NAME.get_or_init(|| {
        Regex::new(r"\.cy\.(?:js|jsx|ts|tsx|coffee|cjsx)$").expect("Invalid new spec file name regex")
    })
}

fn legacy_support_file_regex() -> &'static Regex {
    LEGACY_SUPPORT_FILE_NAME.get_or_init(|| {
        Regex::new(r"^cypress/support/index\.(?P<ext>js|jsx|ts|tsx|coffee)$")
            .expect("Invalid support file regex")
    })
}

/// How a highlighted piece of a path relates to the rename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    /// Shared by the old and new path
    Unchanged,
    /// Only in the new path
    Added,
    /// Only in the old path
    Removed,
}

/// One highlighted piece of a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePart {
    /// The text of this piece
    pub text: String,
    /// How it relates to the rename
    pub kind: PartKind,
}

impl FilePart {
    fn new(text: impl Into<String>, kind: PartKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Who performs a rename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameKind {
    /// The migration can move the file itself
    Automatic,
    /// The user moves the file; the watcher tracks progress
    Manual,
}

/// A spec file as found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredSpec {
    /// Testing type whose folder holds the file
    pub testing_type: TestingType,
    /// Path relative to the project root
    pub relative: String,
}

/// Mapping of one file from its legacy location to its new one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecMapping {
    /// Testing type of the file
    pub testing_type: TestingType,
    /// Legacy path, relative to the project root
    pub before: String,
    /// New path, relative to the project root
    pub after: String,
    /// Highlighted diff between `before` and `after`
    pub parts: Vec<FilePart>,
    /// Who performs the rename
    pub kind: RenameKind,
}

impl SpecMapping {
    /// Build a mapping, computing its parts
    pub fn new(
        testing_type: TestingType,
        before: impl Into<String>,
        after: impl Into<String>,
        kind: RenameKind,
    ) -> Self {
        let before = before.into();
        let after = after.into();
        let parts = file_parts(&before, &after);
        Self {
            testing_type,
            before,
            after,
            parts,
            kind,
        }
    }

    /// Whether the file has to move at all
    pub fn requires_rename(&self) -> bool {
        self.before != self.after
    }

    /// The old path rebuilt from `unchanged` and `removed` parts
    pub fn before_from_parts(&self) -> String {
        join_parts(&self.parts, PartKind::Removed)
    }

    /// The new path rebuilt from `unchanged` and `added` parts
    pub fn after_from_parts(&self) -> String {
        join_parts(&self.parts, PartKind::Added)
    }
}

fn join_parts(parts: &[FilePart], side: PartKind) -> String {
    parts
        .iter()
        .filter(|part| part.kind == PartKind::Unchanged || part.kind == side)
        .map(|part| part.text.as_str())
        .collect()
}

/// One side of a rename as shown in a migration guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationFile {
    /// Testing type of the file
    pub testing_type: TestingType,
    /// Path relative to the project root
    pub relative: String,
    /// Parts for this side only
    pub parts: Vec<FilePart>,
}

/// Before and after lists for a migration guide
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesForMigration {
    /// Files at their legacy location
    pub before: Vec<MigrationFile>,
    /// Files at their new location
    pub after: Vec<MigrationFile>,
}

impl FilesForMigration {
    /// Split mappings into their two sides
    pub fn from_mappings<'a>(mappings: impl IntoIterator<Item = &'a SpecMapping>) -> Self {
        let mut files = Self::default();
        for mapping in mappings {
            files.before.push(MigrationFile {
                testing_type: mapping.testing_type,
                relative: mapping.before.clone(),
                parts: side_parts(&mapping.parts, PartKind::Removed),
            });
            files.after.push(MigrationFile {
                testing_type: mapping.testing_type,
                relative: mapping.after.clone(),
                parts: side_parts(&mapping.parts, PartKind::Added),
            });
        }
        files
    }

    /// Whether there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
    }
}

fn side_parts(parts: &[FilePart], side: PartKind) -> Vec<FilePart> {
    parts
        .iter()
        .filter(|part| part.kind == PartKind::Unchanged || part.kind == side)
        .cloned()
        .collect()
}

/// List spec files for every enabled testing type
///
/// Files are matched against the type's `testFiles` globs relative to its
/// folder and dropped when they match `ignoreTestFiles`. e2e specs come first,
/// each group sorted by path.
pub fn discover_specs(
    config: &LegacyConfig,
    fs: &dyn ProjectFs,
    project_root: &Path,
) -> Result<Vec<DiscoveredSpec>> {
    let mut specs = Vec::new();

    for testing_type in TestingType::ALL {
        let Some(folder) = config.folder(testing_type) else {
            trace!("{testing_type} folder disabled, skipping discovery");
            continue;
        };
        let globs = config.test_files(testing_type);
        let ignored = build_glob_set(&config.ignore_test_files(testing_type))?;

        let found = fs.list_files(&join_relative(project_root, &folder), &globs)?;
        let before = specs.len();
        specs.extend(
            found
                .into_iter()
                .filter(|relative| !ignored.as_ref().is_some_and(|set| set.is_match(relative)))
                .map(|relative| DiscoveredSpec {
                    testing_type,
                    relative: format!("{folder}/{relative}"),
                }),
        );
        debug!(
            "discovered {} {testing_type} specs in {folder}",
            specs.len() - before
        );
    }

    // A component folder nested inside the integration folder lists some
    // files twice; the component listing wins.
    let component: HashSet<String> = specs
        .iter()
        .filter(|spec| spec.testing_type == TestingType::Component)
        .map(|spec| spec.relative.clone())
        .collect();
    specs.retain(|spec| {
        spec.testing_type == TestingType::Component || !component.contains(&spec.relative)
    });

    Ok(specs)
}

/// Map every discovered spec to its new location
pub fn map_specs(specs: &[DiscoveredSpec], config: &LegacyConfig) -> Vec<SpecMapping> {
    specs.iter().map(|spec| map_spec(spec, config)).collect()
}

/// Map one discovered spec to its new location
///
/// e2e specs in `cypress/integration` move to `cypress/e2e`; a custom
/// integration folder stays where it is. Component specs never change
/// folder. The legacy spec marker is rewritten to `.cy.` only when the
/// testing type uses the default `testFiles` glob.
pub fn map_spec(spec: &DiscoveredSpec, config: &LegacyConfig) -> SpecMapping {
    let testing_type = spec.testing_type;
    let folder = config
        .folder(testing_type)
        .unwrap_or_else(|| testing_type.default_folder().to_string());
    let default_glob = config.is_default_test_files(testing_type);

    let relocated = match testing_type {
        TestingType::E2e if folder == DEFAULT_INTEGRATION_FOLDER => {
            match spec.relative.strip_prefix(DEFAULT_INTEGRATION_FOLDER) {
                Some(rest) if rest.starts_with('/') => format!("{NEW_E2E_FOLDER}{rest}"),
                _ => spec.relative.clone(),
            }
        }
        _ => spec.relative.clone(),
    };

    let after = if default_glob {
        rename_spec_suffix(&relocated)
    } else {
        relocated
    };

    let kind = match testing_type {
        TestingType::Component
            if folder != testing_type.default_folder() || !default_glob =>
        {
            RenameKind::Manual
        }
        _ => RenameKind::Automatic,
    };

    SpecMapping::new(testing_type, spec.relative.clone(), after, kind)
}

/// Rewrite the legacy spec marker in the file name to `.cy.`
///
/// ```
/// use cypress_migration::specs::rename_spec_suffix;
///
/// assert_eq!(rename_spec_suffix("cypress/e2e/foo.spec.js"), "cypress/e2e/foo.cy.js");
/// assert_eq!(rename_spec_suffix("cypress/e2e/LoginTest.tsx"), "cypress/e2e/Login.cy.tsx");
/// assert_eq!(rename_spec_suffix("cypress/e2e/bar.js"), "cypress/e2e/bar.cy.js");
/// assert_eq!(rename_spec_suffix("cypress/e2e/baz.cy.ts"), "cypress/e2e/baz.cy.ts");
/// ```
pub fn rename_spec_suffix(path: &str) -> String {
    let (dir, file_name) = match path.rsplit_once('/') {
        Some((dir, file_name)) => (Some(dir), file_name),
        None => (None, path),
    };
    if new_spec_file_name_regex().is_match(file_name) {
        return path.to_string();
    }
    let renamed = spec_file_name_regex().replace(file_name, "${stem}.cy.${ext}");
    match dir {
        Some(dir) => format!("{dir}/{renamed}"),
        None => renamed.into_owned(),
    }
}

/// The support file rename for a legacy default support file
///
/// `cypress/support/index.<ext>` becomes `cypress/support/e2e.<ext>`.
/// Returns `None` for any other path.
pub fn support_file_mapping(legacy_support_file: &str) -> Option<SpecMapping> {
    let captures = legacy_support_file_regex().captures(legacy_support_file)?;
    let ext = captures.name("ext")?.as_str();
    Some(SpecMapping::new(
        TestingType::E2e,
        legacy_support_file,
        format!("{LEGACY_SUPPORT_FOLDER}/{NEW_E2E_SUPPORT_STEM}.{ext}"),
        RenameKind::Automatic,
    ))
}

/// Highlighted diff between two `/`-separated paths
///
/// Leading and trailing path segments shared by both sides are `unchanged`
/// (the prefix keeps its trailing `/`, the suffix its leading `/`). At least
/// one segment on each side is left for the `removed` and `added` parts, so
/// the prefix and suffix never overlap. Identical paths give a single
/// `unchanged` part.
pub fn file_parts(before: &str, after: &str) -> Vec<FilePart> {
    if before == after {
        return vec![FilePart::new(before, PartKind::Unchanged)];
    }

    let old: Vec<&str> = before.split('/').collect();
    let new: Vec<&str> = after.split('/').collect();
    let shortest = old.len().min(new.len());

    let prefix = old
        .iter()
        .zip(&new)
        .take(shortest - 1)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(shortest - 1 - prefix)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = Vec::with_capacity(4);
    if prefix > 0 {
        parts.push(FilePart::new(
            format!("{}/", old[..prefix].join("/")),
            PartKind::Unchanged,
        ));
    }
    let removed = old[prefix..old.len() - suffix].join("/");
    if !removed.is_empty() {
        parts.push(FilePart::new(removed, PartKind::Removed));
    }
    let added = new[prefix..new.len() - suffix].join("/");
    if !added.is_empty() {
        parts.push(FilePart::new(added, PartKind::Added));
    }
    if suffix > 0 {
        parts.push(FilePart::new(
            format!("/{}", old[old.len() - suffix..].join("/")),
            PartKind::Unchanged,
        ));
    }
    parts
}
