//! Schema detection
//!
//! Works out which optional customizations a project made to the legacy
//! schema. The only side effects are read-only filesystem checks.

use crate::error::Result;
use crate::fs::ProjectFs;
use crate::legacy::{
    is_legacy_default_support_file, legacy_support_file_candidates, FileSetting, LegacyConfig,
    TestingType, DEFAULT_COMPONENT_FOLDER, DEFAULT_INTEGRATION_FOLDER, LEGACY_PLUGINS_EXTENSIONS,
    LEGACY_PLUGINS_FILE,
};
use cypress_migration_common::{join_relative, Pretty};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Customizations detected in a legacy config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationFlags {
    /// `integrationFolder` is not `cypress/integration`
    pub custom_integration_folder: bool,
    /// e2e `testFiles` is not the default glob
    pub custom_integration_test_files: bool,
    /// `componentFolder` is not `cypress/component`, or is `false`
    pub custom_component_folder: bool,
    /// component `testFiles` is not the default glob
    pub custom_component_test_files: bool,
    /// `supportFile` points somewhere other than a default location, or is `false`
    pub custom_support_file: bool,
    /// The component folder is enabled and holds at least one spec
    pub has_component_testing: bool,
    /// The plugins file found on disk, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins_file: Option<String>,
}

/// Inspect `config` and the project at `project_root`
pub fn detect(
    config: &LegacyConfig,
    fs: &dyn ProjectFs,
    project_root: &Path,
) -> Result<CustomizationFlags> {
    let integration_folder = config.integration_folder();
    let component_folder = config.component_folder();

    let custom_support_file = match config.support_file() {
        FileSetting::Default => false,
        FileSetting::Disabled => true,
        FileSetting::Path(path) => !is_legacy_default_support_file(&path),
    };

    let has_component_testing = match component_folder.as_deref() {
        None => false,
        Some(folder) => has_component_spec_file(config, fs, project_root, folder)?,
    };

    let flags = CustomizationFlags {
        custom_integration_folder: integration_folder.as_deref() != Some(DEFAULT_INTEGRATION_FOLDER),
        custom_integration_test_files: !config.is_default_test_files(TestingType::E2e),
        custom_component_folder: component_folder.as_deref() != Some(DEFAULT_COMPONENT_FOLDER),
        custom_component_test_files: !config.is_default_test_files(TestingType::Component),
        custom_support_file,
        has_component_testing,
        plugins_file: find_plugins_file(config, fs, project_root),
    };

    debug!("detected customizations: {}", Pretty(&flags));
    Ok(flags)
}

fn has_component_spec_file(
    config: &LegacyConfig,
    fs: &dyn ProjectFs,
    project_root: &Path,
    folder: &str,
) -> Result<bool> {
    let globs = config.test_files(TestingType::Component);
    let specs = fs.list_files(&join_relative(project_root, folder), &globs)?;
    Ok(!specs.is_empty())
}

/// The legacy default support file that exists on disk, if any
pub fn find_legacy_support_file(fs: &dyn ProjectFs, project_root: &Path) -> Option<String> {
    legacy_support_file_candidates()
        .into_iter()
        .find(|candidate| fs.exists(&join_relative(project_root, candidate)))
}

/// The legacy support file to show in the migration guide
///
/// Falls back to `cypress/support/index.js` when none exists.
pub fn default_legacy_support_file(fs: &dyn ProjectFs, project_root: &Path) -> String {
    find_legacy_support_file(fs, project_root).unwrap_or_else(|| {
        legacy_support_file_candidates()
            .into_iter()
            .next()
            .unwrap_or_default()
    })
}

/// The plugins file that exists on disk, if any
///
/// An explicit `pluginsFile` without an extension resolves the way node does:
/// `<path>.<ext>` first, then `<path>/index.<ext>`.
pub fn find_plugins_file(
    config: &LegacyConfig,
    fs: &dyn ProjectFs,
    project_root: &Path,
) -> Option<String> {
    let candidates = match config.plugins_file() {
        FileSetting::Disabled => return None,
        FileSetting::Default => with_extensions(LEGACY_PLUGINS_FILE),
        FileSetting::Path(path) if Path::new(&path).extension().is_some() => vec![path],
        FileSetting::Path(path) => {
            let mut candidates = with_extensions(&path);
            candidates.extend(with_extensions(&format!("{path}/index")));
            candidates
        }
    };
    candidates
        .into_iter()
        .find(|candidate| fs.exists(&join_relative(project_root, candidate)))
}

fn with_extensions(stem: &str) -> Vec<String> {
    LEGACY_PLUGINS_EXTENSIONS
        .iter()
        .map(|ext| format!("{stem}.{ext}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        temp
    }

    fn config(value: serde_json::Value) -> LegacyConfig {
        LegacyConfig::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_have_no_customizations() {
        let temp = project(&[]);
        let flags = detect(&LegacyConfig::default(), &LocalFs::new(), temp.path()).unwrap();
        assert_eq!(flags, CustomizationFlags::default());
    }

    #[test]
    fn test_custom_integration_folder() {
        let temp = project(&[]);
        let flags = detect(
            &config(json!({ "integrationFolder": "tests/e2e" })),
            &LocalFs::new(),
            temp.path(),
        )
        .unwrap();
        assert!(flags.custom_integration_folder);
        assert!(!flags.custom_component_folder);
        assert!(!flags.has_component_testing);
    }

    #[test]
    fn test_component_folder_false() {
        let temp = project(&["cypress/component/Button.spec.tsx"]);
        let flags = detect(
            &config(json!({ "componentFolder": false })),
            &LocalFs::new(),
            temp.path(),
        )
        .unwrap();
        assert!(flags.custom_component_folder);
        assert!(!flags.has_component_testing);
    }

    #[test]
    fn test_component_testing_requires_matching_spec() {
        let temp = project(&["src/Button.test.tsx"]);
        let fs = LocalFs::new();

        let matching = config(json!({ "componentFolder": "src", "testFiles": "**/*.test.tsx" }));
        assert!(detect(&matching, &fs, temp.path()).unwrap().has_component_testing);

        let not_matching = config(json!({ "componentFolder": "src", "testFiles": "**/*.cy.js" }));
        assert!(!detect(&not_matching, &fs, temp.path()).unwrap().has_component_testing);
    }

    #[test]
    fn test_support_file_customization() {
        let temp = project(&[]);
        let fs = LocalFs::new();

        let default_location = config(json!({ "supportFile": "cypress/support/index.ts" }));
        assert!(!detect(&default_location, &fs, temp.path()).unwrap().custom_support_file);

        let moved = config(json!({ "supportFile": "support/setup.js" }));
        assert!(detect(&moved, &fs, temp.path()).unwrap().custom_support_file);

        let disabled = config(json!({ "supportFile": false }));
        assert!(detect(&disabled, &fs, temp.path()).unwrap().custom_support_file);
    }

    #[test]
    fn test_find_plugins_file() {
        let temp = project(&["cypress/plugins/index.ts", "tools/plugins/index.js"]);
        let fs = LocalFs::new();

        assert_eq!(
            find_plugins_file(&LegacyConfig::default(), &fs, temp.path()).as_deref(),
            Some("cypress/plugins/index.ts")
        );
        assert_eq!(
            find_plugins_file(&config(json!({ "pluginsFile": "tools/plugins" })), &fs, temp.path())
                .as_deref(),
            Some("tools/plugins/index.js")
        );
        assert_eq!(
            find_plugins_file(&config(json!({ "pluginsFile": false })), &fs, temp.path()),
            None
        );
    }

    #[test]
    fn test_detect_keeps_the_resolved_plugins_file() {
        let temp = project(&["cypress/plugins/index.ts"]);
        let flags = detect(&LegacyConfig::default(), &LocalFs::new(), temp.path()).unwrap();
        assert_eq!(flags.plugins_file.as_deref(), Some("cypress/plugins/index.ts"));

        let empty = project(&[]);
        let flags = detect(&LegacyConfig::default(), &LocalFs::new(), empty.path()).unwrap();
        assert!(flags.plugins_file.is_none());
    }

    #[test]
    fn test_default_legacy_support_file() {
        let fs = LocalFs::new();
        let empty = project(&[]);
        assert_eq!(
            default_legacy_support_file(&fs, empty.path()),
            "cypress/support/index.js"
        );

        let with_ts = project(&["cypress/support/index.ts"]);
        assert_eq!(
            default_legacy_support_file(&fs, with_ts.path()),
            "cypress/support/index.ts"
        );
    }
}
