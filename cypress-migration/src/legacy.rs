//! The legacy `cypress.json` configuration
//!
//! The old schema is loosely typed: most keys accept a string, some also
//! accept an array or `false`. [`LegacyConfig`] keeps the raw JSON object and
//! resolves each setting on demand, applying the schema defaults when a key is
//! absent. Keys inside a nested `e2e` or `component` object override the root
//! keys for that testing type.

use crate::error::{MigrationError, Result};
use cypress_migration_common::normalize_relative;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Default folder holding end-to-end specs
pub const DEFAULT_INTEGRATION_FOLDER: &str = "cypress/integration";

/// Default folder holding component specs
pub const DEFAULT_COMPONENT_FOLDER: &str = "cypress/component";

/// Default `testFiles` glob
pub const DEFAULT_TEST_FILES: &str = "**/*.*";

/// Explicit glob equivalent to [`DEFAULT_TEST_FILES`]
pub const DEFAULT_TEST_FILES_EXPLICIT: &str = "**/*.{js,ts,jsx,tsx,coffee,cjsx}";

/// Default `ignoreTestFiles` glob
pub const DEFAULT_IGNORE_TEST_FILES: &str = "*.hot-update.js";

/// Folder holding the legacy support file
pub const LEGACY_SUPPORT_FOLDER: &str = "cypress/support";

/// Extensions a legacy support file may use
pub const LEGACY_SUPPORT_EXTENSIONS: [&str; 5] = ["js", "jsx", "ts", "tsx", "coffee"];

/// Default legacy plugins file, without extension
pub const LEGACY_PLUGINS_FILE: &str = "cypress/plugins/index";

/// Extensions a legacy plugins file may use
pub const LEGACY_PLUGINS_EXTENSIONS: [&str; 3] = ["js", "ts", "coffee"];

/// Keys that configure a testing type rather than the whole project
pub const INTEGRATION_FOLDER_KEY: &str = "integrationFolder";
/// See [`INTEGRATION_FOLDER_KEY`]
pub const COMPONENT_FOLDER_KEY: &str = "componentFolder";
/// See [`INTEGRATION_FOLDER_KEY`]
pub const TEST_FILES_KEY: &str = "testFiles";
/// See [`INTEGRATION_FOLDER_KEY`]
pub const IGNORE_TEST_FILES_KEY: &str = "ignoreTestFiles";
/// Legacy support file key
pub const SUPPORT_FILE_KEY: &str = "supportFile";
/// Legacy plugins file key
pub const PLUGINS_FILE_KEY: &str = "pluginsFile";
/// Base URL key, e2e only in the new schema
pub const BASE_URL_KEY: &str = "baseUrl";

/// The two kinds of tests the migration knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestingType {
    /// End-to-end tests, formerly "integration"
    E2e,
    /// Component tests
    Component,
}

impl TestingType {
    /// Both testing types, e2e first
    pub const ALL: [TestingType; 2] = [TestingType::E2e, TestingType::Component];

    /// Key of the nested override object and of the new config group
    pub fn as_str(self) -> &'static str {
        match self {
            TestingType::E2e => "e2e",
            TestingType::Component => "component",
        }
    }

    /// Legacy key naming this type's folder
    pub fn folder_key(self) -> &'static str {
        match self {
            TestingType::E2e => INTEGRATION_FOLDER_KEY,
            TestingType::Component => COMPONENT_FOLDER_KEY,
        }
    }

    /// Legacy default folder for this type
    pub fn default_folder(self) -> &'static str {
        match self {
            TestingType::E2e => DEFAULT_INTEGRATION_FOLDER,
            TestingType::Component => DEFAULT_COMPONENT_FOLDER,
        }
    }
}

impl fmt::Display for TestingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file setting that may be left at its default, pointed elsewhere or turned off
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSetting {
    /// Key absent
    Default,
    /// Explicit project-relative path
    Path(String),
    /// Set to `false`
    Disabled,
}

/// Parsed legacy configuration
///
/// Never mutated: every transformation of the migration reads from it and
/// produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyConfig(Map<String, Value>);

impl LegacyConfig {
    /// Wrap an already parsed JSON object
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Accept any JSON value, rejecting everything but objects
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(MigrationError::InvalidLegacyConfig {
                found: json_type_name(&other).to_string(),
            }),
        }
    }

    /// The raw key/value pairs
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Whether no key is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A root-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The nested override object for a testing type, if any
    pub fn overrides(&self, testing_type: TestingType) -> Option<&Map<String, Value>> {
        self.0.get(testing_type.as_str()).and_then(Value::as_object)
    }

    /// A key for a testing type: the nested override wins over the root
    pub fn lookup(&self, testing_type: TestingType, key: &str) -> Option<&Value> {
        self.overrides(testing_type)
            .and_then(|nested| nested.get(key))
            .or_else(|| self.0.get(key))
    }

    /// Spec folder for a testing type, `None` when set to `false`
    pub fn folder(&self, testing_type: TestingType) -> Option<String> {
        match self.lookup(testing_type, testing_type.folder_key()) {
            Some(Value::Bool(false)) => None,
            Some(Value::String(folder)) => {
                let folder = normalize_relative(folder);
                if folder.is_empty() {
                    Some(testing_type.default_folder().to_string())
                } else {
                    Some(folder)
                }
            }
            _ => Some(testing_type.default_folder().to_string()),
        }
    }

    /// `integrationFolder`, `None` when set to `false`
    pub fn integration_folder(&self) -> Option<String> {
        self.folder(TestingType::E2e)
    }

    /// `componentFolder`, `None` when set to `false`
    pub fn component_folder(&self) -> Option<String> {
        self.folder(TestingType::Component)
    }

    /// `testFiles` globs for a testing type
    pub fn test_files(&self, testing_type: TestingType) -> Vec<String> {
        string_or_list(self.lookup(testing_type, TEST_FILES_KEY))
            .unwrap_or_else(|| vec![DEFAULT_TEST_FILES.to_string()])
    }

    /// `ignoreTestFiles` globs for a testing type
    pub fn ignore_test_files(&self, testing_type: TestingType) -> Vec<String> {
        string_or_list(self.lookup(testing_type, IGNORE_TEST_FILES_KEY))
            .unwrap_or_else(|| vec![DEFAULT_IGNORE_TEST_FILES.to_string()])
    }

    /// Whether a testing type uses the default `testFiles` glob
    pub fn is_default_test_files(&self, testing_type: TestingType) -> bool {
        match self.test_files(testing_type).as_slice() {
            [single] => single == DEFAULT_TEST_FILES || single == DEFAULT_TEST_FILES_EXPLICIT,
            _ => false,
        }
    }

    /// Whether a testing type uses the default `ignoreTestFiles` glob
    pub fn is_default_ignore_test_files(&self, testing_type: TestingType) -> bool {
        matches!(
            self.ignore_test_files(testing_type).as_slice(),
            [single] if single == DEFAULT_IGNORE_TEST_FILES
        )
    }

    /// `supportFile`
    pub fn support_file(&self) -> FileSetting {
        file_setting(self.lookup(TestingType::E2e, SUPPORT_FILE_KEY))
    }

    /// `pluginsFile`
    pub fn plugins_file(&self) -> FileSetting {
        file_setting(self.lookup(TestingType::E2e, PLUGINS_FILE_KEY))
    }

    /// `baseUrl`
    pub fn base_url(&self) -> Option<&Value> {
        self.lookup(TestingType::E2e, BASE_URL_KEY)
    }
}

impl From<Map<String, Value>> for LegacyConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Whether `path` names one of the legacy default support file locations
///
/// The old runner resolved `cypress/support` and `cypress/support/index` to
/// the index file, so both spellings count as the default.
pub fn is_legacy_default_support_file(path: &str) -> bool {
    let path = normalize_relative(path);
    let index = format!("{LEGACY_SUPPORT_FOLDER}/index");
    if path == LEGACY_SUPPORT_FOLDER || path == index {
        return true;
    }
    LEGACY_SUPPORT_EXTENSIONS
        .iter()
        .any(|ext| path == format!("{index}.{ext}"))
}

/// Candidate paths for the legacy default support file, in lookup order
pub fn legacy_support_file_candidates() -> Vec<String> {
    LEGACY_SUPPORT_EXTENSIONS
        .iter()
        .map(|ext| format!("{LEGACY_SUPPORT_FOLDER}/index.{ext}"))
        .collect()
}

fn string_or_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::String(single) => Some(vec![single.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn file_setting(value: Option<&Value>) -> FileSetting {
    match value {
        Some(Value::Bool(false)) => FileSetting::Disabled,
        Some(Value::String(path)) if !path.trim().is_empty() => {
            FileSetting::Path(normalize_relative(path))
        }
        _ => FileSetting::Default,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
