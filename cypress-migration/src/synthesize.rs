//! New config synthesis
//!
//! Turns a legacy config into the new schema: project-wide options at the
//! top level, spec discovery and per-type options under `e2e` and
//! `component`. The result renders as a `defineConfig` module. Rendering
//! sorts every level, so the same input always renders the same text.

use crate::detect::CustomizationFlags;
use crate::legacy::{
    FileSetting, LegacyConfig, TestingType, BASE_URL_KEY, COMPONENT_FOLDER_KEY,
    IGNORE_TEST_FILES_KEY, INTEGRATION_FOLDER_KEY, LEGACY_SUPPORT_FOLDER, PLUGINS_FILE_KEY,
    SUPPORT_FILE_KEY, TEST_FILES_KEY,
};
use crate::specs::{NEW_E2E_FOLDER, NEW_E2E_SUPPORT_STEM};
use cypress_migration_common::normalize_relative;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Glob for new-style spec files below a folder
pub const NEW_SPEC_GLOB: &str = "**/*.cy.{js,jsx,ts,tsx}";

/// Default e2e spec pattern of the new schema
pub const DEFAULT_E2E_SPEC_PATTERN: &str = "cypress/e2e/**/*.cy.{js,jsx,ts,tsx}";

/// Default component spec pattern of the new schema
pub const DEFAULT_COMPONENT_SPEC_PATTERN: &str = "**/*.cy.{js,jsx,ts,tsx}";

/// File name of the new component support file, without extension
pub const NEW_COMPONENT_SUPPORT_STEM: &str = "component";

/// Extensions the new schema tries for its default support file
pub const NEW_SUPPORT_EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];

/// Keys of the new schema under a testing type
pub const SPEC_PATTERN_KEY: &str = "specPattern";
/// See [`SPEC_PATTERN_KEY`]
pub const EXCLUDE_SPEC_PATTERN_KEY: &str = "excludeSpecPattern";
/// See [`SPEC_PATTERN_KEY`]
pub const SETUP_NODE_EVENTS_KEY: &str = "setupNodeEvents";

/// Legacy keys with no place in the new schema
const REMOVED_KEYS: [&str; 6] = [
    "experimentalComponentTesting",
    "experimentalFetchPolyfill",
    "experimentalNetworkStubbing",
    "experimentalRunEvents",
    "experimentalShadowDomSupport",
    "firefoxGcInterval",
];

/// Legacy keys consumed while building the testing-type groups
const CONSUMED_KEYS: [&str; 9] = [
    INTEGRATION_FOLDER_KEY,
    COMPONENT_FOLDER_KEY,
    TEST_FILES_KEY,
    IGNORE_TEST_FILES_KEY,
    SUPPORT_FILE_KEY,
    PLUGINS_FILE_KEY,
    BASE_URL_KEY,
    "e2e",
    "component",
];

/// Options for one testing type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestingTypeConfig {
    /// Plain options, keyed by their new-schema name
    pub options: BTreeMap<String, Value>,
    /// Module the generated `setupNodeEvents` delegates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_node_events: Option<String>,
}

impl TestingTypeConfig {
    /// Whether the group carries nothing
    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.setup_node_events.is_none()
    }
}

/// A config in the new schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewConfig {
    /// Options shared by every testing type
    pub global: BTreeMap<String, Value>,
    /// `e2e` group, absent when e2e testing is disabled
    pub e2e: Option<TestingTypeConfig>,
    /// `component` group, absent without component specs
    pub component: Option<TestingTypeConfig>,
}

/// Build the new config from a legacy one
pub fn synthesize(legacy: &LegacyConfig, flags: &CustomizationFlags) -> NewConfig {
    let global = legacy
        .as_map()
        .iter()
        .filter(|(key, _)| !is_handled_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let e2e = legacy
        .integration_folder()
        .map(|_| testing_type_config(legacy, flags, TestingType::E2e));
    let component = flags
        .has_component_testing
        .then(|| testing_type_config(legacy, flags, TestingType::Component));

    NewConfig {
        global,
        e2e,
        component,
    }
}

fn is_handled_key(key: &str) -> bool {
    REMOVED_KEYS.contains(&key) || CONSUMED_KEYS.contains(&key)
}

fn testing_type_config(
    legacy: &LegacyConfig,
    flags: &CustomizationFlags,
    testing_type: TestingType,
) -> TestingTypeConfig {
    let mut options = BTreeMap::new();

    if let Some(pattern) = spec_pattern(legacy, testing_type) {
        options.insert(SPEC_PATTERN_KEY.to_string(), pattern);
    }

    if !legacy.is_default_ignore_test_files(testing_type) {
        options.insert(
            EXCLUDE_SPEC_PATTERN_KEY.to_string(),
            one_or_many(legacy.ignore_test_files(testing_type)),
        );
    }

    if flags.custom_support_file {
        match legacy.support_file() {
            FileSetting::Path(path) if is_new_default_support_file(&path, testing_type) => {}
            FileSetting::Path(path) => {
                options.insert(SUPPORT_FILE_KEY.to_string(), Value::String(path));
            }
            FileSetting::Disabled => {
                options.insert(SUPPORT_FILE_KEY.to_string(), Value::Bool(false));
            }
            FileSetting::Default => {}
        }
    }

    if testing_type == TestingType::E2e {
        if let Some(base_url) = legacy.base_url() {
            options.insert(BASE_URL_KEY.to_string(), base_url.clone());
        }
    }

    if let Some(overrides) = legacy.overrides(testing_type) {
        options.extend(
            overrides
                .iter()
                .filter(|(key, _)| !is_handled_key(key))
                .map(|(key, value)| (key.clone(), value.clone())),
        );
    }

    let setup_node_events = match legacy.plugins_file() {
        FileSetting::Disabled => None,
        FileSetting::Path(path) => Some(module_path(
            flags.plugins_file.as_deref().unwrap_or(path.as_str()),
        )),
        FileSetting::Default => flags.plugins_file.as_deref().map(module_path),
    };

    TestingTypeConfig {
        options,
        setup_node_events,
    }
}

/// The `specPattern` for a testing type, `None` when the default applies
///
/// Only the folder changed: the default glob below that folder. A custom
/// glob: that glob below the folder, one entry per glob.
pub fn spec_pattern(legacy: &LegacyConfig, testing_type: TestingType) -> Option<Value> {
    let folder = legacy.folder(testing_type)?;
    let default_folder = folder == testing_type.default_folder();
    let default_glob = legacy.is_default_test_files(testing_type);

    if default_folder && default_glob {
        return None;
    }

    let new_folder = match testing_type {
        TestingType::E2e if default_folder => NEW_E2E_FOLDER.to_string(),
        _ => folder,
    };

    if default_glob {
        return Some(Value::String(format!("{new_folder}/{NEW_SPEC_GLOB}")));
    }

    Some(one_or_many(
        legacy
            .test_files(testing_type)
            .into_iter()
            .map(|glob| format!("{new_folder}/{}", glob.trim_start_matches("./")))
            .collect(),
    ))
}

fn one_or_many(mut values: Vec<String>) -> Value {
    if values.len() == 1 {
        Value::String(values.remove(0))
    } else {
        Value::Array(values.into_iter().map(Value::String).collect())
    }
}

/// Whether the new schema would find `path` as its support file unaided
fn is_new_default_support_file(path: &str, testing_type: TestingType) -> bool {
    let stem = match testing_type {
        TestingType::E2e => NEW_E2E_SUPPORT_STEM,
        TestingType::Component => NEW_COMPONENT_SUPPORT_STEM,
    };
    let path = normalize_relative(path);
    NEW_SUPPORT_EXTENSIONS
        .iter()
        .any(|ext| path == format!("{LEGACY_SUPPORT_FOLDER}/{stem}.{ext}"))
}

fn module_path(path: &str) -> String {
    if path.starts_with("./") || path.starts_with("../") || path.starts_with('/') {
        path.to_string()
    } else {
        format!("./{path}")
    }
}

/// The config as plain JSON
///
/// `setupNodeEvents` cannot be JSON, so it appears as the path of the module
/// the generated function delegates to.
pub fn to_json(config: &NewConfig) -> Value {
    let mut root: Map<String, Value> = config
        .global
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    for (testing_type, group) in groups(config) {
        let mut object: Map<String, Value> = group
            .options
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if let Some(module) = &group.setup_node_events {
            object.insert(SETUP_NODE_EVENTS_KEY.to_string(), Value::String(module.clone()));
        }
        root.insert(testing_type.as_str().to_string(), Value::Object(object));
    }
    Value::Object(root)
}

/// Testing-type groups in render order
fn groups(config: &NewConfig) -> Vec<(TestingType, &TestingTypeConfig)> {
    let mut groups = Vec::with_capacity(2);
    if let Some(component) = &config.component {
        groups.push((TestingType::Component, component));
    }
    if let Some(e2e) = &config.e2e {
        groups.push((TestingType::E2e, e2e));
    }
    groups
}

/// Render the config as a `cypress.config.js` module
///
/// Global keys come first, then `component` and `e2e`; keys are sorted at
/// every level and strings use single quotes.
pub fn render(config: &NewConfig) -> String {
    let mut out = String::new();
    out.push_str("const { defineConfig } = require('cypress')\n\n");
    out.push_str("module.exports = defineConfig({\n");

    for (key, value) in &config.global {
        write_entry(&mut out, 1, key, value);
    }

    for (testing_type, group) in groups(config) {
        if group.is_empty() {
            write_line(&mut out, 1, &format!("{}: {{}},", testing_type.as_str()));
            continue;
        }
        write_line(&mut out, 1, &format!("{}: {{", testing_type.as_str()));

        let mut keys: Vec<&str> = group.options.keys().map(String::as_str).collect();
        if group.setup_node_events.is_some() {
            keys.push(SETUP_NODE_EVENTS_KEY);
        }
        keys.sort_unstable();

        for key in keys {
            match (group.options.get(key), &group.setup_node_events) {
                (Some(value), _) => write_entry(&mut out, 2, key, value),
                (None, Some(module)) => write_setup_node_events(&mut out, 2, module),
                (None, None) => {}
            }
        }
        write_line(&mut out, 1, "},");
    }

    out.push_str("})\n");
    out
}

fn write_setup_node_events(out: &mut String, level: usize, module: &str) {
    write_line(out, level, "// We've imported your old cypress plugins here.");
    write_line(out, level, "// You may want to clean this up later by importing these.");
    write_line(out, level, "setupNodeEvents(on, config) {");
    write_line(
        out,
        level + 1,
        &format!("return require({})(on, config)", js_string(module)),
    );
    write_line(out, level, "},");
}

/// Append `text` as one line at `level`
fn write_line(out: &mut String, level: usize, text: &str) {
    out.push_str(&indent(level));
    out.push_str(text);
    out.push('\n');
}

fn write_entry(out: &mut String, level: usize, key: &str, value: &Value) {
    out.push_str(&indent(level));
    out.push_str(&js_key(key));
    out.push_str(": ");
    write_value(out, level, value);
    out.push_str(",\n");
}

fn write_value(out: &mut String, level: usize, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&js_string(s)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                out.push_str(&indent(level + 1));
                write_value(out, level + 1, item);
                out.push_str(",\n");
            }
            out.push_str(&indent(level));
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            for (key, item) in sorted {
                write_entry(out, level + 1, key, item);
            }
            out.push_str(&indent(level));
            out.push('}');
        }
    }
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}

fn js_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        key.to_string()
    } else {
        js_string(key)
    }
}

fn js_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
