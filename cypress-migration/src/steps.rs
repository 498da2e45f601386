//! Step planning
//!
//! The wizard walks a fixed master list of steps. Planning drops the steps
//! whose guard fails for this project; it never reorders them.

use crate::detect::{find_legacy_support_file, CustomizationFlags};
use crate::error::{MigrationError, Result};
use crate::fs::ProjectFs;
use crate::legacy::{LegacyConfig, TestingType};
use crate::specs::{discover_specs, map_specs, RenameKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// One step of the migration wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MigrationStep {
    /// Rename specs the migration can move itself
    RenameAuto,
    /// Rename component specs the user moves by hand
    RenameManual,
    /// Rename the legacy support file
    RenameSupport,
    /// Replace `cypress.json` with the new config file
    ConfigFile,
    /// Set up component testing
    SetupComponent,
}

impl MigrationStep {
    /// Every step, in master order
    pub const ALL: [MigrationStep; 5] = [
        MigrationStep::RenameAuto,
        MigrationStep::RenameManual,
        MigrationStep::RenameSupport,
        MigrationStep::ConfigFile,
        MigrationStep::SetupComponent,
    ];

    /// Wire name of the step
    pub fn as_str(self) -> &'static str {
        match self {
            MigrationStep::RenameAuto => "renameAuto",
            MigrationStep::RenameManual => "renameManual",
            MigrationStep::RenameSupport => "renameSupport",
            MigrationStep::ConfigFile => "configFile",
            MigrationStep::SetupComponent => "setupComponent",
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationStep {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MigrationStep::ALL
            .into_iter()
            .find(|step| step.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown migration step '{s}'"))
    }
}

/// Everything the step guards look at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFacts {
    /// At least one automatic rename changes a path
    pub has_automatic_renames: bool,
    /// At least one manual component rename changes a path
    pub has_manual_renames: bool,
    /// Component testing is enabled and has specs
    pub has_component_testing: bool,
    /// `supportFile` was customized
    pub custom_support_file: bool,
    /// A legacy default support file exists
    pub has_legacy_support_file: bool,
    /// A legacy config file exists
    pub has_legacy_config_file: bool,
}

impl PlanFacts {
    /// Gather facts from the project
    pub fn gather(
        project_root: &Path,
        config: &LegacyConfig,
        flags: &CustomizationFlags,
        fs: &dyn ProjectFs,
        has_legacy_config_file: bool,
    ) -> Result<Self> {
        let mappings = map_specs(&discover_specs(config, fs, project_root)?, config);

        let has_automatic_renames = mappings
            .iter()
            .any(|m| m.kind == RenameKind::Automatic && m.requires_rename());
        let has_manual_renames = mappings.iter().any(|m| {
            m.kind == RenameKind::Manual
                && m.testing_type == TestingType::Component
                && m.requires_rename()
        });

        Ok(Self {
            has_automatic_renames,
            has_manual_renames,
            has_component_testing: flags.has_component_testing,
            custom_support_file: flags.custom_support_file,
            has_legacy_support_file: find_legacy_support_file(fs, project_root).is_some(),
            has_legacy_config_file,
        })
    }
}

/// Whether a step applies given the facts
pub fn should_show(step: MigrationStep, facts: &PlanFacts) -> bool {
    match step {
        MigrationStep::RenameAuto => facts.has_automatic_renames,
        MigrationStep::RenameManual => facts.has_component_testing && facts.has_manual_renames,
        MigrationStep::RenameSupport => {
            !facts.custom_support_file && facts.has_legacy_support_file
        }
        MigrationStep::ConfigFile => facts.has_legacy_config_file,
        MigrationStep::SetupComponent => facts.has_component_testing,
    }
}

/// The master list filtered by the step guards
pub fn filter_steps(facts: &PlanFacts) -> Vec<MigrationStep> {
    MigrationStep::ALL
        .into_iter()
        .filter(|step| should_show(*step, facts))
        .collect()
}

/// Plan the steps for a project
///
/// Fails with [`MigrationError::NoApplicableSteps`] when every guard fails.
pub fn plan(
    project_root: &Path,
    config: &LegacyConfig,
    flags: &CustomizationFlags,
    fs: &dyn ProjectFs,
    has_legacy_config_file: bool,
) -> Result<Vec<MigrationStep>> {
    let facts = PlanFacts::gather(project_root, config, flags, fs, has_legacy_config_file)?;
    debug!(?facts, "planning migration");

    let steps = filter_steps(&facts);
    if steps.is_empty() {
        return Err(MigrationError::NoApplicableSteps);
    }
    info!(
        "migration steps: {}",
        steps
            .iter()
            .map(|step| step.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_step_names() {
        assert_eq!(MigrationStep::RenameAuto.to_string(), "renameAuto");
        assert_eq!(
            serde_json::to_string(&MigrationStep::SetupComponent).unwrap(),
            "\"setupComponent\""
        );
        assert_eq!(
            "configfile".parse::<MigrationStep>().unwrap(),
            MigrationStep::ConfigFile
        );
        assert!("renameEverything".parse::<MigrationStep>().is_err());
    }

    #[test]
    fn test_all_guards_pass() {
        let facts = PlanFacts {
            has_automatic_renames: true,
            has_manual_renames: true,
            has_component_testing: true,
            custom_support_file: false,
            has_legacy_support_file: true,
            has_legacy_config_file: true,
        };
        assert_eq!(filter_steps(&facts), MigrationStep::ALL.to_vec());
    }

    #[test]
    fn test_manual_renames_need_component_testing() {
        let facts = PlanFacts {
            has_manual_renames: true,
            has_legacy_config_file: true,
            ..Default::default()
        };
        assert_eq!(filter_steps(&facts), vec![MigrationStep::ConfigFile]);
    }

    #[test]
    fn test_custom_support_file_skips_rename_support() {
        let facts = PlanFacts {
            custom_support_file: true,
            has_legacy_support_file: true,
            ..Default::default()
        };
        assert!(filter_steps(&facts).is_empty());
    }

    fn facts() -> impl Strategy<Value = PlanFacts> {
        (any::<[bool; 6]>()).prop_map(|b| PlanFacts {
            has_automatic_renames: b[0],
            has_manual_renames: b[1],
            has_component_testing: b[2],
            custom_support_file: b[3],
            has_legacy_support_file: b[4],
            has_legacy_config_file: b[5],
        })
    }

    proptest! {
        #[test]
        fn filtered_steps_keep_master_order(facts in facts()) {
            let steps = filter_steps(&facts);
            prop_assert!(steps.windows(2).all(|pair| pair[0] < pair[1]));
        }

        #[test]
        fn no_manual_step_without_manual_renames(mut facts in facts()) {
            facts.has_manual_renames = false;
            prop_assert!(!filter_steps(&facts).contains(&MigrationStep::RenameManual));
        }
    }
}
