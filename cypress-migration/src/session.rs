//! The migration session
//!
//! One [`MigrationSession`] drives one migration attempt for one project. It
//! parses the legacy config once, plans the steps, holds the current step
//! and answers every query of the wizard from the cached config.

use crate::detect::{self, CustomizationFlags};
use crate::error::{MigrationError, Result};
use crate::fs::{LocalFs, ProjectFs};
use crate::legacy::{LegacyConfig, TestingType};
use crate::notify_watcher::NotifyWatcherFactory;
use crate::specs::{
    discover_specs, map_specs, support_file_mapping, FilesForMigration, RenameKind, SpecMapping,
};
use crate::steps::{self, MigrationStep};
use crate::synthesize::{self, NewConfig};
use crate::watcher::{
    ComponentTestingMigrationStatus, MigrationObserver, MigrationWatcher, WatcherFactory,
};
use cypress_migration_common::{join_relative, Pretty};
use cypress_migration_config::MigrationSettings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// What the session knows about the project it migrates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectContext {
    /// Project root, unset until a project is opened
    pub root: Option<PathBuf>,
    /// Whether the legacy config file exists
    pub has_legacy_config_file: bool,
}

impl ProjectContext {
    /// Context for the project at `root`, probing for the legacy config file
    pub fn detect(root: impl Into<PathBuf>, settings: &MigrationSettings) -> Self {
        let root = root.into();
        let has_legacy_config_file = join_relative(&root, &settings.legacy_config_file).is_file();
        Self {
            root: Some(root),
            has_legacy_config_file,
        }
    }
}

/// State that exists once `initialize()` succeeded
#[derive(Debug, Clone)]
struct Plan {
    flags: CustomizationFlags,
    steps: Vec<MigrationStep>,
    step: MigrationStep,
}

/// A migration in progress
pub struct MigrationSession {
    context: ProjectContext,
    fs: Arc<dyn ProjectFs>,
    watcher_factory: Arc<dyn WatcherFactory>,
    settings: MigrationSettings,
    observer: Option<Arc<dyn MigrationObserver>>,
    config: Option<LegacyConfig>,
    plan: Option<Plan>,
    watcher: Option<MigrationWatcher>,
}

impl std::fmt::Debug for MigrationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationSession")
            .field("context", &self.context)
            .field("settings", &self.settings)
            .field("config", &self.config)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl MigrationSession {
    /// Session over the given collaborators
    pub fn new(
        context: ProjectContext,
        fs: Arc<dyn ProjectFs>,
        watcher_factory: Arc<dyn WatcherFactory>,
        settings: MigrationSettings,
    ) -> Self {
        Self {
            context,
            fs,
            watcher_factory,
            settings,
            observer: None,
            config: None,
            plan: None,
            watcher: None,
        }
    }

    /// Session for a project on the local disk
    pub fn for_project(root: impl Into<PathBuf>, settings: MigrationSettings) -> Self {
        let context = ProjectContext::detect(root, &settings);
        let fs = Arc::new(LocalFs::with_settings(&settings));
        Self::new(context, fs, Arc::new(NotifyWatcherFactory::new()), settings)
    }

    /// Register the single observer, replacing any previous one
    pub fn set_observer(&mut self, observer: Arc<dyn MigrationObserver>) {
        self.observer = Some(observer);
    }

    /// Parse the legacy config, detect customizations and plan the steps
    ///
    /// Drops any previously cached config and closes a running watcher; the
    /// watcher is not reopened afterwards. On success the current step is the
    /// first planned one.
    pub fn initialize(&mut self) -> Result<MigrationStep> {
        let root = self.root()?.to_path_buf();

        self.close();
        self.plan = None;
        self.config = None;
        self.parse_config()?;
        let config = self.cached_config()?;

        let flags = detect::detect(config, self.fs.as_ref(), &root)?;
        let planned = steps::plan(
            &root,
            config,
            &flags,
            self.fs.as_ref(),
            self.context.has_legacy_config_file,
        )?;
        let first = *planned.first().ok_or(MigrationError::NoApplicableSteps)?;

        self.plan = Some(Plan {
            flags,
            steps: planned,
            step: first,
        });
        info!("migration initialized at step {first}");
        self.notify_step(first);
        Ok(first)
    }

    /// Drop the cached legacy config and read it again
    ///
    /// Flags and planned steps keep the values computed by `initialize()`.
    pub fn invalidate_config_cache(&mut self) -> Result<()> {
        self.config = None;
        self.parse_config().map(|_| ())
    }

    /// Parse the legacy config, or return the cached copy
    ///
    /// Without a legacy config file the config is empty.
    pub fn parse_config(&mut self) -> Result<&LegacyConfig> {
        if self.config.is_none() {
            let config = self.read_config()?;
            debug!("legacy config: {}", Pretty(&config));
            self.config = Some(config);
        }
        self.cached_config()
    }

    fn read_config(&self) -> Result<LegacyConfig> {
        if !self.context.has_legacy_config_file {
            debug!("no legacy config file, using an empty config");
            return Ok(LegacyConfig::default());
        }
        let path = join_relative(self.root()?, &self.settings.legacy_config_file);
        let value = self
            .fs
            .read_structured_file(&path)
            .map_err(|source| MigrationError::ConfigRead {
                path: path.clone(),
                source: Box::new(source),
            })?;
        LegacyConfig::from_value(value).map_err(|source| MigrationError::ConfigRead {
            path,
            source: Box::new(source),
        })
    }

    fn cached_config(&self) -> Result<&LegacyConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| MigrationError::precondition("legacy config has not been parsed"))
    }

    fn root(&self) -> Result<&Path> {
        self.context
            .root
            .as_deref()
            .ok_or_else(|| MigrationError::precondition("cannot do migration without a project"))
    }

    fn plan(&self) -> Result<&Plan> {
        self.plan
            .as_ref()
            .ok_or_else(|| MigrationError::precondition("migration has not been initialized"))
    }

    /// Root and cached config of an initialized session
    fn ready(&self) -> Result<(&Path, &LegacyConfig)> {
        self.plan()?;
        Ok((self.root()?, self.cached_config()?))
    }

    /// Current step
    pub fn step(&self) -> Result<MigrationStep> {
        Ok(self.plan()?.step)
    }

    /// Move to `step`, which must be one of the planned steps
    pub fn set_step(&mut self, step: MigrationStep) -> Result<()> {
        let plan = self
            .plan
            .as_mut()
            .ok_or_else(|| MigrationError::precondition("migration has not been initialized"))?;
        if !plan.steps.contains(&step) {
            return Err(MigrationError::InvalidTransition { step });
        }
        if plan.step != step {
            plan.step = step;
            debug!("migration step is now {step}");
            self.notify_step(step);
        }
        Ok(())
    }

    /// The planned steps, in master order
    pub fn filtered_steps(&self) -> Result<&[MigrationStep]> {
        Ok(&self.plan()?.steps)
    }

    /// The step after the current one, if any
    pub fn next_step(&self) -> Result<Option<MigrationStep>> {
        let plan = self.plan()?;
        Ok(plan
            .steps
            .iter()
            .skip_while(|step| **step != plan.step)
            .nth(1)
            .copied())
    }

    /// Customizations detected at initialization
    pub fn flags(&self) -> Result<CustomizationFlags> {
        Ok(self.plan()?.flags.clone())
    }

    /// Project root
    pub fn project_root(&self) -> Option<&Path> {
        self.context.root.as_deref()
    }

    /// The tool settings in use
    pub fn settings(&self) -> &MigrationSettings {
        &self.settings
    }

    /// The cached legacy config
    pub fn legacy_config(&self) -> Result<&LegacyConfig> {
        Ok(self.ready()?.1)
    }

    /// Integration folder, `None` when set to `false`
    pub fn integration_folder(&self) -> Result<Option<String>> {
        Ok(self.ready()?.1.integration_folder())
    }

    /// Component folder, `None` when set to `false`
    pub fn component_folder(&self) -> Result<Option<String>> {
        Ok(self.ready()?.1.component_folder())
    }

    /// e2e `testFiles` globs
    pub fn integration_test_files(&self) -> Result<Vec<String>> {
        Ok(self.ready()?.1.test_files(TestingType::E2e))
    }

    /// component `testFiles` globs
    pub fn component_test_files(&self) -> Result<Vec<String>> {
        Ok(self.ready()?.1.test_files(TestingType::Component))
    }

    /// The legacy support file, or where it would be
    pub fn default_legacy_support_file(&self) -> Result<String> {
        let (root, _) = self.ready()?;
        Ok(detect::default_legacy_support_file(self.fs.as_ref(), root))
    }

    /// Every discovered spec with its new location
    pub fn spec_mappings(&self) -> Result<Vec<SpecMapping>> {
        let (root, config) = self.ready()?;
        let specs = discover_specs(config, self.fs.as_ref(), root)?;
        Ok(map_specs(&specs, config))
    }

    /// Automatic renames that change a path
    fn automatic_renames(&self) -> Result<Vec<SpecMapping>> {
        Ok(self
            .spec_mappings()?
            .into_iter()
            .filter(|m| m.kind == RenameKind::Automatic && m.requires_rename())
            .collect())
    }

    /// Before and after lists for the automatic rename step
    ///
    /// Empty when e2e testing is disabled.
    pub fn specs_for_migration_guide(&self) -> Result<FilesForMigration> {
        if self.integration_folder()?.is_none() {
            return Ok(FilesForMigration::default());
        }
        Ok(FilesForMigration::from_mappings(&self.automatic_renames()?))
    }

    /// The support file rename, `None` when there is nothing to rename
    pub fn support_files_for_migration_guide(&self) -> Result<Option<FilesForMigration>> {
        Ok(self
            .support_file_rename()?
            .map(|mapping| FilesForMigration::from_mappings([&mapping])))
    }

    fn support_file_rename(&self) -> Result<Option<SpecMapping>> {
        let (root, _) = self.ready()?;
        if self.plan()?.flags.custom_support_file {
            return Ok(None);
        }
        Ok(detect::find_legacy_support_file(self.fs.as_ref(), root)
            .and_then(|legacy| support_file_mapping(&legacy)))
    }

    /// Progress of the manual component spec moves
    ///
    /// The first call starts the watcher; later calls return its latest
    /// snapshot, also once the watcher has been closed. A session opens at
    /// most one watcher. `None` when the component folder is disabled.
    pub async fn component_testing_migration_status(
        &mut self,
    ) -> Result<Option<ComponentTestingMigrationStatus>> {
        let Some(folder) = self.component_folder()? else {
            return Ok(None);
        };

        if self.watcher.is_none() {
            let root = self.root()?.to_path_buf();
            let manual: Vec<SpecMapping> = self
                .spec_mappings()?
                .into_iter()
                .filter(|m| m.testing_type == TestingType::Component && m.kind == RenameKind::Manual)
                .collect();
            let watcher = MigrationWatcher::start(
                &root,
                &folder,
                &manual,
                Arc::clone(&self.fs),
                self.watcher_factory.as_ref(),
                self.settings.watch_channel_capacity,
                self.observer.clone(),
            );
            self.watcher = Some(watcher);
        }

        match &self.watcher {
            Some(watcher) => Ok(Some(watcher.status().await)),
            None => Ok(None),
        }
    }

    /// The legacy config as pretty-printed JSON
    pub fn legacy_config_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.legacy_config()?)?)
    }

    /// The synthesized new config
    pub fn new_config(&self) -> Result<NewConfig> {
        let (_, config) = self.ready()?;
        Ok(synthesize::synthesize(config, &self.plan()?.flags))
    }

    /// The synthesized new config as pretty-printed JSON
    pub fn new_config_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&synthesize::to_json(
            &self.new_config()?,
        ))?)
    }

    /// Source text of the new config file
    pub fn create_config_string(&self) -> Result<String> {
        Ok(synthesize::render(&self.new_config()?))
    }

    /// Perform the automatic spec renames
    ///
    /// Stops at the first failure; renames already done stay done.
    pub fn apply_spec_renames(&self) -> Result<Vec<SpecMapping>> {
        let root = self.root()?;
        let renames = self.automatic_renames()?;
        for mapping in &renames {
            self.fs.rename(
                &join_relative(root, &mapping.before),
                &join_relative(root, &mapping.after),
            )?;
        }
        info!("renamed {} specs", renames.len());
        Ok(renames)
    }

    /// Rename the legacy support file, if there is one to rename
    pub fn apply_support_file_rename(&self) -> Result<Option<SpecMapping>> {
        let root = self.root()?;
        let Some(mapping) = self.support_file_rename()? else {
            return Ok(None);
        };
        self.fs.rename(
            &join_relative(root, &mapping.before),
            &join_relative(root, &mapping.after),
        )?;
        info!("renamed {} to {}", mapping.before, mapping.after);
        Ok(Some(mapping))
    }

    /// Write the new config file next to the legacy one
    pub fn write_new_config_file(&self) -> Result<PathBuf> {
        let contents = self.create_config_string()?;
        let path = join_relative(self.root()?, &self.settings.new_config_file);
        self.fs.write_file(&path, &contents)?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    /// Close the watcher, if one is running
    ///
    /// The closed watcher keeps its last snapshot.
    pub fn close(&mut self) {
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.close();
        }
    }

    fn notify_step(&self, step: MigrationStep) {
        if let Some(observer) = &self.observer {
            observer.on_step_changed(step);
        }
    }
}

impl Drop for MigrationSession {
    fn drop(&mut self) {
        self.close();
    }
}
