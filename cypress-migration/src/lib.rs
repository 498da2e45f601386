//! # Cypress config migration
//!
//! Moves a project from the legacy `cypress.json` schema to the
//! `cypress.config.js` schema with separate `e2e` and `component` testing
//! types.
//!
//! - [`detect`] - which optional customizations the legacy config uses
//! - [`steps`] - which wizard steps apply, in their fixed order
//! - [`specs`] - where each spec moves and how to preview the rename
//! - [`watcher`] - live progress while the user moves component specs
//! - [`synthesize`] - the new config, as data and as source text
//! - [`session`] - one migration attempt tying it all together
//!
//! Disk access goes through [`ProjectFs`] and filesystem events through
//! [`WatcherFactory`]; [`LocalFs`] and [`NotifyWatcherFactory`] implement them
//! for the local disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use cypress_migration::MigrationSession;
//! use cypress_migration_config::load_settings;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = Path::new(".");
//! let mut session = MigrationSession::for_project(root, load_settings(root)?);
//! let first = session.initialize()?;
//! println!("starting at {first}");
//! println!("{}", session.create_config_string()?);
//! # Ok(())
//! # }
//! ```

pub mod detect;
pub mod error;
pub mod fs;
pub mod legacy;
pub mod notify_watcher;
pub mod session;
pub mod specs;
pub mod steps;
pub mod synthesize;
pub mod watcher;

pub use detect::{detect, CustomizationFlags};
pub use error::{MigrationError, Result};
pub use fs::{LocalFs, ProjectFs};
pub use legacy::{FileSetting, LegacyConfig, TestingType};
pub use notify_watcher::NotifyWatcherFactory;
pub use session::{MigrationSession, ProjectContext};
pub use specs::{
    discover_specs, map_specs, support_file_mapping, DiscoveredSpec, FilePart, FilesForMigration,
    MigrationFile, PartKind, RenameKind, SpecMapping,
};
pub use steps::{filter_steps, plan, MigrationStep, PlanFacts};
pub use synthesize::{render, synthesize, to_json, NewConfig, TestingTypeConfig};
pub use watcher::{
    ComponentTestingMigrationStatus, FileMoveStatus, FsEvent, MigrationObserver,
    MigrationWatcher, MoveTracker, WatchSubscription, WatcherFactory,
};
