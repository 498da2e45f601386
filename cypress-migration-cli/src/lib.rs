//! cypress-migrate - command-line front end for the Cypress config migration.
//!
//! Each subcommand opens a [`cypress_migration::MigrationSession`] on the
//! project, initializes it and runs one view or action of the wizard:
//!
//! - `plan` - the steps that apply, with the current one marked
//! - `preview` - every rename, as a word diff
//! - `config` - the new config file, its JSON form or the legacy config
//! - `watch` - live progress of the manual component spec moves
//! - `migrate` - perform the automatic steps, or describe them with `--dry-run`

pub mod cli;
pub mod config;
pub mod error;
pub mod migrate;
pub mod plan;
pub mod preview;
pub mod project;
pub mod watch;

pub use cli::{Cli, Commands};
pub use error::{CliError, Result, CANNOT_MIGRATE_EXIT_CODE};
