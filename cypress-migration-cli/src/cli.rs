//! CLI definition for the migration wizard.
//!
//! Only depends on `clap` and `std`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cypress-migrate - move a project from cypress.json to cypress.config.js
///
/// Walks the same steps as the interactive migration: spec renames, the
/// support file rename, the new config file and component testing setup.
#[derive(Parser, Debug)]
#[command(name = "cypress-migrate")]
#[command(version)]
#[command(about = "Migrate a Cypress project from cypress.json to cypress.config.js")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Project root (defaults to the current directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the migration steps that apply to this project
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which files move where
    Preview {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the new config file
    Config {
        /// Print the new config as JSON instead of JavaScript
        #[arg(long, conflicts_with = "legacy")]
        json: bool,
        /// Print the parsed legacy config as JSON
        #[arg(long)]
        legacy: bool,
    },
    /// Follow manual component spec moves until they are all done
    Watch {
        /// How often to check progress, in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// Rename specs and the support file, then write the new config file
    Migrate {
        /// Show what would change without touching the project
        #[arg(long)]
        dry_run: bool,
    },
}
