//! cypress-migrate CLI.
//!
//! Commands:
//! - `cypress-migrate plan [--json]`: Show the steps that apply
//! - `cypress-migrate preview [--json]`: Show which files move where
//! - `cypress-migrate config [--json|--legacy]`: Print the new (or legacy) config
//! - `cypress-migrate watch`: Follow manual component spec moves
//! - `cypress-migrate migrate [--dry-run]`: Perform the automatic steps
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: The project cannot be migrated

use std::io;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use cypress_migrate::config::{run_config, ConfigOutput};
use cypress_migrate::migrate::run_migrate;
use cypress_migrate::plan::run_plan;
use cypress_migrate::preview::run_preview;
use cypress_migrate::project::{open_session, resolve_root};
use cypress_migrate::watch::{run_watch, WatchOutcome};
use cypress_migrate::{CliError, Cli, Commands};
use cypress_migration_common::ErrorChainExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level
    let filter = if cli.debug {
        EnvFilter::new("cypress_migrate=debug,cypress_migration=debug,cypress_migration_config=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = dispatch_command(cli).await;
    std::process::exit(exit_code);
}

/// Dispatch a parsed CLI to the appropriate command handler.
async fn dispatch_command(cli: Cli) -> i32 {
    match cli.command {
        Some(cmd) => result_to_exit(dispatch_subcommand(cmd, cli.project).await),
        None => {
            Cli::command().print_help().ok();
            println!();
            0
        }
    }
}

/// Handle an explicit subcommand.
async fn dispatch_subcommand(
    cmd: Commands,
    project: Option<std::path::PathBuf>,
) -> Result<(), CliError> {
    let root = resolve_root(project.as_deref())?;
    let mut session = open_session(&root)?;
    let mut out = io::stdout().lock();

    match cmd {
        Commands::Plan { json } => run_plan(&session, json, &mut out),
        Commands::Preview { json } => run_preview(&session, json, &mut out),
        Commands::Config { json, legacy } => {
            run_config(&session, ConfigOutput::from_flags(json, legacy), &mut out)
        }
        Commands::Watch { interval_ms } => {
            let interrupt = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            let outcome = run_watch(
                &mut session,
                Duration::from_millis(interval_ms),
                interrupt,
                &mut out,
            )
            .await?;
            match outcome {
                WatchOutcome::Failed(message) => {
                    Err(cypress_migration::MigrationError::watch(message).into())
                }
                _ => Ok(()),
            }
        }
        Commands::Migrate { dry_run } => run_migrate(&mut session, dry_run, &mut out),
    }
}

/// Convert a command result to an exit code.
fn result_to_exit(result: Result<(), CliError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!("{}", e.error_chain());
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}
