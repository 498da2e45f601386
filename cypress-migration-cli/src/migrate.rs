//! `cypress-migrate migrate`
//!
//! Runs the steps the tool can perform on its own, in plan order. Manual
//! component moves are listed for the user and left to `watch`.

use crate::error::Result;
use crate::preview::render_parts;
use cypress_migration::{MigrationSession, MigrationStep, RenameKind, TestingType};
use std::io::Write;
use tracing::info;

/// Perform (or with `dry_run`, describe) every automatic step
pub fn run_migrate(session: &mut MigrationSession, dry_run: bool, out: &mut dyn Write) -> Result<()> {
    let steps = session.filtered_steps()?.to_vec();

    for step in steps {
        session.set_step(step)?;
        match step {
            MigrationStep::RenameAuto => {
                if dry_run {
                    for file in session.specs_for_migration_guide()?.after {
                        writeln!(out, "would rename spec to {}", file.relative)?;
                    }
                } else {
                    for mapping in session.apply_spec_renames()? {
                        writeln!(out, "renamed {}", render_parts(&mapping.parts))?;
                    }
                }
            }
            MigrationStep::RenameManual => {
                writeln!(out, "move these component specs by hand, then run `watch`:")?;
                for mapping in session.spec_mappings()?.into_iter().filter(|m| {
                    m.testing_type == TestingType::Component
                        && m.kind == RenameKind::Manual
                        && m.requires_rename()
                }) {
                    writeln!(out, "  {} -> {}", mapping.before, mapping.after)?;
                }
            }
            MigrationStep::RenameSupport => {
                if dry_run {
                    if let Some(files) = session.support_files_for_migration_guide()? {
                        for file in files.after {
                            writeln!(out, "would rename support file to {}", file.relative)?;
                        }
                    }
                } else if let Some(mapping) = session.apply_support_file_rename()? {
                    writeln!(out, "renamed {} to {}", mapping.before, mapping.after)?;
                }
            }
            MigrationStep::ConfigFile => {
                if dry_run {
                    writeln!(out, "would write {}:", session.settings().new_config_file)?;
                    out.write_all(session.create_config_string()?.as_bytes())?;
                } else {
                    let path = session.write_new_config_file()?;
                    writeln!(out, "wrote {}", path.display())?;
                }
            }
            MigrationStep::SetupComponent => {
                writeln!(
                    out,
                    "component testing needs a dev server; add it to the component section of {}",
                    session.settings().new_config_file
                )?;
            }
        }
    }

    info!(dry_run, "migration finished");
    Ok(())
}
