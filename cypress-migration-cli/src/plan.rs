//! `cypress-migrate plan`

use crate::error::Result;
use cypress_migration::{CustomizationFlags, MigrationSession, MigrationStep};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanOutput<'a> {
    step: MigrationStep,
    steps: &'a [MigrationStep],
    flags: CustomizationFlags,
}

/// Print the planned steps, marking the current one
pub fn run_plan(session: &MigrationSession, json: bool, out: &mut dyn Write) -> Result<()> {
    let current = session.step()?;
    let steps = session.filtered_steps()?;

    if json {
        let output = PlanOutput {
            step: current,
            steps,
            flags: session.flags()?,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    for (index, step) in steps.iter().enumerate() {
        let marker = if *step == current { '>' } else { ' ' };
        writeln!(out, "{marker} {}. {step}", index + 1)?;
    }
    Ok(())
}
