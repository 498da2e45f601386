//! `cypress-migrate config`

use crate::error::Result;
use cypress_migration::MigrationSession;
use std::io::Write;

/// Which rendition of the config to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOutput {
    /// The new `cypress.config.js` source
    Module,
    /// The new config as JSON
    Json,
    /// The parsed legacy config as JSON
    Legacy,
}

impl ConfigOutput {
    /// Pick the output from the command flags
    pub fn from_flags(json: bool, legacy: bool) -> Self {
        match (json, legacy) {
            (_, true) => ConfigOutput::Legacy,
            (true, false) => ConfigOutput::Json,
            (false, false) => ConfigOutput::Module,
        }
    }
}

/// Print the config in the requested form
pub fn run_config(session: &MigrationSession, output: ConfigOutput, out: &mut dyn Write) -> Result<()> {
    let text = match output {
        ConfigOutput::Module => session.create_config_string()?,
        ConfigOutput::Json => session.new_config_json()? + "\n",
        ConfigOutput::Legacy => session.legacy_config_json()? + "\n",
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}
