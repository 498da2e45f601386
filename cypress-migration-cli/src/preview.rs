//! `cypress-migrate preview`

use crate::error::Result;
use cypress_migration::{
    FilePart, FilesForMigration, MigrationSession, PartKind, RenameKind, SpecMapping, TestingType,
};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewOutput {
    specs: FilesForMigration,
    manual: Vec<SpecMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    support_file: Option<FilesForMigration>,
}

/// Render parts word-diff style: `[-removed-]` and `{+added+}`
pub fn render_parts(parts: &[FilePart]) -> String {
    parts
        .iter()
        .map(|part| match part.kind {
            PartKind::Unchanged => part.text.clone(),
            PartKind::Removed => format!("[-{}-]", part.text),
            PartKind::Added => format!("{{+{}+}}", part.text),
        })
        .collect()
}

/// Print every rename the migration would perform or ask for
pub fn run_preview(session: &MigrationSession, json: bool, out: &mut dyn Write) -> Result<()> {
    let (automatic, manual): (Vec<SpecMapping>, Vec<SpecMapping>) = session
        .spec_mappings()?
        .into_iter()
        .filter(|m| m.requires_rename())
        .filter(|m| m.kind == RenameKind::Automatic || m.testing_type == TestingType::Component)
        .partition(|m| m.kind == RenameKind::Automatic);
    let support_file = session.support_files_for_migration_guide()?;

    if json {
        let output = PreviewOutput {
            specs: session.specs_for_migration_guide()?,
            manual,
            support_file,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    write_section(out, "Specs renamed automatically", &automatic)?;
    write_section(out, "Component specs to move by hand", &manual)?;
    if let Some(files) = support_file {
        writeln!(out, "Support file")?;
        for (before, after) in files.before.iter().zip(&files.after) {
            writeln!(out, "  {} -> {}", before.relative, after.relative)?;
        }
    }
    Ok(())
}

fn write_section(out: &mut dyn Write, title: &str, mappings: &[SpecMapping]) -> Result<()> {
    if mappings.is_empty() {
        return Ok(());
    }
    writeln!(out, "{title}")?;
    for mapping in mappings {
        writeln!(out, "  {}", render_parts(&mapping.parts))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::open_session;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_render_parts() {
        let mapping = SpecMapping::new(
            TestingType::E2e,
            "cypress/integration/foo.spec.js",
            "cypress/e2e/foo.cy.js",
            RenameKind::Automatic,
        );
        assert_eq!(
            render_parts(&mapping.parts),
            "cypress/[-integration/foo.spec.js-]{+e2e/foo.cy.js+}"
        );
    }

    #[test]
    fn test_text_preview() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "cypress.json", r#"{ "componentFolder": "src" }"#);
        touch(temp.path(), "cypress/integration/a.spec.js", "");
        touch(temp.path(), "src/Button.spec.tsx", "");
        touch(temp.path(), "cypress/support/index.js", "");

        let session = open_session(temp.path()).unwrap();
        let mut out = Vec::new();
        run_preview(&session, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Specs renamed automatically\n  cypress/[-integration/a.spec.js-]{+e2e/a.cy.js+}\n"));
        assert!(text.contains("Component specs to move by hand\n"));
        assert!(text.contains("src/[-Button.spec.tsx-]{+Button.cy.tsx+}"));
        assert!(text.contains("Support file\n  cypress/support/index.js -> cypress/support/e2e.js\n"));
    }

    #[test]
    fn test_json_preview() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "cypress.json", "{}");
        touch(temp.path(), "cypress/integration/a.spec.js", "");

        let session = open_session(temp.path()).unwrap();
        let mut out = Vec::new();
        run_preview(&session, true, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["specs"]["after"][0]["relative"], "cypress/e2e/a.cy.js");
        assert_eq!(value["manual"].as_array().unwrap().len(), 0);
        assert!(value.get("supportFile").is_none());
    }
}
