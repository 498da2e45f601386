//! `cypress-migrate watch`
//!
//! Polls the session's component testing status and prints every change
//! until all manual moves are done, the folder cannot be observed or the
//! user interrupts.

use crate::error::Result;
use cypress_migration::{ComponentTestingMigrationStatus, MigrationSession};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, warn};

/// How a watch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The component folder is disabled
    Disabled,
    /// Every expected file is at its new path
    Completed,
    /// The folder could not be observed
    Failed(String),
    /// Interrupted before completion
    Interrupted,
}

/// One line per expected file, plus a progress summary
pub fn render_status(status: &ComponentTestingMigrationStatus) -> String {
    let mut text = String::new();
    for (after, file) in &status.files {
        let mark = if file.moved { 'x' } else { ' ' };
        text.push_str(&format!("[{mark}] {} -> {after}\n", file.before));
    }
    text.push_str(&format!(
        "{}/{} moved\n",
        status.moved_count(),
        status.files.len()
    ));
    text
}

/// Follow the manual moves until they finish or `interrupt` resolves
pub async fn run_watch(
    session: &mut MigrationSession,
    interval: Duration,
    interrupt: impl std::future::Future<Output = ()>,
    out: &mut dyn Write,
) -> Result<WatchOutcome> {
    tokio::pin!(interrupt);
    let mut last: Option<ComponentTestingMigrationStatus> = None;

    loop {
        let Some(status) = session.component_testing_migration_status().await? else {
            writeln!(out, "Component testing is disabled, nothing to watch")?;
            return Ok(WatchOutcome::Disabled);
        };

        if last.as_ref() != Some(&status) {
            out.write_all(render_status(&status).as_bytes())?;
            out.flush()?;
            last = Some(status.clone());
        }

        if status.completed {
            writeln!(out, "All component specs have been moved")?;
            return Ok(WatchOutcome::Completed);
        }
        if let Some(failure) = status.observation_failure {
            warn!("stopped watching: {failure}");
            writeln!(out, "Cannot follow the moves: {failure}")?;
            return Ok(WatchOutcome::Failed(failure));
        }

        tokio::select! {
            _ = &mut interrupt => {
                debug!("watch interrupted");
                session.close();
                return Ok(WatchOutcome::Interrupted);
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::open_session;
    use cypress_migration::FileMoveStatus;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_render_status() {
        let mut status = ComponentTestingMigrationStatus::default();
        status.files.insert(
            "src/A.cy.tsx".to_string(),
            FileMoveStatus {
                before: "src/A.spec.tsx".to_string(),
                moved: true,
            },
        );
        status.files.insert(
            "src/B.cy.tsx".to_string(),
            FileMoveStatus {
                before: "src/B.spec.tsx".to_string(),
                moved: false,
            },
        );
        assert_eq!(
            render_status(&status),
            "[x] src/A.spec.tsx -> src/A.cy.tsx\n[ ] src/B.spec.tsx -> src/B.cy.tsx\n1/2 moved\n"
        );
    }

    #[tokio::test]
    async fn test_disabled_component_folder() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("cypress.json"), r#"{ "componentFolder": false }"#)
            .unwrap();
        let mut session = open_session(temp.path()).unwrap();

        let mut out = Vec::new();
        let outcome = run_watch(
            &mut session,
            Duration::from_millis(10),
            std::future::pending(),
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(outcome, WatchOutcome::Disabled);
    }

    #[tokio::test]
    async fn test_nothing_left_to_move() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("cypress.json"), r#"{ "componentFolder": "src" }"#)
            .unwrap();
        touch(temp.path(), "src/Button.cy.tsx");
        let mut session = open_session(temp.path()).unwrap();

        let mut out = Vec::new();
        let outcome = run_watch(
            &mut session,
            Duration::from_millis(10),
            std::future::pending(),
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(outcome, WatchOutcome::Completed);
        assert!(String::from_utf8(out)
            .unwrap()
            .ends_with("0/0 moved\nAll component specs have been moved\n"));
    }

    #[tokio::test]
    async fn test_interrupt_stops_watching() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("cypress.json"), r#"{ "componentFolder": "src" }"#)
            .unwrap();
        touch(temp.path(), "src/Button.spec.tsx");
        let mut session = open_session(temp.path()).unwrap();

        let mut out = Vec::new();
        let outcome = run_watch(
            &mut session,
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_millis(50)),
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(outcome, WatchOutcome::Interrupted);
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("[ ] src/Button.spec.tsx -> src/Button.cy.tsx\n0/1 moved\n"));
    }
}
