//! [`WatcherFactory`] built on `notify`

use crate::error::{MigrationError, Result};
use crate::watcher::{FsEvent, WatchSubscription, WatcherFactory};
use cypress_migration_common::{join_relative, to_relative_string};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Opens recursive `notify` watches on the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatcherFactory;

impl NotifyWatcherFactory {
    /// Create a factory
    pub fn new() -> Self {
        Self
    }
}

impl WatcherFactory for NotifyWatcherFactory {
    fn watch(
        &self,
        root: &Path,
        dir: &str,
        capacity: usize,
    ) -> Result<(Box<dyn WatchSubscription>, mpsc::Receiver<FsEvent>)> {
        let root = root.canonicalize()?;
        let watched = join_relative(&root, dir);
        if !watched.is_dir() {
            return Err(MigrationError::watch(format!(
                "{} is not a directory",
                watched.display()
            )));
        }

        let (tx, rx) = mpsc::channel(capacity);
        let event_root = root.clone();
        let mut watcher = RecommendedWatcher::new(
            move |result: std::result::Result<Event, notify::Error>| {
                let events = match result {
                    Ok(event) => fs_events(&event, &event_root),
                    Err(e) => vec![FsEvent::Error(e.to_string())],
                };
                for event in events {
                    if let Err(e) = tx.blocking_send(event) {
                        tracing::debug!("Dropping file watch event: {}", e);
                        return;
                    }
                }
            },
            notify::Config::default(),
        )
        .map_err(|e| MigrationError::watch(format!("Failed to create file watcher: {e}")))?;

        watcher
            .watch(&watched, RecursiveMode::Recursive)
            .map_err(|e| {
                MigrationError::watch(format!("Failed to watch {}: {e}", watched.display()))
            })?;
        tracing::info!("Watching directory: {}", watched.display());

        let subscription = NotifySubscription {
            watcher: Mutex::new(Some(watcher)),
            closed: AtomicBool::new(false),
            watched,
        };
        Ok((Box::new(subscription), rx))
    }
}

/// Keeps a `notify` watcher alive until closed
struct NotifySubscription {
    watcher: Mutex<Option<RecommendedWatcher>>,
    closed: AtomicBool,
    watched: PathBuf,
}

impl WatchSubscription for NotifySubscription {
    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        // Dropping the watcher drops the sender and ends the event stream.
        let watcher = match self.watcher.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(watcher);
        tracing::info!("Stopped watching {}", self.watched.display());
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Translate a `notify` event into project-relative add and remove events
///
/// Paths outside `root` are skipped. Renames become a remove of the old
/// name and an add of the new one; an ambiguous rename is resolved by
/// checking whether the path still exists.
pub fn fs_events(event: &Event, root: &Path) -> Vec<FsEvent> {
    let relative = |path: &PathBuf| to_relative_string(root, path);

    match event.kind {
        EventKind::Create(_) => event.paths.iter().filter_map(relative).map(FsEvent::Added).collect(),
        EventKind::Remove(_) => event
            .paths
            .iter()
            .filter_map(relative)
            .map(FsEvent::Removed)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => event
            .paths
            .iter()
            .filter_map(relative)
            .map(FsEvent::Removed)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .iter()
            .filter_map(relative)
            .map(FsEvent::Added)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut events = Vec::with_capacity(2);
            if let Some(from) = event.paths.first().and_then(relative) {
                events.push(FsEvent::Removed(from));
            }
            if let Some(to) = event.paths.get(1).and_then(relative) {
                events.push(FsEvent::Added(to));
            }
            events
        }
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .filter_map(|path| {
                let rel = relative(path)?;
                Some(if path.exists() {
                    FsEvent::Added(rel)
                } else {
                    FsEvent::Removed(rel)
                })
            })
            .collect(),
        _ => {
            tracing::trace!("Ignoring event type: {:?}", event.kind);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};
    use std::time::Duration;
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, path| event.add_path(PathBuf::from(path)))
    }

    #[test]
    fn test_create_and_remove() {
        let root = Path::new("/project");
        assert_eq!(
            fs_events(
                &event(EventKind::Create(CreateKind::File), &["/project/src/A.cy.tsx"]),
                root
            ),
            vec![FsEvent::Added("src/A.cy.tsx".into())]
        );
        assert_eq!(
            fs_events(
                &event(EventKind::Remove(RemoveKind::File), &["/project/src/A.spec.tsx"]),
                root
            ),
            vec![FsEvent::Removed("src/A.spec.tsx".into())]
        );
    }

    #[test]
    fn test_rename_both() {
        let root = Path::new("/project");
        let rename = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/project/src/A.spec.tsx", "/project/src/A.cy.tsx"],
        );
        assert_eq!(
            fs_events(&rename, root),
            vec![
                FsEvent::Removed("src/A.spec.tsx".into()),
                FsEvent::Added("src/A.cy.tsx".into()),
            ]
        );
    }

    #[test]
    fn test_paths_outside_root_and_other_kinds_are_ignored() {
        let root = Path::new("/project");
        assert!(fs_events(
            &event(EventKind::Create(CreateKind::File), &["/elsewhere/A.cy.tsx"]),
            root
        )
        .is_empty());
        assert!(fs_events(
            &event(EventKind::Access(notify::event::AccessKind::Any), &["/project/a.js"]),
            root
        )
        .is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = NotifyWatcherFactory::new().watch(temp.path(), "cypress/component", 10);
        assert!(matches!(result, Err(MigrationError::Watch { .. })));
    }

    #[tokio::test]
    async fn test_watch_reports_new_file_and_close_is_idempotent() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();

        let (subscription, mut events) = NotifyWatcherFactory::new()
            .watch(temp.path(), "src", 10)
            .unwrap();

        std::fs::write(temp.path().join("src/A.cy.tsx"), "").unwrap();

        let added = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = events.recv().await {
                if event == FsEvent::Added("src/A.cy.tsx".into()) {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap_or(false);
        assert!(added);

        subscription.close();
        subscription.close();
        assert!(subscription.is_closed());

        let ended = tokio::time::timeout(Duration::from_secs(5), async {
            while events.recv().await.is_some() {}
        })
        .await;
        assert!(ended.is_ok());
    }
}
