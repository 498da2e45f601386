//! Live tracking of manual component spec moves
//!
//! While the user moves component specs by hand, [`MigrationWatcher`] follows
//! filesystem events under the component folder and reports, for every
//! expected new path, whether it exists yet. Events are applied one at a time
//! in arrival order by a background task and each one triggers a fresh check
//! of the disk; each change publishes a whole
//! [`ComponentTestingMigrationStatus`] snapshot and notifies the observer.

use crate::error::Result;
use crate::fs::ProjectFs;
use crate::specs::SpecMapping;
use crate::steps::MigrationStep;
use cypress_migration_common::join_relative;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A change under the watched directory
///
/// Paths are relative to the project root and `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    /// A file appeared
    Added(String),
    /// A file disappeared
    Removed(String),
    /// The underlying watcher reported an error
    Error(String),
}

/// Handle to an open filesystem subscription
pub trait WatchSubscription: Send + Sync {
    /// Stop delivering events; calling it again does nothing
    fn close(&self);

    /// Whether [`WatchSubscription::close`] has been called
    fn is_closed(&self) -> bool;
}

/// Opens filesystem subscriptions
pub trait WatcherFactory: Send + Sync {
    /// Watch `dir` (relative to `root`) recursively
    ///
    /// Events arrive on the returned receiver, which ends once the
    /// subscription is closed.
    fn watch(
        &self,
        root: &Path,
        dir: &str,
        capacity: usize,
    ) -> Result<(Box<dyn WatchSubscription>, mpsc::Receiver<FsEvent>)>;
}

/// Receives migration progress
///
/// Called synchronously: a slow observer delays the next event.
pub trait MigrationObserver: Send + Sync {
    /// The session moved to another step
    fn on_step_changed(&self, _step: MigrationStep) {}

    /// The component spec migration status changed
    fn on_status_changed(&self, _status: &ComponentTestingMigrationStatus) {}
}

/// Progress of one expected move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMoveStatus {
    /// Legacy path of the file
    pub before: String,
    /// Whether the new path exists
    pub moved: bool,
}

/// Snapshot of the manual component spec migration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTestingMigrationStatus {
    /// Expected new path to its progress
    pub files: BTreeMap<String, FileMoveStatus>,
    /// Every expected file has moved
    pub completed: bool,
    /// Why the directory could not be observed, if it could not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_failure: Option<String>,
}

impl ComponentTestingMigrationStatus {
    /// Number of expected files already at their new path
    pub fn moved_count(&self) -> usize {
        self.files.values().filter(|file| file.moved).count()
    }
}

/// Decides which expected moves have happened
///
/// Holds no I/O: every recomputation asks `exists` about each expected path,
/// so events only say when to look again. Files that arrive inside a moved
/// directory, or before the subscription opened, are still counted.
#[derive(Debug, Clone)]
pub struct MoveTracker {
    status: ComponentTestingMigrationStatus,
}

impl MoveTracker {
    /// Track `expected` (new path to legacy path), none of it moved yet
    pub fn new(expected: BTreeMap<String, String>) -> Self {
        let files = expected
            .into_iter()
            .map(|(after, before)| {
                (
                    after,
                    FileMoveStatus {
                        before,
                        moved: false,
                    },
                )
            })
            .collect();
        let mut tracker = Self {
            status: ComponentTestingMigrationStatus {
                files,
                ..Default::default()
            },
        };
        tracker.refresh(|_| false);
        tracker
    }

    /// Current status
    pub fn status(&self) -> &ComponentTestingMigrationStatus {
        &self.status
    }

    /// Apply one event, returning a snapshot when the status changed
    pub fn apply(
        &mut self,
        event: &FsEvent,
        exists: impl Fn(&str) -> bool,
    ) -> Option<ComponentTestingMigrationStatus> {
        match event {
            FsEvent::Added(_) | FsEvent::Removed(_) => self.refresh(exists),
            FsEvent::Error(message) => self.fail(message.clone()),
        }
    }

    /// Mark each expected path moved exactly when `exists` says it is there
    ///
    /// Returns a snapshot when anything changed.
    pub fn refresh(
        &mut self,
        exists: impl Fn(&str) -> bool,
    ) -> Option<ComponentTestingMigrationStatus> {
        let mut changed = false;
        for (after, file) in self.status.files.iter_mut() {
            let moved = exists(after);
            if file.moved != moved {
                file.moved = moved;
                changed = true;
            }
        }
        let completed = self.status.files.values().all(|file| file.moved);
        if self.status.completed != completed {
            self.status.completed = completed;
            changed = true;
        }
        changed.then(|| self.status.clone())
    }

    /// Record that observation failed, returning a snapshot when that is news
    pub fn fail(&mut self, message: String) -> Option<ComponentTestingMigrationStatus> {
        if self.status.observation_failure.as_deref() == Some(message.as_str()) {
            return None;
        }
        self.status.observation_failure = Some(message);
        Some(self.status.clone())
    }
}

/// Watches the component folder until every expected move happened
///
/// Starting requires a tokio runtime. Closing (or dropping) the watcher
/// closes the subscription; closing twice does nothing. Losing the component
/// folder is an observation failure and ends the watch.
pub struct MigrationWatcher {
    status: Arc<RwLock<ComponentTestingMigrationStatus>>,
    subscription: Option<Arc<dyn WatchSubscription>>,
    handle: Option<JoinHandle<()>>,
}

impl MigrationWatcher {
    /// Start watching `folder` for the manual renames in `mappings`
    ///
    /// Mappings that keep their path are ignored. With nothing left to
    /// expect, or everything already in place, the watcher is complete at
    /// once and no subscription is opened. A subscription that cannot be
    /// opened is reported in the status, not as an error.
    pub fn start(
        project_root: &Path,
        folder: &str,
        mappings: &[SpecMapping],
        fs: Arc<dyn ProjectFs>,
        factory: &dyn WatcherFactory,
        capacity: usize,
        observer: Option<Arc<dyn MigrationObserver>>,
    ) -> Self {
        let expected: BTreeMap<String, String> = mappings
            .iter()
            .filter(|mapping| mapping.requires_rename())
            .map(|mapping| (mapping.after.clone(), mapping.before.clone()))
            .collect();
        let root = project_root.to_path_buf();
        let exists = move |relative: &str| fs.exists(&join_relative(&root, relative));

        let mut tracker = MoveTracker::new(expected);
        tracker.refresh(&exists);
        debug!(
            "watching {} expected moves in {folder}, {} already done",
            tracker.status().files.len(),
            tracker.status().moved_count()
        );

        if tracker.status().completed {
            return Self::finished(tracker.status().clone());
        }

        let (subscription, mut events) = match factory.watch(project_root, folder, capacity) {
            Ok((subscription, events)) => (Arc::<dyn WatchSubscription>::from(subscription), events),
            Err(e) => {
                warn!("cannot watch {folder}: {e}");
                let failure = format!("Cannot watch {folder}: {e}");
                let status = tracker.fail(failure).unwrap_or_else(|| tracker.status().clone());
                return Self::finished(status);
            }
        };

        let status = Arc::new(RwLock::new(tracker.status().clone()));
        let shared = Arc::clone(&status);
        let task_subscription = Arc::clone(&subscription);
        let folder = folder.to_string();

        let handle = tokio::spawn(async move {
            // Moves made before the subscription opened produce no events.
            if let Some(snapshot) = tracker.refresh(&exists) {
                publish(&shared, &snapshot, observer.as_deref()).await;
                if snapshot.completed {
                    info!("all component specs moved, closing watcher");
                    task_subscription.close();
                    return;
                }
            }

            while let Some(event) = events.recv().await {
                if !exists(folder.as_str()) {
                    warn!("{folder} disappeared, closing watcher");
                    if let Some(snapshot) = tracker.fail(format!("{folder} is no longer available"))
                    {
                        publish(&shared, &snapshot, observer.as_deref()).await;
                    }
                    task_subscription.close();
                    return;
                }

                let Some(snapshot) = tracker.apply(&event, &exists) else {
                    continue;
                };
                publish(&shared, &snapshot, observer.as_deref()).await;

                if snapshot.completed {
                    info!("all component specs moved, closing watcher");
                    task_subscription.close();
                    return;
                }
            }

            if !task_subscription.is_closed() {
                warn!("filesystem event stream ended before the migration completed");
                if let Some(snapshot) =
                    tracker.fail("Filesystem event stream ended unexpectedly".to_string())
                {
                    publish(&shared, &snapshot, observer.as_deref()).await;
                }
            }
        });

        Self {
            status,
            subscription: Some(subscription),
            handle: Some(handle),
        }
    }

    fn finished(status: ComponentTestingMigrationStatus) -> Self {
        Self {
            status: Arc::new(RwLock::new(status)),
            subscription: None,
            handle: None,
        }
    }

    /// Latest status snapshot
    pub async fn status(&self) -> ComponentTestingMigrationStatus {
        self.status.read().await.clone()
    }

    /// Whether a subscription is still open
    pub fn is_watching(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|subscription| !subscription.is_closed())
    }

    /// Stop watching
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for MigrationWatcher {
    fn drop(&mut self) {
        self.close();
    }
}

async fn publish(
    shared: &RwLock<ComponentTestingMigrationStatus>,
    snapshot: &ComponentTestingMigrationStatus,
    observer: Option<&dyn MigrationObserver>,
) {
    *shared.write().await = snapshot.clone();
    if let Some(observer) = observer {
        observer.on_status_changed(snapshot);
    }
}
