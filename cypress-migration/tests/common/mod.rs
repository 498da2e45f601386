//! Shared fixtures for the migration integration tests

#![allow(dead_code)]

use cypress_migration::{
    ComponentTestingMigrationStatus, FsEvent, LocalFs, MigrationError, MigrationObserver,
    MigrationStep, ProjectFs, WatchSubscription, WatcherFactory,
};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// A project directory with the given files, each holding `contents`
pub fn project_with(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (relative, contents) in files {
        let path = temp.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    temp
}

/// [`LocalFs`] that counts structured reads
#[derive(Default)]
pub struct CountingFs {
    inner: LocalFs,
    reads: AtomicUsize,
}

impl CountingFs {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ProjectFs for CountingFs {
    fn read_structured_file(&self, path: &Path) -> Result<Value, MigrationError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_structured_file(path)
    }

    fn list_files(&self, dir: &Path, globs: &[String]) -> Result<Vec<String>, MigrationError> {
        self.inner.list_files(dir, globs)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), MigrationError> {
        self.inner.rename(from, to)
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), MigrationError> {
        self.inner.write_file(path, contents)
    }
}

/// Subscription that counts effective closes
pub struct FakeSubscription {
    closed: AtomicBool,
    closes: Arc<AtomicUsize>,
}

impl WatchSubscription for FakeSubscription {
    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Watcher factory whose events are sent by the test
#[derive(Default)]
pub struct FakeWatcherFactory {
    sender: Mutex<Option<mpsc::Sender<FsEvent>>>,
    watches: AtomicUsize,
    closes: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeWatcherFactory {
    /// A factory that refuses to watch
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Sender for the most recent subscription
    pub fn sender(&self) -> mpsc::Sender<FsEvent> {
        self.sender
            .lock()
            .unwrap()
            .clone()
            .expect("no subscription was opened")
    }

    /// Forget the sender so the event stream can end
    pub fn drop_sender(&self) {
        self.sender.lock().unwrap().take();
    }

    pub fn watches(&self) -> usize {
        self.watches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl WatcherFactory for FakeWatcherFactory {
    fn watch(
        &self,
        _root: &Path,
        dir: &str,
        capacity: usize,
    ) -> Result<(Box<dyn WatchSubscription>, mpsc::Receiver<FsEvent>), MigrationError> {
        self.watches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MigrationError::watch(format!("{dir} is not watchable")));
        }
        let (tx, rx) = mpsc::channel(capacity);
        *self.sender.lock().unwrap() = Some(tx);
        let subscription = FakeSubscription {
            closed: AtomicBool::new(false),
            closes: Arc::clone(&self.closes),
        };
        Ok((Box::new(subscription), rx))
    }
}

/// Observer that records everything it is told
#[derive(Default)]
pub struct RecordingObserver {
    pub steps: Mutex<Vec<MigrationStep>>,
    pub statuses: Mutex<Vec<ComponentTestingMigrationStatus>>,
}

impl RecordingObserver {
    pub fn steps(&self) -> Vec<MigrationStep> {
        self.steps.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<ComponentTestingMigrationStatus> {
        self.statuses.lock().unwrap().clone()
    }
}

impl MigrationObserver for RecordingObserver {
    fn on_step_changed(&self, step: MigrationStep) {
        self.steps.lock().unwrap().push(step);
    }

    fn on_status_changed(&self, status: &ComponentTestingMigrationStatus) {
        self.statuses.lock().unwrap().push(status.clone());
    }
}
