//! Test fixtures and store helpers.
//!
//! Provides backends pre-seeded with the standard window layout used
//! across the test suite.

use bcnlog_core::{Config, FixedClock, Recorder};
use bcnlog_storage::{BucketId, BucketWindow, InMemoryBackend, PartitionBackend, SqliteBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Start of the scenario window.
pub const T0: i64 = 1_700_000_000;

/// Bucket covering `[T0, T0 + 3600]`.
pub const SCENARIO_BUCKET: BucketId = BucketId::new(7);

/// The window every scenario is built around.
pub fn scenario_window() -> BucketWindow {
    BucketWindow::new(SCENARIO_BUCKET, T0, T0 + 3600)
}

/// Which backend a [`TestStore`] runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// [`InMemoryBackend`].
    Memory,
    /// [`SqliteBackend`] on a temporary file.
    SqliteFile,
}

/// A seeded backend with automatic cleanup.
pub struct TestStore {
    /// The backend instance.
    pub backend: Arc<dyn PartitionBackend>,
    /// Backend kind.
    pub kind: StoreKind,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates an in-memory store seeded with `windows`.
    pub fn memory(windows: Vec<BucketWindow>) -> Self {
        Self {
            backend: Arc::new(InMemoryBackend::with_windows(windows)),
            kind: StoreKind::Memory,
            _temp_dir: None,
        }
    }

    /// Creates a SQLite store on a temporary file seeded with `windows`.
    pub fn sqlite_file(windows: Vec<BucketWindow>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = SqliteBackend::open(&temp_dir.path().join("downloads.db"))
            .expect("Failed to open SQLite backend");
        backend
            .create_window_table()
            .expect("Failed to create window table");
        for window in windows {
            backend.add_window(window).expect("Failed to add window");
        }

        Self {
            backend: Arc::new(backend),
            kind: StoreKind::SqliteFile,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Creates a store of `kind` seeded with the scenario window.
    pub fn scenario(kind: StoreKind) -> Self {
        match kind {
            StoreKind::Memory => Self::memory(vec![scenario_window()]),
            StoreKind::SqliteFile => Self::sqlite_file(vec![scenario_window()]),
        }
    }

    /// Returns the database file path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("downloads.db"))
    }

    /// Builds a recorder over this store reading time from `clock`.
    pub fn recorder(&self, config: Config, clock: Arc<FixedClock>) -> Recorder {
        Recorder::with_clock(Arc::clone(&self.backend), config, clock)
    }
}

/// Every backend kind, for tests that run against all of them.
pub const ALL_STORE_KINDS: [StoreKind; 2] = [StoreKind::Memory, StoreKind::SqliteFile];

/// Runs `f` once per backend kind against a scenario store.
pub fn for_each_store<F>(mut f: F)
where
    F: FnMut(&TestStore),
{
    for kind in ALL_STORE_KINDS {
        let store = TestStore::scenario(kind);
        f(&store);
    }
}
