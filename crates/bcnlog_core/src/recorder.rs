//! Caller-facing facade.

use crate::clock::{Clock, SystemClock};
use crate::client::ClientRegistry;
use crate::config::{Config, StoreUrl};
use crate::error::CoreResult;
use crate::record::EventRecord;
use crate::router::PartitionRouter;
use bcnlog_storage::{BucketId, NewEvent, PartitionBackend};
use std::path::Path;
use std::sync::Arc;

/// Records download events and client registrations.
///
/// One `Recorder` is built at process start around a single backend
/// handle and shared by every caller; it holds no per-call state.
///
/// ```rust
/// use bcnlog_core::{Config, FixedClock, Recorder};
/// use bcnlog_storage::{BucketId, BucketWindow, InMemoryBackend};
/// use std::sync::Arc;
///
/// let backend = Arc::new(InMemoryBackend::new());
/// backend.add_window(BucketWindow::new(BucketId::new(7), 0, 3600));
/// let recorder = Recorder::with_clock(backend, Config::default(), Arc::new(FixedClock::new(10)));
///
/// let record = recorder.generate_record("proj-A", "key-1", "1.2.3.4", "hash-xyz").unwrap();
/// assert_eq!(record.sequence_index, 1);
/// ```
pub struct Recorder {
    backend: Arc<dyn PartitionBackend>,
    router: PartitionRouter,
    clients: ClientRegistry,
    clock: Arc<dyn Clock>,
}

impl Recorder {
    /// Creates a recorder using wall-clock time.
    pub fn new(backend: Arc<dyn PartitionBackend>, config: Config) -> Self {
        Self::with_clock(backend, config, Arc::new(SystemClock))
    }

    /// Creates a recorder with an explicit time source.
    pub fn with_clock(
        backend: Arc<dyn PartitionBackend>,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            router: PartitionRouter::new(Arc::clone(&backend), &config),
            clients: ClientRegistry::new(Arc::clone(&backend)),
            backend,
            clock,
        }
    }

    /// Opens the backend named in a store URL file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the backend opened.
    pub fn open(store_file: &Path, config: Config) -> CoreResult<Self> {
        let backend = StoreUrl::from_file(store_file)?.open()?;
        Ok(Self::new(backend, config))
    }

    /// Returns the shared backend handle.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn PartitionBackend> {
        &self.backend
    }

    /// Returns the write router.
    #[must_use]
    pub fn router(&self) -> &PartitionRouter {
        &self.router
    }

    /// Records a download event at the current time.
    ///
    /// # Errors
    ///
    /// See [`PartitionRouter::write`].
    pub fn generate_record(
        &self,
        project_id: &str,
        public_key: &str,
        ip: &str,
        content_hash: &str,
    ) -> CoreResult<EventRecord> {
        self.generate_record_at(project_id, public_key, ip, content_hash, self.clock.now())
    }

    /// Records a download event as if it happened at `timestamp`.
    ///
    /// # Errors
    ///
    /// See [`PartitionRouter::write`].
    pub fn generate_record_at(
        &self,
        project_id: &str,
        public_key: &str,
        ip: &str,
        content_hash: &str,
        timestamp: i64,
    ) -> CoreResult<EventRecord> {
        let event = NewEvent::new(project_id, public_key, ip, content_hash);
        self.router.write(event, timestamp)
    }

    /// Resolves the bucket for the current time.
    ///
    /// # Errors
    ///
    /// See [`BucketResolver::resolve`](crate::BucketResolver::resolve).
    pub fn current_bucket(&self) -> CoreResult<BucketId> {
        self.router.resolver().resolve(self.clock.now())
    }

    /// Registers a client in the fixed client table.
    ///
    /// # Errors
    ///
    /// See [`ClientRegistry::register`].
    pub fn register_client(
        &self,
        public_key: &str,
        ip: &str,
        customer_id: &str,
    ) -> CoreResult<i64> {
        self.clients.register(public_key, ip, customer_id)
    }
}
