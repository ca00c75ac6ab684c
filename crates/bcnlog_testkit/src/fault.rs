//! Fault injection for partition backends.
//!
//! [`FaultyBackend`] wraps a real backend, fails scripted calls and counts
//! every call so tests can assert how often the write path touched the
//! store.

use bcnlog_storage::{
    checked_partition_name, BucketId, BucketWindow, NewClient, NewEvent, PartitionBackend,
    StorageError, StorageResult, StoredEvent,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A failure to inject into one backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFault {
    /// Report the addressed partition as missing.
    PartitionMissing,
    /// Report the backend as unreachable.
    Unavailable,
}

impl InjectedFault {
    fn into_error(self, bucket: BucketId) -> StorageError {
        match self {
            Self::PartitionMissing => match checked_partition_name(bucket) {
                Ok(table) => StorageError::partition_missing(table),
                Err(err) => err,
            },
            Self::Unavailable => StorageError::unavailable("injected fault"),
        }
    }
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    lookups: AtomicUsize,
    provisions: AtomicUsize,
    inserts: AtomicUsize,
    fetches: AtomicUsize,
}

impl CallCounts {
    /// Number of window lookups.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of provision calls.
    pub fn provisions(&self) -> usize {
        self.provisions.load(Ordering::SeqCst)
    }

    /// Number of insert attempts, failed ones included.
    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Number of row read-backs.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// A backend wrapper that fails scripted calls.
///
/// Scripted insert faults are consumed in order, one per insert call;
/// once the queue is empty inserts reach the inner backend.
pub struct FaultyBackend {
    inner: Arc<dyn PartitionBackend>,
    insert_faults: Mutex<VecDeque<InjectedFault>>,
    lookup_fault: Mutex<Option<InjectedFault>>,
    provision_fault: Mutex<Option<InjectedFault>>,
    fetch_fault: Mutex<Option<InjectedFault>>,
    hide_partitions: AtomicBool,
    counts: CallCounts,
}

impl FaultyBackend {
    /// Wraps `inner` with no faults scheduled.
    pub fn new(inner: Arc<dyn PartitionBackend>) -> Self {
        Self {
            inner,
            insert_faults: Mutex::new(VecDeque::new()),
            lookup_fault: Mutex::new(None),
            provision_fault: Mutex::new(None),
            fetch_fault: Mutex::new(None),
            hide_partitions: AtomicBool::new(false),
            counts: CallCounts::default(),
        }
    }

    /// Queues faults for the next insert calls.
    pub fn fail_inserts(&self, faults: impl IntoIterator<Item = InjectedFault>) {
        self.insert_faults.lock().extend(faults);
    }

    /// Fails every window lookup with `fault`.
    pub fn fail_lookups(&self, fault: InjectedFault) {
        *self.lookup_fault.lock() = Some(fault);
    }

    /// Fails every provision call with `fault`.
    pub fn fail_provisions(&self, fault: InjectedFault) {
        *self.provision_fault.lock() = Some(fault);
    }

    /// Fails every fetch with `fault`.
    pub fn fail_fetches(&self, fault: InjectedFault) {
        *self.fetch_fault.lock() = Some(fault);
    }

    /// Makes every insert report a missing partition, as if provisioning
    /// never became visible.
    pub fn hide_partitions(&self, hide: bool) {
        self.hide_partitions.store(hide, Ordering::SeqCst);
    }

    /// Returns the call counters.
    pub fn counts(&self) -> &CallCounts {
        &self.counts
    }

    /// Returns the wrapped backend.
    pub fn inner(&self) -> &Arc<dyn PartitionBackend> {
        &self.inner
    }
}

impl PartitionBackend for FaultyBackend {
    fn lookup_windows(&self, timestamp: i64) -> StorageResult<Vec<BucketWindow>> {
        self.counts.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = *self.lookup_fault.lock() {
            return Err(fault.into_error(BucketId::UNRESOLVED));
        }
        self.inner.lookup_windows(timestamp)
    }

    fn provision(&self, bucket: BucketId) -> StorageResult<()> {
        self.counts.provisions.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = *self.provision_fault.lock() {
            return Err(fault.into_error(bucket));
        }
        self.inner.provision(bucket)
    }

    fn insert(&self, bucket: BucketId, event: &NewEvent) -> StorageResult<i64> {
        self.counts.inserts.fetch_add(1, Ordering::SeqCst);
        if self.hide_partitions.load(Ordering::SeqCst) {
            return Err(InjectedFault::PartitionMissing.into_error(bucket));
        }
        if let Some(fault) = self.insert_faults.lock().pop_front() {
            return Err(fault.into_error(bucket));
        }
        self.inner.insert(bucket, event)
    }

    fn fetch(&self, bucket: BucketId, sequence_index: i64) -> StorageResult<StoredEvent> {
        self.counts.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = *self.fetch_fault.lock() {
            return Err(fault.into_error(bucket));
        }
        self.inner.fetch(bucket, sequence_index)
    }

    fn partition_exists(&self, bucket: BucketId) -> StorageResult<bool> {
        self.inner.partition_exists(bucket)
    }

    fn row_count(&self, bucket: BucketId) -> StorageResult<u64> {
        self.inner.row_count(bucket)
    }

    fn provision_client_table(&self) -> StorageResult<()> {
        self.inner.provision_client_table()
    }

    fn insert_client(&self, client: &NewClient) -> StorageResult<i64> {
        self.inner.insert_client(client)
    }
}
