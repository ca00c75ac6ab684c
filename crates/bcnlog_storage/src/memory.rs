//! In-memory partition backend for testing.

use crate::backend::PartitionBackend;
use crate::error::{StorageError, StorageResult};
use crate::naming::{checked_partition_name, CLIENT_TABLE};
use crate::types::{BucketId, BucketWindow, NewClient, NewEvent, StoredEvent};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default)]
struct MemoryPartition {
    last_sequence: i64,
    rows: Vec<StoredEvent>,
}

#[derive(Debug, Default)]
struct MemoryClientTable {
    last_sequence: i64,
    rows: Vec<(i64, NewClient)>,
}

/// An in-memory partition backend.
///
/// Partitions behave like tables in a relational store: inserting into a
/// bucket that was never provisioned fails with `PartitionMissing`, and
/// sequence indexes start at 1 per partition.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use bcnlog_storage::{BucketId, InMemoryBackend, NewEvent, PartitionBackend};
///
/// let backend = InMemoryBackend::new();
/// let bucket = BucketId::new(7);
/// let event = NewEvent::new("proj-A", "key-1", "1.2.3.4", "hash-xyz");
///
/// assert!(backend.insert(bucket, &event).unwrap_err().is_partition_missing());
/// backend.provision(bucket).unwrap();
/// assert_eq!(backend.insert(bucket, &event).unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    windows: RwLock<Vec<BucketWindow>>,
    partitions: RwLock<BTreeMap<BucketId, MemoryPartition>>,
    clients: RwLock<Option<MemoryClientTable>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing windows.
    #[must_use]
    pub fn with_windows(windows: Vec<BucketWindow>) -> Self {
        Self {
            windows: RwLock::new(windows),
            ..Self::default()
        }
    }

    /// Adds a row to the window relation.
    ///
    /// Stands in for whatever process maintains the relation externally.
    pub fn add_window(&self, window: BucketWindow) {
        self.windows.write().push(window);
    }

    /// Returns the buckets that currently have a partition.
    #[must_use]
    pub fn partitions(&self) -> Vec<BucketId> {
        self.partitions.read().keys().copied().collect()
    }

    /// Returns a copy of all rows stored for `bucket`.
    #[must_use]
    pub fn rows(&self, bucket: BucketId) -> Vec<StoredEvent> {
        self.partitions
            .read()
            .get(&bucket)
            .map(|partition| partition.rows.clone())
            .unwrap_or_default()
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

impl PartitionBackend for InMemoryBackend {
    fn lookup_windows(&self, timestamp: i64) -> StorageResult<Vec<BucketWindow>> {
        let mut matches: Vec<BucketWindow> = self
            .windows
            .read()
            .iter()
            .filter(|window| window.contains(timestamp))
            .copied()
            .collect();
        matches.sort_by_key(|window| window.bucket_id);
        Ok(matches)
    }

    fn provision(&self, bucket: BucketId) -> StorageResult<()> {
        checked_partition_name(bucket)?;
        self.partitions.write().entry(bucket).or_default();
        Ok(())
    }

    fn insert(&self, bucket: BucketId, event: &NewEvent) -> StorageResult<i64> {
        let table = checked_partition_name(bucket)?;
        let mut partitions = self.partitions.write();
        let partition = partitions
            .get_mut(&bucket)
            .ok_or_else(|| StorageError::partition_missing(table))?;

        partition.last_sequence += 1;
        let sequence_index = partition.last_sequence;
        partition.rows.push(StoredEvent {
            sequence_index,
            event: event.clone(),
            inserted_at: unix_now(),
        });
        Ok(sequence_index)
    }

    fn fetch(&self, bucket: BucketId, sequence_index: i64) -> StorageResult<StoredEvent> {
        let table = checked_partition_name(bucket)?;
        let partitions = self.partitions.read();
        let partition = partitions
            .get(&bucket)
            .ok_or_else(|| StorageError::partition_missing(table.clone()))?;

        partition
            .rows
            .iter()
            .find(|row| row.sequence_index == sequence_index)
            .cloned()
            .ok_or(StorageError::RowNotFound {
                table,
                sequence_index,
            })
    }

    fn partition_exists(&self, bucket: BucketId) -> StorageResult<bool> {
        Ok(self.partitions.read().contains_key(&bucket))
    }

    fn row_count(&self, bucket: BucketId) -> StorageResult<u64> {
        let table = checked_partition_name(bucket)?;
        self.partitions
            .read()
            .get(&bucket)
            .map(|partition| partition.rows.len() as u64)
            .ok_or_else(|| StorageError::partition_missing(table))
    }

    fn provision_client_table(&self) -> StorageResult<()> {
        self.clients.write().get_or_insert_with(MemoryClientTable::default);
        Ok(())
    }

    fn insert_client(&self, client: &NewClient) -> StorageResult<i64> {
        let mut clients = self.clients.write();
        let table = clients
            .as_mut()
            .ok_or_else(|| StorageError::table_missing(CLIENT_TABLE))?;

        table.last_sequence += 1;
        table.rows.push((table.last_sequence, client.clone()));
        Ok(table.last_sequence)
    }
}
