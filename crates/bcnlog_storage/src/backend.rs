//! Partition backend trait definition.

use crate::error::StorageResult;
use crate::types::{BucketId, BucketWindow, NewClient, NewEvent, StoredEvent};

/// The storage engine boundary for the partitioned write path.
///
/// A backend owns the physical schema of every partition and the fixed
/// client table. It knows nothing about the retry policy built on top of
/// it; its one obligation there is to report a missing partition as
/// [`StorageError::PartitionMissing`](crate::StorageError::PartitionMissing)
/// and nothing else.
///
/// # Invariants
///
/// - `provision` is idempotent and safe to race with itself
/// - `insert` assigns a per-partition sequence index that is strictly
///   greater than every index it assigned before in that partition
/// - `fetch` returns exactly the fields passed to `insert`
/// - Backends must be `Send + Sync`; every method takes `&self` so one
///   handle can be shared by all writers
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::SqliteBackend`] - For persistent storage
pub trait PartitionBackend: Send + Sync {
    /// Returns every window whose range contains `timestamp`, ordered by
    /// ascending bucket id.
    ///
    /// # Errors
    ///
    /// Returns an error if the window relation cannot be queried.
    fn lookup_windows(&self, timestamp: i64) -> StorageResult<Vec<BucketWindow>>;

    /// Creates the partition table for `bucket` if it does not exist.
    ///
    /// Calling this for an existing partition is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created.
    fn provision(&self, bucket: BucketId) -> StorageResult<()>;

    /// Appends one row to the partition of `bucket`.
    ///
    /// Returns the sequence index assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns `PartitionMissing` if the partition does not exist, or any
    /// other error if the write fails.
    fn insert(&self, bucket: BucketId, event: &NewEvent) -> StorageResult<i64>;

    /// Reads the row with `sequence_index` from the partition of `bucket`.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if no such row exists, `PartitionMissing` if
    /// the partition does not exist.
    fn fetch(&self, bucket: BucketId, sequence_index: i64) -> StorageResult<StoredEvent>;

    /// Returns true if the partition of `bucket` has been provisioned.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    fn partition_exists(&self, bucket: BucketId) -> StorageResult<bool>;

    /// Returns the number of rows stored in the partition of `bucket`.
    ///
    /// # Errors
    ///
    /// Returns `PartitionMissing` if the partition does not exist.
    fn row_count(&self, bucket: BucketId) -> StorageResult<u64>;

    /// Creates the client registration table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created.
    fn provision_client_table(&self) -> StorageResult<()>;

    /// Appends one client registration and returns its sequence id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn insert_client(&self, client: &NewClient) -> StorageResult<i64>;
}
