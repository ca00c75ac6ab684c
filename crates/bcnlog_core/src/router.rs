//! The lazily provisioned, partitioned write path.
//!
//! A write moves through these states:
//!
//! ```text
//! RESOLVE -> INSERT -> DONE
//!              |
//!              +-- PartitionMissing --> PROVISION -> INSERT_RETRY -> DONE
//! ```
//!
//! Only a missing partition is retried, and only once. A warm partition
//! costs one lookup and one insert; a cold one adds a single idempotent
//! `CREATE TABLE IF NOT EXISTS`. Concurrent first writers to the same
//! bucket each provision, and the engine absorbs the race. No lock is held
//! across the steps.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::record::EventRecord;
use crate::resolver::BucketResolver;
use bcnlog_storage::{BucketId, NewEvent, PartitionBackend};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Routes events to their time partition, provisioning it on demand.
pub struct PartitionRouter {
    resolver: BucketResolver,
    backend: Arc<dyn PartitionBackend>,
    confirm_via_readback: bool,
}

impl PartitionRouter {
    /// Creates a router over `backend`.
    pub fn new(backend: Arc<dyn PartitionBackend>, config: &Config) -> Self {
        Self {
            resolver: BucketResolver::new(Arc::clone(&backend), config.unresolved_policy),
            backend,
            confirm_via_readback: config.confirm_via_readback,
        }
    }

    /// Returns the resolver used for every write.
    #[must_use]
    pub fn resolver(&self) -> &BucketResolver {
        &self.resolver
    }

    /// Returns whether confirmed records are re-read from storage.
    #[must_use]
    pub fn confirms_via_readback(&self) -> bool {
        self.confirm_via_readback
    }

    /// Writes `event` to the partition covering `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// - `Lookup` / `Unresolved` if the bucket cannot be resolved
    /// - `Provision` if a missing partition cannot be created
    /// - `Write` if the insert fails for any reason other than a missing
    ///   partition, or fails again after provisioning
    /// - `Read` if read-back is enabled and the written row cannot be read
    pub fn write(&self, event: NewEvent, now: i64) -> CoreResult<EventRecord> {
        let bucket = self.resolver.resolve(now).inspect_err(|err| {
            error!(timestamp = now, error = %err, "unable to resolve bucket");
        })?;

        let sequence_index = self.insert_with_provisioning(bucket, &event)?;
        debug!(bucket = %bucket, sequence_index, "event written");

        self.confirm(bucket, event, sequence_index)
    }

    fn insert_with_provisioning(&self, bucket: BucketId, event: &NewEvent) -> CoreResult<i64> {
        match self.backend.insert(bucket, event) {
            Ok(sequence_index) => return Ok(sequence_index),
            Err(err) if err.is_partition_missing() => {
                warn!(bucket = %bucket, "partition missing, provisioning");
            }
            Err(source) => {
                error!(bucket = %bucket, error = %source, "unable to insert event");
                return Err(CoreError::Write {
                    bucket,
                    after_provision: false,
                    source,
                });
            }
        }

        self.backend.provision(bucket).map_err(|source| {
            error!(bucket = %bucket, error = %source, "failed to provision partition");
            CoreError::Provision { bucket, source }
        })?;

        self.backend.insert(bucket, event).map_err(|source| {
            error!(
                bucket = %bucket,
                error = %source,
                "unable to insert event after provisioning partition"
            );
            CoreError::Write {
                bucket,
                after_provision: true,
                source,
            }
        })
    }

    fn confirm(
        &self,
        bucket: BucketId,
        event: NewEvent,
        sequence_index: i64,
    ) -> CoreResult<EventRecord> {
        if !self.confirm_via_readback {
            return Ok(EventRecord::echo(event, sequence_index));
        }

        let stored = self.backend.fetch(bucket, sequence_index).map_err(|source| {
            error!(bucket = %bucket, sequence_index, error = %source, "unable to read back event");
            CoreError::Read {
                bucket,
                sequence_index,
                source,
            }
        })?;
        Ok(EventRecord::from(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnresolvedPolicy;
    use bcnlog_storage::{BucketWindow, InMemoryBackend, SqliteBackend};

    const T0: i64 = 1_700_000_000;

    fn event(hash: &str) -> NewEvent {
        NewEvent::new("proj-A", "key-1", "1.2.3.4", hash)
    }

    fn memory_backend() -> Arc<InMemoryBackend> {
        Arc::new(InMemoryBackend::with_windows(vec![BucketWindow::new(
            BucketId::new(7),
            T0,
            T0 + 3600,
        )]))
    }

    #[test]
    fn cold_write_provisions_partition() {
        let backend = memory_backend();
        let router = PartitionRouter::new(backend.clone(), &Config::default());

        let record = router.write(event("hash-xyz"), T0 + 10).unwrap();
        assert_eq!(record.project_id, "proj-A");
        assert_eq!(record.sequence_index, 1);
        assert_eq!(record.inserted_at, None);
        assert_eq!(backend.partitions(), vec![BucketId::new(7)]);
    }

    #[test]
    fn warm_write_reuses_partition() {
        let backend = memory_backend();
        let router = PartitionRouter::new(backend.clone(), &Config::default());

        router.write(event("a"), T0 + 10).unwrap();
        let second = router.write(event("b"), T0 + 20).unwrap();
        assert_eq!(second.sequence_index, 2);
        assert_eq!(second.content_hash, "b");
        assert_eq!(backend.row_count(BucketId::new(7)).unwrap(), 2);
    }

    #[test]
    fn unresolved_write_lands_in_bucket_zero() {
        let backend = memory_backend();
        let router = PartitionRouter::new(backend.clone(), &Config::default());

        let record = router.write(event("late"), T0 + 3700).unwrap();
        assert_eq!(record.sequence_index, 1);
        assert_eq!(backend.partitions(), vec![BucketId::UNRESOLVED]);
    }

    #[test]
    fn unresolved_write_rejected_under_policy() {
        let backend = memory_backend();
        let config = Config::new().unresolved_policy(UnresolvedPolicy::Reject);
        let router = PartitionRouter::new(backend.clone(), &config);

        let err = router.write(event("late"), T0 + 3700).unwrap_err();
        assert!(matches!(err, CoreError::Unresolved { .. }));
        assert!(backend.partitions().is_empty());
    }

    #[test]
    fn readback_hydrates_insertion_time() {
        let backend = memory_backend();
        let router =
            PartitionRouter::new(backend.clone(), &Config::new().confirm_via_readback(true));
        assert!(router.confirms_via_readback());

        let record = router.write(event("hash-xyz"), T0 + 10).unwrap();
        assert_eq!(record.sequence_index, 1);
        assert_eq!(record.content_hash, "hash-xyz");
        assert!(record.inserted_at.is_some());
    }

    #[test]
    fn sqlite_cold_then_warm() {
        let backend = Arc::new(SqliteBackend::open_in_memory().unwrap());
        backend.create_window_table().unwrap();
        backend
            .add_window(BucketWindow::new(BucketId::new(7), T0, T0 + 3600))
            .unwrap();
        let router =
            PartitionRouter::new(backend.clone(), &Config::new().confirm_via_readback(true));

        assert!(!backend.partition_exists(BucketId::new(7)).unwrap());
        let first = router.write(event("a"), T0 + 10).unwrap();
        let second = router.write(event("b"), T0 + 20).unwrap();

        assert!(backend.partition_exists(BucketId::new(7)).unwrap());
        assert_eq!((first.sequence_index, second.sequence_index), (1, 2));
        assert!(first.inserted_at.unwrap() > 0);
    }
}
