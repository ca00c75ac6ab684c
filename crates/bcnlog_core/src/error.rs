//! Error types for bcnlog core.

use bcnlog_storage::{BucketId, StorageError};
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in bcnlog core operations.
///
/// Every variant raised by the write path carries the bucket or timestamp
/// it was working on. `StorageError::PartitionMissing` never escapes on its
/// own: it is either healed by provisioning or reported inside `Write`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The window relation could not be queried.
    #[error("bucket lookup failed for timestamp {timestamp}: {source}")]
    Lookup {
        /// Timestamp being resolved.
        timestamp: i64,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// No window covers the timestamp and the policy rejects the fallback.
    #[error("no bucket window covers timestamp {timestamp}")]
    Unresolved {
        /// Timestamp being resolved.
        timestamp: i64,
    },

    /// The partition could not be created.
    #[error("failed to provision partition {bucket}: {source}")]
    Provision {
        /// Bucket being provisioned.
        bucket: BucketId,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// The event could not be written.
    #[error("failed to write to partition {bucket} (after provisioning: {after_provision}): {source}")]
    Write {
        /// Bucket being written.
        bucket: BucketId,
        /// Whether the failing attempt was the retry after provisioning.
        after_provision: bool,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// The event was written but could not be read back.
    ///
    /// The row is durable; only the confirmation is incomplete.
    #[error("row {sequence_index} of partition {bucket} was written but could not be read back: {source}")]
    Read {
        /// Bucket the row was written to.
        bucket: BucketId,
        /// Sequence index assigned by the store.
        sequence_index: i64,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// A caller-supplied argument was rejected before touching storage.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// Storage backend error outside the partitioned write path.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns the bucket this error is about, if any.
    #[must_use]
    pub fn bucket(&self) -> Option<BucketId> {
        match self {
            Self::Provision { bucket, .. }
            | Self::Write { bucket, .. }
            | Self::Read { bucket, .. } => Some(*bucket),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_carries_context() {
        let err = CoreError::Write {
            bucket: BucketId::new(7),
            after_provision: true,
            source: StorageError::partition_missing("downloads_requests_7"),
        };
        assert_eq!(err.bucket(), Some(BucketId::new(7)));
        let message = err.to_string();
        assert!(message.contains("bcn:7"));
        assert!(message.contains("after provisioning: true"));
    }

    #[test]
    fn lookup_error_has_no_bucket() {
        let err = CoreError::Lookup {
            timestamp: 10,
            source: StorageError::unavailable("down"),
        };
        assert_eq!(err.bucket(), None);
        assert!(err.to_string().contains("timestamp 10"));
    }
}
