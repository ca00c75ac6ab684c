//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The partition table addressed by an insert or read does not exist.
    ///
    /// This is the only failure the write path recovers from (by
    /// provisioning the partition and retrying once).
    #[error("partition table does not exist: {table}")]
    PartitionMissing {
        /// The physical table name that was addressed.
        table: String,
    },

    /// A fixed, non-partition table such as the client table does not exist.
    #[error("table does not exist: {table}")]
    TableMissing {
        /// The physical table name that was addressed.
        table: String,
    },

    /// No row with the given sequence index exists in the partition.
    #[error("row {sequence_index} not found in {table}")]
    RowNotFound {
        /// The physical table name.
        table: String,
        /// The sequence index that was requested.
        sequence_index: i64,
    },

    /// A table identifier failed validation and was not sent to the engine.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The connection URL uses a scheme no backend understands.
    #[error("unsupported store url: {0}")]
    UnsupportedUrl(String),

    /// The backend cannot currently serve requests.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The store returned data that violates the expected row shape.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// An error reported by the SQLite engine.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Creates a partition missing error for the given table.
    pub fn partition_missing(table: impl Into<String>) -> Self {
        Self::PartitionMissing {
            table: table.into(),
        }
    }

    /// Creates a missing table error for a table that is not a partition.
    pub fn table_missing(table: impl Into<String>) -> Self {
        Self::TableMissing {
            table: table.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns true if this error means the addressed partition does not exist.
    #[must_use]
    pub fn is_partition_missing(&self) -> bool {
        matches!(self, Self::PartitionMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_missing_is_classified() {
        let err = StorageError::partition_missing("downloads_requests_7");
        assert!(err.is_partition_missing());
        assert_eq!(
            err.to_string(),
            "partition table does not exist: downloads_requests_7"
        );
    }

    #[test]
    fn other_errors_are_not_partition_missing() {
        assert!(!StorageError::unavailable("connection reset").is_partition_missing());
        assert!(!StorageError::Corrupted("bad row".into()).is_partition_missing());
        assert!(!StorageError::table_missing("mid_clients").is_partition_missing());
    }
}
