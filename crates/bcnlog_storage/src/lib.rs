//! # bcnlog Storage
//!
//! Partition backend trait and store adapters for bcnlog.
//!
//! This crate is the storage engine boundary of the partitioned write path.
//! A backend owns the physical tables: one per time bucket, created on
//! demand, plus the fixed client registration table. It does not decide
//! when to provision; that is the router's job in `bcnlog_core`.
//!
//! ## Design Principles
//!
//! - Table names come from the pure [`partition_name`] function and are
//!   validated before interpolation
//! - A missing partition is reported as [`StorageError::PartitionMissing`],
//!   never as an engine-specific error
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`SqliteBackend`] - For persistent storage using SQLite
//!
//! ## Example
//!
//! ```rust
//! use bcnlog_storage::{BucketId, InMemoryBackend, NewEvent, PartitionBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.provision(BucketId::new(7)).unwrap();
//! let seq = backend
//!     .insert(BucketId::new(7), &NewEvent::new("proj-A", "key-1", "1.2.3.4", "hash"))
//!     .unwrap();
//! assert_eq!(seq, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;
mod naming;
mod sqlite;
mod types;
mod url;

pub use backend::PartitionBackend;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryBackend;
pub use naming::{
    checked_partition_name, partition_name, validate_identifier, CLIENT_TABLE, PARTITION_PREFIX,
    WINDOW_TABLE,
};
pub use sqlite::{classify_sqlite_error, SqliteBackend};
pub use types::{BucketId, BucketWindow, NewClient, NewEvent, StoredEvent};
pub use url::{open_backend, BackendUrl};
