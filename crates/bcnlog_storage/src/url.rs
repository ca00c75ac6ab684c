//! Connection URL parsing.

use crate::backend::PartitionBackend;
use crate::error::{StorageError, StorageResult};
use crate::memory::InMemoryBackend;
use crate::sqlite::SqliteBackend;
use std::path::PathBuf;
use std::sync::Arc;

/// A parsed store connection URL.
///
/// Accepted forms:
///
/// - `memory:` - [`InMemoryBackend`]
/// - `sqlite::memory:` - private in-memory SQLite database
/// - `sqlite://<path>` or `sqlite:<path>` - SQLite database file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendUrl {
    /// Process-local in-memory backend.
    Memory,
    /// In-memory SQLite database.
    SqliteMemory,
    /// SQLite database file.
    SqliteFile(PathBuf),
}

impl BackendUrl {
    /// Parses a connection URL.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedUrl` for unknown schemes or an empty path.
    pub fn parse(url: &str) -> StorageResult<Self> {
        let url = url.trim();
        if url == "memory:" || url == "memory://" {
            return Ok(Self::Memory);
        }
        if url == "sqlite::memory:" || url == "sqlite://:memory:" {
            return Ok(Self::SqliteMemory);
        }

        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .ok_or_else(|| StorageError::UnsupportedUrl(url.to_string()))?;

        if path.is_empty() {
            return Err(StorageError::UnsupportedUrl(url.to_string()));
        }
        Ok(Self::SqliteFile(PathBuf::from(path)))
    }

    /// Opens the backend this URL points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub fn open(&self) -> StorageResult<Arc<dyn PartitionBackend>> {
        let backend: Arc<dyn PartitionBackend> = match self {
            Self::Memory => Arc::new(InMemoryBackend::new()),
            Self::SqliteMemory => Arc::new(SqliteBackend::open_in_memory()?),
            Self::SqliteFile(path) => Arc::new(SqliteBackend::open_with_create_dirs(path)?),
        };
        tracing::debug!(url = ?self, "opened partition backend");
        Ok(backend)
    }
}

/// Parses `url` and opens the backend it names.
///
/// # Errors
///
/// Returns an error if the URL is unsupported or the backend cannot be opened.
pub fn open_backend(url: &str) -> StorageResult<Arc<dyn PartitionBackend>> {
    BackendUrl::parse(url)?.open()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BucketId;

    #[test]
    fn parse_memory() {
        assert_eq!(BackendUrl::parse("memory:").unwrap(), BackendUrl::Memory);
        assert_eq!(
            BackendUrl::parse("sqlite::memory:").unwrap(),
            BackendUrl::SqliteMemory
        );
    }

    #[test]
    fn parse_sqlite_file() {
        assert_eq!(
            BackendUrl::parse("sqlite:///var/lib/bcnlog/downloads.db").unwrap(),
            BackendUrl::SqliteFile(PathBuf::from("/var/lib/bcnlog/downloads.db"))
        );
        assert_eq!(
            BackendUrl::parse("sqlite:data/downloads.db").unwrap(),
            BackendUrl::SqliteFile(PathBuf::from("data/downloads.db"))
        );
    }

    #[test]
    fn parse_rejects_unknown_scheme() {
        let err = BackendUrl::parse("postgres://user@host/db").unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedUrl(_)));
        assert!(BackendUrl::parse("sqlite://").is_err());
    }

    #[test]
    fn open_memory_backend() {
        let backend = open_backend("memory:").unwrap();
        backend.provision(BucketId::new(1)).unwrap();
        assert!(backend.partition_exists(BucketId::new(1)).unwrap());
    }
}
