//! SQLite partition backend for persistent storage.

use crate::backend::PartitionBackend;
use crate::error::{StorageError, StorageResult};
use crate::naming::{checked_partition_name, validate_identifier, CLIENT_TABLE, WINDOW_TABLE};
use crate::types::{BucketId, BucketWindow, NewClient, NewEvent, StoredEvent};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default busy timeout applied to every connection.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Maps an engine error to a storage error for statements addressing `table`.
///
/// SQLite reports a missing relation as a generic `SQLITE_ERROR` whose
/// message starts with `no such table`; that case becomes
/// [`StorageError::PartitionMissing`]. Everything else is passed through.
#[must_use]
pub fn classify_sqlite_error(err: rusqlite::Error, table: &str) -> StorageError {
    if is_missing_table(&err) {
        StorageError::partition_missing(table)
    } else {
        StorageError::Sqlite(err)
    }
}

/// Like [`classify_sqlite_error`], for fixed tables that are not partitions.
fn classify_fixed_table_error(err: rusqlite::Error, table: &str) -> StorageError {
    if is_missing_table(&err) {
        StorageError::table_missing(table)
    } else {
        StorageError::Sqlite(err)
    }
}

fn is_missing_table(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(message)) if message.starts_with("no such table")
    )
}

/// A SQLite-backed partition backend.
///
/// Each partition is a table named by
/// [`partition_name`](crate::partition_name), created with
/// `CREATE TABLE IF NOT EXISTS` so concurrent provisioning is absorbed by
/// the engine.
///
/// # Thread Safety
///
/// Statements are serialized on one connection. The lock is held for a
/// single statement only, never across the steps of a write.
///
/// # Example
///
/// ```no_run
/// use bcnlog_storage::{BucketId, NewEvent, PartitionBackend, SqliteBackend};
/// use std::path::Path;
///
/// let backend = SqliteBackend::open(Path::new("downloads.db")).unwrap();
/// backend.provision(BucketId::new(7)).unwrap();
/// let seq = backend
///     .insert(BucketId::new(7), &NewEvent::new("proj-A", "key-1", "1.2.3.4", "hash"))
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct SqliteBackend {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens or creates a database file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Opens a database file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the database
    /// cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::open(path)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be created.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Returns the database file path, or `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Creates the window relation if it does not exist.
    ///
    /// The relation is owned by an external process in production; this is
    /// an administrative and test helper.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created.
    pub fn create_window_table(&self) -> StorageResult<()> {
        let table = validate_identifier(WINDOW_TABLE)?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                bucket_id INTEGER NOT NULL,
                start_time INTEGER NOT NULL,
                end_time INTEGER NOT NULL
            )"
        );
        self.conn.lock().execute(&sql, [])?;
        Ok(())
    }

    /// Adds a row to the window relation.
    ///
    /// # Errors
    ///
    /// Returns an error if the relation does not exist or the write fails.
    pub fn add_window(&self, window: BucketWindow) -> StorageResult<()> {
        let table = validate_identifier(WINDOW_TABLE)?;
        let sql =
            format!("INSERT INTO {table} (bucket_id, start_time, end_time) VALUES (?1, ?2, ?3)");
        self.conn
            .lock()
            .execute(
                &sql,
                params![window.bucket_id.as_i64(), window.start_time, window.end_time],
            )
            .map_err(|err| classify_fixed_table_error(err, table))?;
        Ok(())
    }
}

impl PartitionBackend for SqliteBackend {
    fn lookup_windows(&self, timestamp: i64) -> StorageResult<Vec<BucketWindow>> {
        let table = validate_identifier(WINDOW_TABLE)?;
        let sql = format!(
            "SELECT bucket_id, start_time, end_time FROM {table}
             WHERE start_time <= ?1 AND end_time >= ?1
             ORDER BY bucket_id ASC"
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![timestamp], |row| {
            Ok(BucketWindow::new(
                BucketId::new(row.get(0)?),
                row.get(1)?,
                row.get(2)?,
            ))
        })?;

        let windows = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(windows)
    }

    fn provision(&self, bucket: BucketId) -> StorageResult<()> {
        let table = checked_partition_name(bucket)?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                sequence_index INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id TEXT NOT NULL,
                public_key TEXT NOT NULL,
                ip TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                inserted_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
            )"
        );
        self.conn.lock().execute(&sql, [])?;
        Ok(())
    }

    fn insert(&self, bucket: BucketId, event: &NewEvent) -> StorageResult<i64> {
        let table = checked_partition_name(bucket)?;
        let sql = format!(
            "INSERT INTO {table} (project_id, public_key, ip, content_hash)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING sequence_index"
        );

        self.conn
            .lock()
            .query_row(
                &sql,
                params![
                    event.project_id,
                    event.public_key,
                    event.ip,
                    event.content_hash
                ],
                |row| row.get(0),
            )
            .map_err(|err| classify_sqlite_error(err, &table))
    }

    fn fetch(&self, bucket: BucketId, sequence_index: i64) -> StorageResult<StoredEvent> {
        let table = checked_partition_name(bucket)?;
        let sql = format!(
            "SELECT sequence_index, project_id, public_key, ip, content_hash, inserted_at
             FROM {table} WHERE sequence_index = ?1"
        );

        let row = self
            .conn
            .lock()
            .query_row(&sql, params![sequence_index], |row| {
                Ok(StoredEvent {
                    sequence_index: row.get(0)?,
                    event: NewEvent {
                        project_id: row.get(1)?,
                        public_key: row.get(2)?,
                        ip: row.get(3)?,
                        content_hash: row.get(4)?,
                    },
                    inserted_at: row.get(5)?,
                })
            })
            .optional()
            .map_err(|err| classify_sqlite_error(err, &table))?;

        row.ok_or(StorageError::RowNotFound {
            table,
            sequence_index,
        })
    }

    fn partition_exists(&self, bucket: BucketId) -> StorageResult<bool> {
        let table = checked_partition_name(bucket)?;
        let count: i64 = self.conn.lock().query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn row_count(&self, bucket: BucketId) -> StorageResult<u64> {
        let table = checked_partition_name(bucket)?;
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = self
            .conn
            .lock()
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|err| classify_sqlite_error(err, &table))?;

        u64::try_from(count)
            .map_err(|_| StorageError::Corrupted(format!("negative row count {count} in {table}")))
    }

    fn provision_client_table(&self) -> StorageResult<()> {
        let table = validate_identifier(CLIENT_TABLE)?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                mcindex INTEGER PRIMARY KEY AUTOINCREMENT,
                public_key TEXT NOT NULL,
                ip TEXT NOT NULL,
                customer_id TEXT NOT NULL
            )"
        );
        self.conn.lock().execute(&sql, [])?;
        Ok(())
    }

    fn insert_client(&self, client: &NewClient) -> StorageResult<i64> {
        let table = validate_identifier(CLIENT_TABLE)?;
        let sql = format!(
            "INSERT INTO {table} (public_key, ip, customer_id)
             VALUES (?1, ?2, ?3)
             RETURNING mcindex"
        );

        self.conn
            .lock()
            .query_row(
                &sql,
                params![client.public_key, client.ip, client.customer_id],
                |row| row.get(0),
            )
            .map_err(|err| classify_fixed_table_error(err, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn event(hash: &str) -> NewEvent {
        NewEvent::new("proj-A", "key-1", "1.2.3.4", hash)
    }

    #[test]
    fn sqlite_insert_into_missing_table_is_classified() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let err = backend.insert(BucketId::new(7), &event("h")).unwrap_err();
        assert!(
            matches!(
                err,
                StorageError::PartitionMissing { ref table } if table == "downloads_requests_7"
            ),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn sqlite_provision_then_insert() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let bucket = BucketId::new(7);
        backend.provision(bucket).unwrap();

        assert_eq!(backend.insert(bucket, &event("a")).unwrap(), 1);
        assert_eq!(backend.insert(bucket, &event("b")).unwrap(), 2);
        assert_eq!(backend.row_count(bucket).unwrap(), 2);
    }

    #[test]
    fn sqlite_provision_twice_is_noop() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let bucket = BucketId::new(11);
        backend.provision(bucket).unwrap();
        backend.insert(bucket, &event("a")).unwrap();
        backend.provision(bucket).unwrap();

        assert!(backend.partition_exists(bucket).unwrap());
        assert_eq!(backend.row_count(bucket).unwrap(), 1);
    }

    #[test]
    fn sqlite_fetch_includes_insertion_time() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let bucket = BucketId::new(2);
        backend.provision(bucket).unwrap();
        let seq = backend.insert(bucket, &event("xyz")).unwrap();

        let row = backend.fetch(bucket, seq).unwrap();
        assert_eq!(row.sequence_index, seq);
        assert_eq!(row.event, event("xyz"));
        assert!(row.inserted_at > 1_600_000_000);
    }

    #[test]
    fn sqlite_fetch_missing_row() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let bucket = BucketId::new(2);
        backend.provision(bucket).unwrap();

        let result = backend.fetch(bucket, 42);
        assert!(matches!(
            result,
            Err(StorageError::RowNotFound {
                sequence_index: 42,
                ..
            })
        ));
        assert!(backend
            .fetch(BucketId::new(3), 1)
            .unwrap_err()
            .is_partition_missing());
    }

    #[test]
    fn sqlite_negative_bucket_partition() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let bucket = BucketId::new(-4);
        backend.provision(bucket).unwrap();
        assert_eq!(backend.insert(bucket, &event("a")).unwrap(), 1);
    }

    #[test]
    fn sqlite_lookup_without_window_table_is_not_partition_missing() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let err = backend.lookup_windows(10).unwrap_err();
        assert!(matches!(err, StorageError::Sqlite(_)));
    }

    #[test]
    fn sqlite_add_window_without_table_is_not_partition_missing() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let err = backend
            .add_window(BucketWindow::new(BucketId::new(7), 0, 10))
            .unwrap_err();
        assert!(matches!(err, StorageError::TableMissing { ref table } if table == WINDOW_TABLE));
    }

    #[test]
    fn sqlite_lookup_windows() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.create_window_table().unwrap();
        backend.add_window(BucketWindow::new(BucketId::new(7), 1000, 4600)).unwrap();
        backend.add_window(BucketWindow::new(BucketId::new(8), 4601, 8200)).unwrap();

        let found = backend.lookup_windows(1010).unwrap();
        assert_eq!(found, vec![BucketWindow::new(BucketId::new(7), 1000, 4600)]);
        assert_eq!(backend.lookup_windows(4601).unwrap()[0].bucket_id, BucketId::new(8));
        assert!(backend.lookup_windows(9000).unwrap().is_empty());
    }

    #[test]
    fn sqlite_client_table() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let client = NewClient {
            public_key: "key".into(),
            ip: "10.0.0.1".into(),
            customer_id: "cust".into(),
        };

        let err = backend.insert_client(&client).unwrap_err();
        assert!(
            matches!(err, StorageError::TableMissing { ref table } if table == CLIENT_TABLE),
            "unexpected error: {err:?}"
        );
        assert!(!err.is_partition_missing());
        backend.provision_client_table().unwrap();
        backend.provision_client_table().unwrap();
        assert_eq!(backend.insert_client(&client).unwrap(), 1);
        assert_eq!(backend.insert_client(&client).unwrap(), 2);
    }

    #[test]
    fn sqlite_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("downloads.db");
        let bucket = BucketId::new(7);

        {
            let backend = SqliteBackend::open_with_create_dirs(&path).unwrap();
            backend.provision(bucket).unwrap();
            backend.insert(bucket, &event("a")).unwrap();
            assert_eq!(backend.path(), Some(path.as_path()));
        }

        let backend = SqliteBackend::open(&path).unwrap();
        assert!(backend.partition_exists(bucket).unwrap());
        assert_eq!(backend.insert(bucket, &event("b")).unwrap(), 2);
    }
}
