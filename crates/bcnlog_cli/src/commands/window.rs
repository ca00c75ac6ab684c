//! Window relation maintenance.
//!
//! The window relation belongs to an external process. This command only
//! exists to seed local SQLite stores.

use super::StoreArgs;
use bcnlog_storage::{BackendUrl, BucketId, BucketWindow, SqliteBackend};
use tracing::info;

/// Adds a window row to a SQLite file store.
pub fn add(
    store: &StoreArgs<'_>,
    bucket: i64,
    start_time: i64,
    end_time: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    if start_time > end_time {
        return Err(format!("window start {} is after end {}", start_time, end_time).into());
    }

    let path = match BackendUrl::parse(&store.url()?)? {
        BackendUrl::SqliteFile(path) => path,
        other => {
            return Err(
                format!("windows can only be added to a SQLite file store, got {:?}", other).into(),
            )
        }
    };

    info!("Adding window for bucket {} to {:?}", bucket, path);
    let backend = SqliteBackend::open_with_create_dirs(&path)?;
    backend.create_window_table()?;
    backend.add_window(BucketWindow::new(BucketId::new(bucket), start_time, end_time))?;

    println!("✓ Window added");
    println!("  Bucket: {}", bucket);
    println!("  Range: {} ..= {}", start_time, end_time);

    Ok(())
}
