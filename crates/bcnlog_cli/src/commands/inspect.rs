//! Inspect command implementation.

use super::{OutputFormat, StoreArgs};
use bcnlog_core::Config;
use bcnlog_storage::{partition_name, BucketId};
use serde::Serialize;

/// Partition inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Bucket id.
    pub bucket: i64,
    /// Physical table name.
    pub table: String,
    /// Whether the partition has been provisioned.
    pub exists: bool,
    /// Number of rows, if the partition exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
}

/// Runs the inspect command.
pub fn run(
    store: &StoreArgs<'_>,
    bucket: i64,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = store.recorder(Config::default())?;
    let backend = recorder.backend();
    let bucket_id = BucketId::new(bucket);

    let exists = backend.partition_exists(bucket_id)?;
    let rows = if exists {
        Some(backend.row_count(bucket_id)?)
    } else {
        None
    };

    let result = InspectResult {
        bucket,
        table: partition_name(bucket_id),
        exists,
        rows,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Partition {}", result.table);
    println!("  Bucket: {}", result.bucket);
    match result.rows {
        Some(rows) => println!("  Rows: {}", rows),
        None => println!("  Not provisioned"),
    }
}
