//! Resolve command implementation.

use super::StoreArgs;
use bcnlog_core::{Clock, Config, SystemClock};
use bcnlog_storage::partition_name;

/// Prints the bucket and partition table for a timestamp.
pub fn run(
    store: &StoreArgs<'_>,
    config: Config,
    at: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = store.recorder(config)?;
    let timestamp = at.unwrap_or_else(|| SystemClock.now());
    let bucket = recorder.router().resolver().resolve(timestamp)?;

    println!("Timestamp: {}", timestamp);
    println!("Bucket: {}", bucket.as_i64());
    println!("Partition: {}", partition_name(bucket));
    if bucket.is_unresolved() {
        println!("  (no window covers this timestamp)");
    }

    Ok(())
}
