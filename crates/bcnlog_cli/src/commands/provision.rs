//! Provision command implementation.

use super::StoreArgs;
use bcnlog_core::Config;
use bcnlog_storage::{partition_name, BucketId};
use tracing::info;

/// Creates the partition for `bucket` ahead of its first write.
pub fn run(store: &StoreArgs<'_>, bucket: i64) -> Result<(), Box<dyn std::error::Error>> {
    let bucket = BucketId::new(bucket);
    info!("Provisioning partition for {}", bucket);

    let recorder = store.recorder(Config::default())?;
    let existed = recorder.backend().partition_exists(bucket)?;
    recorder.backend().provision(bucket)?;

    if existed {
        println!("Partition {} already exists", partition_name(bucket));
    } else {
        println!("✓ Partition {} created", partition_name(bucket));
    }

    Ok(())
}
