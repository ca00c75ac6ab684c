//! Record command implementation.

use super::{OutputFormat, StoreArgs};
use bcnlog_core::{Config, EventRecord};
use tracing::info;

/// Records one download event and prints the confirmed record.
pub fn run(
    store: &StoreArgs<'_>,
    config: Config,
    fields: [&str; 4],
    at: Option<i64>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = store.recorder(config)?;
    let [project_id, public_key, ip, content_hash] = fields;

    let record = match at {
        Some(timestamp) => {
            info!("Recording event for {} at {}", project_id, timestamp);
            recorder.generate_record_at(project_id, public_key, ip, content_hash, timestamp)?
        }
        None => {
            info!("Recording event for {}", project_id);
            recorder.generate_record(project_id, public_key, ip, content_hash)?
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => print_text_output(&record),
    }

    Ok(())
}

fn print_text_output(record: &EventRecord) {
    println!("✓ Event recorded");
    println!("  Sequence: {}", record.sequence_index);
    println!("  Project: {}", record.project_id);
    println!("  Public key: {}", record.public_key);
    println!("  IP: {}", record.ip);
    println!("  Hash: {}", record.content_hash);
    if let Some(inserted_at) = record.inserted_at {
        println!("  Inserted at: {}", inserted_at);
    }
}
