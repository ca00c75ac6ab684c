//! Client registration command.

use super::StoreArgs;
use bcnlog_core::Config;
use tracing::info;

/// Registers a client and prints its sequence id.
pub fn register(
    store: &StoreArgs<'_>,
    public_key: &str,
    ip: &str,
    customer_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Registering client for customer {:?}", customer_id);

    let recorder = store.recorder(Config::default())?;
    let id = recorder.register_client(public_key, ip, customer_id)?;

    println!("✓ Client registered");
    println!("  Id: {}", id);

    Ok(())
}
