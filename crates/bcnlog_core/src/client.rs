//! Client registration against the fixed, non-partitioned table.

use crate::error::{CoreError, CoreResult};
use bcnlog_storage::{NewClient, PartitionBackend};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Registers clients in the static client table.
///
/// The table is created on first use. Creation is idempotent, so two
/// registrations racing on a cold store both succeed.
pub struct ClientRegistry {
    backend: Arc<dyn PartitionBackend>,
    provisioned: AtomicBool,
}

impl ClientRegistry {
    /// Creates a registry over `backend`.
    pub fn new(backend: Arc<dyn PartitionBackend>) -> Self {
        Self {
            backend,
            provisioned: AtomicBool::new(false),
        }
    }

    /// Registers a client and returns its sequence id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `customer_id` is empty, or a storage
    /// error if the table cannot be created or written.
    pub fn register(&self, public_key: &str, ip: &str, customer_id: &str) -> CoreResult<i64> {
        if customer_id.is_empty() {
            return Err(CoreError::invalid_argument("customer id is empty"));
        }

        if !self.provisioned.load(Ordering::Acquire) {
            self.backend.provision_client_table().inspect_err(|err| {
                error!(error = %err, "failed to create client table");
            })?;
            self.provisioned.store(true, Ordering::Release);
        }

        let client = NewClient {
            public_key: public_key.to_string(),
            ip: ip.to_string(),
            customer_id: customer_id.to_string(),
        };
        let id = self.backend.insert_client(&client).inspect_err(|err| {
            error!(error = %err, "failed to insert client");
        })?;

        debug!(id, customer_id, "client registered");
        Ok(id)
    }
}
