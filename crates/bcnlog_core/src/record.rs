//! Confirmed event records.

use bcnlog_storage::{NewEvent, StoredEvent};
use serde::{Deserialize, Serialize};

/// The canonical record returned for a written event.
///
/// A record is identified by its partition and `sequence_index`. The JSON
/// form keeps the field names download consumers already parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Store-assigned, per-partition sequence index.
    #[serde(rename = "downloadindex")]
    pub sequence_index: i64,
    /// Tenant project the download belongs to.
    #[serde(rename = "project-id")]
    pub project_id: String,
    /// Public key of the requesting client.
    #[serde(rename = "public-key")]
    pub public_key: String,
    /// Client IP address.
    pub ip: String,
    /// Hash of the requested content.
    #[serde(rename = "hash")]
    pub content_hash: String,
    /// Unix seconds at which the store accepted the row. Only known when
    /// the record was read back.
    #[serde(rename = "inserted-at", default, skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<i64>,
}

impl EventRecord {
    /// Builds a record from the submitted fields and the assigned index.
    #[must_use]
    pub fn echo(event: NewEvent, sequence_index: i64) -> Self {
        Self {
            sequence_index,
            project_id: event.project_id,
            public_key: event.public_key,
            ip: event.ip,
            content_hash: event.content_hash,
            inserted_at: None,
        }
    }
}

impl From<StoredEvent> for EventRecord {
    fn from(stored: StoredEvent) -> Self {
        Self {
            inserted_at: Some(stored.inserted_at),
            ..Self::echo(stored.event, stored.sequence_index)
        }
    }
}
