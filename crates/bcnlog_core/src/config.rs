//! Write path configuration and store bootstrap.

use crate::error::{CoreError, CoreResult};
use bcnlog_storage::{open_backend, PartitionBackend};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// File name the store URL is read from when no other path is given.
pub const DEFAULT_STORE_FILE: &str = "url-store.json";

/// What the resolver does when no window covers a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Route the event to [`BucketId::UNRESOLVED`](bcnlog_storage::BucketId::UNRESOLVED).
    #[default]
    FallbackToZero,
    /// Fail the write with [`CoreError::Unresolved`].
    Reject,
}

/// Configuration for the write path.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Re-read every written row so the returned record carries
    /// store-assigned fields such as the insertion time.
    pub confirm_via_readback: bool,

    /// Behaviour when no bucket window matches.
    pub unresolved_policy: UnresolvedPolicy,
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether confirmed records are re-read from storage.
    #[must_use]
    pub const fn confirm_via_readback(mut self, value: bool) -> Self {
        self.confirm_via_readback = value;
        self
    }

    /// Sets the unresolved bucket policy.
    #[must_use]
    pub const fn unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved_policy = policy;
        self
    }
}

/// Contents of the store URL file: `{"url": "sqlite://downloads.db"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreUrl {
    /// Connection URL understood by [`bcnlog_storage::BackendUrl`].
    pub url: String,
}

impl StoreUrl {
    /// Parses a store URL document.
    ///
    /// # Errors
    ///
    /// Returns a config error if the JSON is malformed or has no `url`.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| CoreError::config(format!("invalid store url document: {err}")))
    }

    /// Reads and parses a store URL file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a config error
    /// if it cannot be parsed.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            tracing::error!(path = %path.display(), error = %err, "unable to read store url file");
            err
        })?;
        Self::from_json(&contents)
    }

    /// Opens the backend named by the URL.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the URL is unsupported or cannot be opened.
    pub fn open(&self) -> CoreResult<Arc<dyn PartitionBackend>> {
        Ok(open_backend(&self.url)?)
    }
}
