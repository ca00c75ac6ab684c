//! Row and key types shared by every backend.

use std::fmt;

/// Identifier of one time partition ("BCN" bucket).
///
/// Bucket ids are resolved from the window relation at write time and are
/// never stored on the event itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BucketId(pub i64);

impl BucketId {
    /// The bucket used when no window covers a timestamp.
    pub const UNRESOLVED: BucketId = BucketId(0);

    /// Creates a new bucket ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Returns true for the fallback bucket.
    #[must_use]
    pub const fn is_unresolved(self) -> bool {
        self.0 == Self::UNRESOLVED.0
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bcn:{}", self.0)
    }
}

/// A row of the externally maintained window relation.
///
/// Both bounds are Unix seconds and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWindow {
    /// Bucket assigned to this window.
    pub bucket_id: BucketId,
    /// First second covered by the window.
    pub start_time: i64,
    /// Last second covered by the window.
    pub end_time: i64,
}

impl BucketWindow {
    /// Creates a new window.
    #[must_use]
    pub const fn new(bucket_id: BucketId, start_time: i64, end_time: i64) -> Self {
        Self {
            bucket_id,
            start_time,
            end_time,
        }
    }

    /// Returns true if `timestamp` falls inside the window.
    #[must_use]
    pub const fn contains(&self, timestamp: i64) -> bool {
        self.start_time <= timestamp && timestamp <= self.end_time
    }
}

/// The caller-supplied fields of a download event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Tenant project the download belongs to.
    pub project_id: String,
    /// Public key of the requesting client.
    pub public_key: String,
    /// Client IP address.
    pub ip: String,
    /// Hash of the requested content.
    pub content_hash: String,
}

impl NewEvent {
    /// Creates a new event.
    pub fn new(
        project_id: impl Into<String>,
        public_key: impl Into<String>,
        ip: impl Into<String>,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            public_key: public_key.into(),
            ip: ip.into(),
            content_hash: content_hash.into(),
        }
    }
}

/// A full row read back from a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    /// Store-assigned, per-partition sequence index.
    pub sequence_index: i64,
    /// The submitted fields.
    pub event: NewEvent,
    /// Unix seconds at which the store accepted the row.
    pub inserted_at: i64,
}

/// A row for the client registration table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    /// Public key of the client.
    pub public_key: String,
    /// Client IP address.
    pub ip: String,
    /// Owning customer. Never empty once it reaches a backend.
    pub customer_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_id_display() {
        assert_eq!(format!("{}", BucketId::new(7)), "bcn:7");
    }

    #[test]
    fn unresolved_is_zero() {
        assert!(BucketId::UNRESOLVED.is_unresolved());
        assert!(BucketId::default().is_unresolved());
        assert!(!BucketId::new(3).is_unresolved());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = BucketWindow::new(BucketId::new(7), 100, 200);
        assert!(window.contains(100));
        assert!(window.contains(150));
        assert!(window.contains(200));
        assert!(!window.contains(99));
        assert!(!window.contains(201));
    }
}
