//! Timestamp to bucket resolution.

use crate::config::UnresolvedPolicy;
use crate::error::{CoreError, CoreResult};
use bcnlog_storage::{BucketId, PartitionBackend};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maps a timestamp to the bucket whose window contains it.
///
/// The resolver is a pure read of the window relation: it holds no state
/// and caches nothing, so it is safe to share between writers.
///
/// - no matching window: [`BucketId::UNRESOLVED`], or
///   [`CoreError::Unresolved`] under [`UnresolvedPolicy::Reject`]
/// - several matching windows: the last one scanned (highest bucket id)
pub struct BucketResolver {
    backend: Arc<dyn PartitionBackend>,
    policy: UnresolvedPolicy,
}

impl BucketResolver {
    /// Creates a resolver reading windows from `backend`.
    pub fn new(backend: Arc<dyn PartitionBackend>, policy: UnresolvedPolicy) -> Self {
        Self { backend, policy }
    }

    /// Returns the unresolved bucket policy.
    #[must_use]
    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    /// Resolves `timestamp` (Unix seconds) to a bucket.
    ///
    /// # Errors
    ///
    /// Returns `Lookup` if the window relation cannot be read, or
    /// `Unresolved` if nothing matches and the policy rejects the fallback.
    pub fn resolve(&self, timestamp: i64) -> CoreResult<BucketId> {
        let windows = self
            .backend
            .lookup_windows(timestamp)
            .map_err(|source| CoreError::Lookup { timestamp, source })?;

        if windows.len() > 1 {
            warn!(
                timestamp,
                matches = windows.len(),
                "overlapping bucket windows, using the last match"
            );
        }

        match windows.last() {
            Some(window) => {
                debug!(timestamp, bucket = %window.bucket_id, "resolved bucket");
                Ok(window.bucket_id)
            }
            None => match self.policy {
                UnresolvedPolicy::FallbackToZero => {
                    warn!(timestamp, "no bucket window covers timestamp, using bucket 0");
                    Ok(BucketId::UNRESOLVED)
                }
                UnresolvedPolicy::Reject => Err(CoreError::Unresolved { timestamp }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcnlog_storage::{BucketWindow, InMemoryBackend, SqliteBackend};
    use proptest::prelude::*;

    const T0: i64 = 1_700_000_000;

    fn resolver(windows: Vec<BucketWindow>, policy: UnresolvedPolicy) -> BucketResolver {
        BucketResolver::new(Arc::new(InMemoryBackend::with_windows(windows)), policy)
    }

    #[test]
    fn resolves_single_window() {
        let r = resolver(
            vec![BucketWindow::new(BucketId::new(7), T0, T0 + 3600)],
            UnresolvedPolicy::default(),
        );
        assert_eq!(r.resolve(T0 + 10).unwrap(), BucketId::new(7));
        assert_eq!(r.resolve(T0).unwrap(), BucketId::new(7));
        assert_eq!(r.resolve(T0 + 3600).unwrap(), BucketId::new(7));
    }

    #[test]
    fn no_match_falls_back_to_zero() {
        let r = resolver(
            vec![BucketWindow::new(BucketId::new(7), T0, T0 + 3600)],
            UnresolvedPolicy::FallbackToZero,
        );
        assert_eq!(r.resolve(T0 + 3700).unwrap(), BucketId::UNRESOLVED);
    }

    #[test]
    fn no_match_rejected_when_configured() {
        let r = resolver(Vec::new(), UnresolvedPolicy::Reject);
        let err = r.resolve(T0).unwrap_err();
        assert!(matches!(err, CoreError::Unresolved { timestamp } if timestamp == T0));
    }

    #[test]
    fn overlapping_windows_take_last_scanned() {
        let r = resolver(
            vec![
                BucketWindow::new(BucketId::new(9), T0, T0 + 100),
                BucketWindow::new(BucketId::new(4), T0 + 50, T0 + 200),
            ],
            UnresolvedPolicy::default(),
        );
        assert_eq!(r.resolve(T0 + 75).unwrap(), BucketId::new(9));
        assert_eq!(r.resolve(T0 + 150).unwrap(), BucketId::new(4));
    }

    #[test]
    fn lookup_failure_is_surfaced() {
        // No window relation exists in a fresh SQLite database.
        let backend = Arc::new(SqliteBackend::open_in_memory().unwrap());
        let r = BucketResolver::new(backend, UnresolvedPolicy::default());
        let err = r.resolve(T0).unwrap_err();
        assert!(matches!(err, CoreError::Lookup { timestamp, .. } if timestamp == T0));
    }

    proptest! {
        #[test]
        fn single_matching_window_resolves_to_its_bucket(
            bucket in 1i64..10_000,
            start in 0i64..1_000_000_000,
            len in 0i64..86_400,
            offset in 0i64..86_400,
        ) {
            let end = start + len;
            let t = start + offset.min(len);
            let r = resolver(
                vec![
                    BucketWindow::new(BucketId::new(bucket), start, end),
                    BucketWindow::new(BucketId::new(bucket + 1), end + 1, end + 3600),
                ],
                UnresolvedPolicy::default(),
            );
            prop_assert_eq!(r.resolve(t).unwrap(), BucketId::new(bucket));
        }
    }
}
