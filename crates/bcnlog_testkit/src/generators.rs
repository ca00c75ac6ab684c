//! Property-based test generators using proptest.

use bcnlog_storage::{BucketId, BucketWindow, NewEvent};
use proptest::prelude::*;

/// Strategy for generating download events with realistic field shapes.
pub fn event_strategy() -> impl Strategy<Value = NewEvent> {
    (
        prop::string::string_regex("proj-[a-z0-9]{1,12}").expect("Invalid regex"),
        prop::string::string_regex("[A-Za-z0-9]{8,44}").expect("Invalid regex"),
        (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>()),
        prop::string::string_regex("[0-9a-f]{64}").expect("Invalid regex"),
    )
        .prop_map(|(project, key, (a, b, c, d), hash)| {
            NewEvent::new(project, key, format!("{a}.{b}.{c}.{d}"), hash)
        })
}

/// Strategy for generating bucket ids that are never the fallback bucket.
pub fn bucket_id_strategy() -> impl Strategy<Value = BucketId> {
    (1i64..1_000_000).prop_map(BucketId::new)
}

/// Strategy for generating contiguous, non-overlapping windows starting at
/// `start`, with consecutive bucket ids from 1.
pub fn window_layout_strategy(start: i64) -> impl Strategy<Value = Vec<BucketWindow>> {
    prop::collection::vec(1i64..7200, 1..16).prop_map(move |lengths| {
        let mut windows = Vec::with_capacity(lengths.len());
        let mut cursor = start;
        for (i, len) in lengths.into_iter().enumerate() {
            let end = cursor + len - 1;
            windows.push(BucketWindow::new(BucketId::new(i as i64 + 1), cursor, end));
            cursor = end + 1;
        }
        windows
    })
}
