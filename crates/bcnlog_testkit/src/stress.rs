//! Concurrent writer harnesses.
//!
//! These helpers drive many writers into the same bucket at once to
//! exercise the provisioning race on a cold partition.

use bcnlog_core::{CoreResult, EventRecord, PartitionRouter};
use bcnlog_storage::NewEvent;
use parking_lot::Mutex;
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a concurrent write run.
#[derive(Debug)]
pub struct StressTestResult {
    /// Outcome of each writer, in completion order.
    pub outcomes: Vec<CoreResult<EventRecord>>,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Number of successful writes.
    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ok()).count()
    }

    /// Number of failed writes.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.successful()
    }

    /// Sequence indexes of the successful writes, sorted ascending.
    pub fn sorted_sequence_indexes(&self) -> Vec<i64> {
        let mut indexes: Vec<i64> = self
            .outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().ok())
            .map(|record| record.sequence_index)
            .collect();
        indexes.sort_unstable();
        indexes
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Writers: {}", self.outcomes.len());
        println!("Successful: {}", self.successful());
        println!("Failed: {}", self.failed());
        println!("Duration: {:?}", self.duration);
    }
}

/// Releases `writers` threads at once, each writing one event at `now`.
///
/// Writer `i` submits the content hash `hash-<i>`.
pub fn concurrent_first_writers(
    router: &PartitionRouter,
    writers: usize,
    now: i64,
) -> StressTestResult {
    let barrier = Barrier::new(writers);
    let outcomes = Mutex::new(Vec::with_capacity(writers));
    let start = Instant::now();

    thread::scope(|scope| {
        for i in 0..writers {
            let barrier = &barrier;
            let outcomes = &outcomes;
            scope.spawn(move || {
                let event = NewEvent::new("proj-A", "key-1", "1.2.3.4", format!("hash-{i}"));
                barrier.wait();
                let outcome = router.write(event, now);
                outcomes.lock().push(outcome);
            });
        }
    });

    StressTestResult {
        outcomes: outcomes.into_inner(),
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{StoreKind, TestStore, T0};
    use bcnlog_core::Config;

    #[test]
    fn single_writer_run() {
        let store = TestStore::scenario(StoreKind::Memory);
        let router = PartitionRouter::new(store.backend.clone(), &Config::default());

        let result = concurrent_first_writers(&router, 1, T0 + 10);
        assert_eq!(result.successful(), 1);
        assert_eq!(result.sorted_sequence_indexes(), vec![1]);
    }
}
