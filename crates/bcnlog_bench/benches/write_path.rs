//! Write path benchmarks: warm partitions versus cold buckets.

use bcnlog_core::{Config, PartitionRouter};
use bcnlog_storage::{BucketId, BucketWindow, InMemoryBackend, NewEvent, SqliteBackend};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::Rng;
use std::sync::Arc;

const T0: i64 = 1_700_000_000;

fn random_event() -> NewEvent {
    let mut rng = rand::thread_rng();
    let hash: String = (0..32).map(|_| format!("{:02x}", rng.gen::<u8>())).collect();
    NewEvent::new("proj-A", "key-1", "1.2.3.4", hash)
}

/// Benchmark writes into an already provisioned bucket.
fn bench_warm_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_write");

    for readback in [false, true] {
        group.bench_with_input(
            BenchmarkId::new("memory", readback),
            &readback,
            |b, &readback| {
                let backend = Arc::new(InMemoryBackend::with_windows(vec![BucketWindow::new(
                    BucketId::new(7),
                    T0,
                    T0 + 3600,
                )]));
                let router =
                    PartitionRouter::new(backend, &Config::new().confirm_via_readback(readback));
                router.write(random_event(), T0).unwrap();
                let event = random_event();

                b.iter(|| black_box(router.write(event.clone(), black_box(T0 + 10)).unwrap()));
            },
        );
    }

    group.bench_function("sqlite", |b| {
        let backend = Arc::new(SqliteBackend::open_in_memory().unwrap());
        backend.create_window_table().unwrap();
        backend
            .add_window(BucketWindow::new(BucketId::new(7), T0, T0 + 3600))
            .unwrap();
        let router = PartitionRouter::new(backend, &Config::default());
        router.write(random_event(), T0).unwrap();
        let event = random_event();

        b.iter(|| black_box(router.write(event.clone(), black_box(T0 + 10)).unwrap()));
    });

    group.finish();
}

/// Benchmark the first write into a new bucket, provisioning included.
///
/// Every measured write runs against a fresh store, so the bucket is always
/// cold.
fn bench_cold_write(c: &mut Criterion) {
    let event = random_event();

    c.bench_function("cold_write_sqlite", |b| {
        b.iter_batched_ref(
            || {
                let backend = Arc::new(SqliteBackend::open_in_memory().unwrap());
                backend.create_window_table().unwrap();
                backend
                    .add_window(BucketWindow::new(BucketId::new(7), T0, T0 + 3600))
                    .unwrap();
                PartitionRouter::new(backend, &Config::default())
            },
            |router| black_box(router.write(event.clone(), T0 + 10).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_warm_write, bench_cold_write);
criterion_main!(benches);
