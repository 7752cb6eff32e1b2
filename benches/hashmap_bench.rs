//! Benchmark for `PersistentHashMap` against the standard `HashMap`.

use canopy::{PersistentHashMap, TransientHashMap};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::HashMap;
use std::hint::black_box;

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("hashmap_insert");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = PersistentHashMap::new();
                    for index in 0..size {
                        map = map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("TransientHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut transient = TransientHashMap::new();
                    for index in 0..size {
                        transient.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(transient.persistent())
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = HashMap::new();
                    for index in 0..size {
                        map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("hashmap_get");

    for size in [1_000, 100_000] {
        let persistent: PersistentHashMap<u64, u64> =
            (0..size).map(|index| (index, index * 2)).collect();
        let standard: HashMap<u64, u64> = (0..size).map(|index| (index, index * 2)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    for index in 0..size {
                        black_box(persistent.get(black_box(&index)));
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    for index in 0..size {
                        black_box(standard.get(black_box(&index)));
                    }
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// clone-and-update Benchmark
// =============================================================================

fn benchmark_versioned_update(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("hashmap_versioned_update");

    for size in [10_000] {
        let persistent: PersistentHashMap<u64, u64> =
            (0..size).map(|index| (index, index)).collect();
        let standard: HashMap<u64, u64> = (0..size).map(|index| (index, index)).collect();

        // One updated version while the original stays live.
        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, _| {
                bencher.iter(|| black_box(persistent.insert(black_box(1), black_box(99))));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap_full_clone", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut copy = standard.clone();
                    copy.insert(black_box(1), black_box(99));
                    black_box(copy)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_versioned_update
);
criterion_main!(benches);
