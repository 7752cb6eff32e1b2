//! Benchmark for `PersistentTreeMap` and the tree set algebra.

use canopy::{PersistentTreeMap, PersistentTreeSet};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("treemap_insert");

    for size in [1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("PersistentTreeMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = PersistentTreeMap::new();
                    for index in 0..size {
                        map = map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("BTreeMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = BTreeMap::new();
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
// union Benchmark — join/split bulk union against repeated insertion
// =============================================================================

fn benchmark_union(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("treeset_union");

    for size in [1_000, 10_000] {
        let left: PersistentTreeSet<u64> = (0..size).collect();
        let right: PersistentTreeSet<u64> = (size / 2..size + size / 2).collect();

        group.bench_with_input(BenchmarkId::new("bulk_union", size), &size, |bencher, _| {
            bencher.iter(|| black_box(left.union(&right)));
        });

        group.bench_with_input(
            BenchmarkId::new("element_by_element", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut result = left.clone();
                    for element in right.iter() {
                        result = result.insert(*element);
                    }
                    black_box(result)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_insert, benchmark_union);
criterion_main!(benches);
