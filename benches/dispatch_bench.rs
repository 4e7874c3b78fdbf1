//! Benchmarks for the dispatch pool.
//!
//! Benchmarks cover:
//! - Key routing hash
//! - Submit-and-drain throughput across lane counts
//! - Post-run statistics aggregation

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;

use tsdb_dispatch::config::DispatchConfig;
use tsdb_dispatch::core::{lane_for, DispatchPool, FnExecutor, StatsSummary, WorkItem};

fn routing_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("host_{i:06}")).collect()
}

fn bench_routing(c: &mut Criterion) {
    let keys = routing_keys(1_000);
    let mut group = c.benchmark_group("routing");
    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("lane_for_1000_keys", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(lane_for(black_box(key), 10));
            }
        });
    });
    group.finish();
}

fn bench_submit_drain(c: &mut Criterion) {
    let keys = routing_keys(200);
    let mut group = c.benchmark_group("submit_drain");
    group.throughput(Throughput::Elements(keys.len() as u64));

    for lanes in [1usize, 4, 10] {
        group.bench_with_input(BenchmarkId::from_parameter(lanes), &lanes, |b, &lanes| {
            b.iter(|| {
                let executor = FnExecutor::new(|_lane: usize, item: &WorkItem<usize>| {
                    black_box(item.payload());
                });
                let pool = DispatchPool::new(DispatchConfig::new(), executor).unwrap();
                pool.start(lanes).unwrap();
                for (i, key) in keys.iter().enumerate() {
                    pool.submit(WorkItem::new(key.clone(), i).unwrap()).unwrap();
                }
                pool.stop().unwrap();
                black_box(pool.stats().unwrap())
            });
        });
    }
    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");
    for size in [1_000u64, 100_000] {
        let samples: Vec<Duration> = (0..size)
            .map(|i| Duration::from_micros((i * 7_919) % 50_000))
            .collect();
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &samples, |b, samples| {
            b.iter(|| {
                let mut copy = samples.clone();
                black_box(StatsSummary::from_samples(Duration::from_secs(1), &mut copy))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_routing, bench_submit_drain, bench_stats);
criterion_main!(benches);
