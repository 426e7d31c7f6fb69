//! # Tank-Bench Domain Benchmarks
//!
//! | Component | Operation | Scale |
//! |-----------|-----------|-------|
//! | tb-01 Topology | rejection-sampled graph | 100 to 2000 tanks |
//! | tb-03 Traffic | snapshot diff and inventory estimate | 1000 tanks |
//! | tb-05 Experiment | output split | per transaction |

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{Amount, MessageCounter, MessageStats};
use tb_01_topology::{generate, TopologyConfig, DEFAULT_OUTBOUND};
use tb_03_traffic::{Direction, TrafficDiff, TrafficSnapshot};
use tb_05_experiment::{split_outputs, DEFAULT_FEE};

const MESSAGES: [&str; 6] = ["inv", "getdata", "tx", "headers", "ping", "pong"];

fn bench_topology_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("tb-01-topology");

    for size in [100, 500, 2000] {
        let config = TopologyConfig::new(size, size / 2, DEFAULT_OUTBOUND);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("generate", size), &config, |b, config| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| black_box(generate(config, &mut rng).ok()))
        });
    }

    group.finish();
}

fn random_stats(rng: &mut StdRng, scale: u64) -> MessageStats {
    let mut counters = || -> BTreeMap<String, MessageCounter> {
        MESSAGES
            .iter()
            .map(|message| {
                let count = rng.gen_range(0..100) * scale;
                let counter = MessageCounter {
                    count,
                    bytes: count * rng.gen_range(24..400),
                };
                (message.to_string(), counter)
            })
            .collect()
    };
    MessageStats {
        sent: counters(),
        recv: counters(),
    }
}

fn bench_traffic_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("tb-03-traffic");
    let mut rng = StdRng::seed_from_u64(7);

    let before_stats: Vec<_> = (0..1000).map(|_| random_stats(&mut rng, 1)).collect();
    let after_stats: Vec<_> = (0..1000).map(|_| random_stats(&mut rng, 3)).collect();

    group.bench_function("snapshot_1000_tanks", |b| {
        b.iter(|| black_box(TrafficSnapshot::from_stats(before_stats.iter().cloned())))
    });

    let before = TrafficSnapshot::from_stats(before_stats);
    let after = TrafficSnapshot::from_stats(after_stats);
    group.bench_function("diff_and_inv_estimate", |b| {
        b.iter(|| {
            let diff = TrafficDiff::between(&before, &after).only(Direction::Sent);
            black_box(diff.inv_entry_estimate())
        })
    });

    group.finish();
}

fn bench_output_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("tb-05-experiment");
    group.bench_function("split_outputs", |b| {
        let mut units = 20_000u64;
        b.iter(|| {
            units = units.wrapping_mul(31).wrapping_add(7) % 5_000_000_000;
            black_box(split_outputs(Amount::from_units(units), DEFAULT_FEE))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_topology_generation,
    bench_traffic_diff,
    bench_output_split
);
criterion_main!(benches);
