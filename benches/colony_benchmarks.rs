//! Colony benchmarks.
//!
//! Run with: cargo bench --bench colony_benchmarks

use acosim::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for n in [20, 50, 100] {
        group.bench_with_input(BenchmarkId::new("complete", n), &n, |b, &n| {
            let params = GraphParams::new(n).with_seed(42);
            b.iter(|| black_box(GraphBuilder::build_seeded(&params)));
        });
        group.bench_with_input(BenchmarkId::new("ring_chords_k4", n), &n, |b, &n| {
            let params = GraphParams::new(n).with_edges_per_node(4).with_seed(42);
            b.iter(|| black_box(GraphBuilder::build_seeded(&params)));
        });
        group.bench_with_input(BenchmarkId::new("mst_nearest_k4", n), &n, |b, &n| {
            let params = GraphParams::new(n)
                .with_edges_per_node(4)
                .with_strategy(KRegularStrategy::MstNearest)
                .with_seed(42);
            b.iter(|| black_box(GraphBuilder::build_seeded(&params)));
        });
    }

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("colony_iteration");
    group.sample_size(50);

    for n in [20, 50] {
        let Ok(graph) = GraphBuilder::build_seeded(&GraphParams::new(n).with_seed(7)) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("ants_20", n), &graph, |b, graph| {
            let params = AlgorithmParams::default()
                .with_ant_count(20)
                .with_max_iterations(usize::MAX)
                .with_improvement_threshold(usize::MAX);
            b.iter_batched(
                || AcoEngine::start_seeded(graph.clone(), params.clone(), Some(7)),
                |engine| engine.ok().and_then(|mut e| e.next()),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_graph_build, bench_iteration);
criterion_main!(benches);
