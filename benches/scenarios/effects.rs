//! Benchmarks for the effects graph under different routings.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepfx::graph::{EffectsGraph, LaneMask, SourceRouting};

use crate::BLOCK_SIZES;

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/effects");

    for &size in BLOCK_SIZES {
        let source: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let mut out = vec![0.0f32; size];

        for (name, routing) in [
            ("direct", SourceRouting::Direct),
            ("all_lanes", SourceRouting::Paths(LaneMask::all())),
        ] {
            let mut graph = EffectsGraph::new(48_000.0);
            graph.init();
            let mut now = 0u64;
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    graph.render(black_box(&source), routing, black_box(&mut out), now);
                    now += size as u64;
                })
            });
        }
    }

    group.finish();
}
