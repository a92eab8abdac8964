//! Benchmarks for the full engine playing a busy pattern through effects.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepfx::{config::EngineConfig, engine, engine::OpenGate};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let (mut engine, mut controller) = engine::build(&EngineConfig::default());
        for col in 0..8 {
            controller.toggle_cell(col % 4, col).unwrap();
            controller.toggle_hihat(col).unwrap();
        }
        controller.init_effects().unwrap();
        controller.connect_to_effects().unwrap();
        controller.play(&mut OpenGate).unwrap();

        let mut out = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("playing_with_fx", size), &size, |b, _| {
            b.iter(|| {
                engine.process(black_box(&mut out));
                // Keep the event queue from filling up.
                controller.poll();
            })
        });
    }

    group.finish();
}
