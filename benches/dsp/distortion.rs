//! Benchmarks for waveshaping distortion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepfx::dsp::distortion;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for amount in [0.0f32, 0.4, 1.0] {
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("shape_{}", amount), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        for (out, &x) in buffer.iter_mut().zip(&input) {
                            *out = distortion::shape(black_box(x), black_box(amount));
                        }
                    })
                },
            );
        }
    }

    group.finish();
}
