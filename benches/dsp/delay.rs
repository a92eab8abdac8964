//! Benchmarks for the feedback delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepfx::dsp::delay::FeedbackDelay;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Test with different delay times (in samples)
    let delay_times: &[f32] = &[
        480.0,   // 10ms at 48kHz
        12000.0, // 250ms at 48kHz
        48000.0, // 1 second at 48kHz
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let delay_ms = delay_samples / 48.0;
            let mut delay = FeedbackDelay::new();
            group.bench_with_input(
                BenchmarkId::new(format!("feedback_{}ms", delay_ms as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut sum = 0.0f32;
                        for &sample in &input {
                            sum += delay.process(black_box(sample), delay_samples, 0.5);
                        }
                        sum
                    })
                },
            );
        }
    }

    group.finish();
}
