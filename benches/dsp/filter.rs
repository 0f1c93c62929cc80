//! Benchmarks for the state-variable low-pass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_ramp::dsp::filter::{magnitude_response, Coefficients, SvfState};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed coefficients
        let mut state = SvfState::new();
        let coeffs = Coefficients::new(1_000.0, 6.0, 48_000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                state.render(black_box(&mut buffer), black_box(coeffs));
            })
        });

        // Coefficients recomputed every sample, as during a ramp
        let mut state = SvfState::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_modulated", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let coeffs = Coefficients::new(200.0 + i as f32 * 10.0, 6.0, 48_000.0);
                    *sample = state.next_sample(input[i], coeffs);
                }
                black_box(&buffer);
            })
        });
    }

    let freqs: Vec<f32> = (0..256).map(|i| 20.0 * 1000.0f32.powf(i as f32 / 255.0)).collect();
    let mut out = vec![0.0f32; freqs.len()];
    group.bench_function("magnitude_response/256", |b| {
        b.iter(|| magnitude_response(black_box(1_000.0), black_box(6.0), 48_000.0, &freqs, &mut out))
    });

    group.finish();
}
