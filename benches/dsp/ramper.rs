//! Benchmarks for the parameter ramper.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_ramp::ParameterRamper;

use crate::BLOCK_SIZES;

pub fn bench_ramper(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ramper");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Ramp restarted every block, so every sample takes the multiply-add
        let mut ramper = ParameterRamper::new(0.0);
        group.bench_with_input(BenchmarkId::new("ramping", size), &size, |b, &size| {
            b.iter(|| {
                ramper.start_ramp(black_box(1.0), size as u32);
                for sample in buffer.iter_mut() {
                    *sample = ramper.get_step();
                }
            })
        });

        // At rest: the fast path
        let mut ramper = ParameterRamper::new(0.5);
        group.bench_with_input(BenchmarkId::new("resting", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = ramper.get_step();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
