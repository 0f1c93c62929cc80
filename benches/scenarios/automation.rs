//! Benchmarks for rendering under parameter automation.
//!
//! The walker cost grows with the number of events per block; these measure
//! how much a dense automation lane costs over a static block.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_ramp::{
    engine::{render_with_events, BufferList, ParamEvent, RenderBuffers},
    unit::FilterKernel,
    AudioFormat, EventTime, FilterUnit, ParamId, PullInput, UnitConfig,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

struct Ramp;

impl PullInput for Ramp {
    fn pull_input(&mut self, _: u64, frames: usize, input: &mut BufferList<'_>) -> Result<(), i32> {
        for ch in 0..input.channel_count() {
            if let Some(samples) = input.channel_mut(ch) {
                for (i, sample) in samples.iter_mut().enumerate() {
                    *sample = (i as f32 / frames as f32) * 2.0 - 1.0;
                }
            }
        }
        Ok(())
    }
}

pub fn bench_walker(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/walker");

    for &size in BLOCK_SIZES {
        let mut storage = vec![vec![0.0f32; size]; 2];
        let mut kernel = FilterKernel::new();
        kernel.prepare(SAMPLE_RATE, 2);

        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, &size| {
            b.iter(|| {
                let input = BufferList::from_channels(storage.iter_mut().map(|c| c.as_mut_slice()));
                let mut output = BufferList::unset(2, size);
                let buffers = RenderBuffers::prepare(&input, &mut output);
                black_box(render_with_events(&mut kernel, &[], size, &buffers));
            })
        });

        // A cutoff ramp every 8 frames, alternating direction
        let events: Vec<ParamEvent> = (0..size / 8)
            .map(|i| {
                let target = if i % 2 == 0 { 2_000.0 } else { 500.0 };
                ParamEvent::new((i * 8) as u32, ParamId::Cutoff, target, 8)
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("dense", size), &size, |b, &size| {
            b.iter(|| {
                let input = BufferList::from_channels(storage.iter_mut().map(|c| c.as_mut_slice()));
                let mut output = BufferList::unset(2, size);
                let buffers = RenderBuffers::prepare(&input, &mut output);
                black_box(render_with_events(&mut kernel, &events, size, &buffers));
            })
        });
    }

    group.finish();
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");
    let format = AudioFormat::stereo(SAMPLE_RATE as f64);

    for &size in BLOCK_SIZES {
        let unit = FilterUnit::new(UnitConfig::new().max_frames(size));
        let Ok((mut renderer, mut controller)) = unit.allocate_render_resources(format, format) else {
            continue;
        };

        let mut timestamp = 0u64;
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("in_place", size), &size, |b, &size| {
            b.iter(|| {
                flip = !flip;
                let target = if flip { 3_000.0 } else { 300.0 };
                let _ = controller.schedule(EventTime::Immediate, size as u32, ParamId::Cutoff, target);

                let mut output = BufferList::unset(2, size);
                let result = renderer.render(timestamp, size as u32, &mut Ramp, &mut output);
                timestamp += size as u64;
                black_box(result)
            })
        });
    }

    group.finish();
}
