//! Sample-accurate rendering around parameter events.

/*
Splitting a Block at Events
===========================

A render block covers `frame_count` samples, but parameter changes can land
anywhere inside it. Applying every change at the top of the block would
quantise automation to the block size (10 ms at 512 frames / 48 kHz), which is
audible on fast sweeps and makes timing depend on the host's buffer size.

Instead the block is cut at every event:

    offsets:      0        100            300            512
                  |---------|--------------|--------------|
    events:                 ^ cutoff       ^ resonance
    process:      [0, 100)  [100, 300)     [300, 512)

    cursor = 0
    for each event (in offset order):
        process [cursor, event.offset)     ← old parameter state
        apply event                        ← start_ramp / set
        cursor = event.offset
    process [cursor, frame_count)

Each event therefore takes effect on exactly the sample it names. Inside a
sub-range nothing but the ramps changes, so the kernel can run a tight loop.

With no events the whole block is one `process` call.


Ties and Bad Input
------------------

  Same offset, different params    independent, order irrelevant
  Same offset, same param          applied in order, the last one wins
  offset >= frame_count            ignored (counted), never fails the render
  offset behind the cursor         applied at the cursor (counted as late)
*/

use std::ops::Range;

use crate::engine::{buffers::RenderBuffers, event::ParamEvent};

/// The per-sample processor driven by the walker.
pub trait RenderKernel {
    /// Apply one parameter change at the current position.
    fn apply_event(&mut self, event: &ParamEvent);

    /// Render `frames` of `buffers` using the current parameter state.
    fn process(&mut self, buffers: &RenderBuffers<'_>, frames: Range<usize>);
}

/// What happened while walking one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Number of `process` calls made
    pub segments: u32,
    pub applied: u32,
    /// Events at or past the end of the block
    pub ignored: u32,
    /// Events behind the cursor, applied at the cursor
    pub late: u32,
}

impl WalkReport {
    pub fn has_anomalies(&self) -> bool {
        self.ignored != 0 || self.late != 0
    }
}

/// Render `frame_count` frames, applying each event at its sample offset.
///
/// `events` should be sorted by offset; anything out of order is clamped
/// rather than rejected. `frame_count` is limited to what `buffers` can hold.
pub fn render_with_events<K: RenderKernel>(
    kernel: &mut K,
    events: &[ParamEvent],
    frame_count: usize,
    buffers: &RenderBuffers<'_>,
) -> WalkReport {
    let mut report = WalkReport::default();
    let frame_count = frame_count.min(buffers.frames());

    if events.is_empty() {
        if frame_count > 0 {
            kernel.process(buffers, 0..frame_count);
            report.segments = 1;
        }
        return report;
    }

    let mut frames_rendered = 0;
    for event in events {
        let offset = event.sample_offset as usize;
        if offset >= frame_count {
            report.ignored += 1;
            continue;
        }

        if offset < frames_rendered {
            report.late += 1;
        } else if offset > frames_rendered {
            kernel.process(buffers, frames_rendered..offset);
            report.segments += 1;
            frames_rendered = offset;
        }

        kernel.apply_event(event);
        report.applied += 1;
    }

    if frames_rendered < frame_count {
        kernel.process(buffers, frames_rendered..frame_count);
        report.segments += 1;
    }

    report
}
