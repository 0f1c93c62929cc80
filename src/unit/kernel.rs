//! The filter kernel: ramped cutoff and resonance driving one low-pass per
//! channel.

use std::{cell::Cell, ops::Range};

use crate::{
    dsp::{
        filter::{Coefficients, SvfState},
        ramper::ParameterRamper,
    },
    engine::{buffers::RenderBuffers, event::ParamEvent, walker::RenderKernel},
    params::{ParamId, PARAMS},
    MAX_CHANNELS,
};

const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// Per-sample state of the effect.
///
/// Owns one [`ParameterRamper`] per [`ParamId`], indexed densely, and one
/// filter state per channel. Channel state is sized by [`prepare`](Self::prepare)
/// outside the render context.
#[derive(Debug, Clone)]
pub struct FilterKernel {
    rampers: [ParameterRamper; ParamId::COUNT],
    channels: Vec<SvfState>,
    sample_rate: f32,
    coeffs: Coefficients,
    // (cutoff, resonance) the cached coefficients were computed from
    coeff_inputs: (f32, f32),
}

impl FilterKernel {
    pub fn new() -> Self {
        let rampers = PARAMS.map(|spec| ParameterRamper::with_bounds(spec.default, spec.min, spec.max));
        let cutoff = rampers[ParamId::Cutoff.index()].get();
        let resonance = rampers[ParamId::Resonance.index()].get();

        Self {
            rampers,
            channels: Vec::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            coeffs: Coefficients::new(cutoff, resonance, DEFAULT_SAMPLE_RATE),
            coeff_inputs: (cutoff, resonance),
        }
    }

    /// Size the per-channel state and clear it. Allocates.
    pub fn prepare(&mut self, sample_rate: f32, channels: usize) {
        self.sample_rate = sample_rate;
        self.channels = vec![SvfState::new(); channels.min(MAX_CHANNELS)];
        self.update_coefficients(self.value(ParamId::Cutoff), self.value(ParamId::Resonance));
    }

    /// Clear the filter memory of every channel.
    pub fn reset(&mut self) {
        for state in &mut self.channels {
            state.reset();
        }
    }

    /// Jump `id` to `value` with no ramp.
    pub fn set(&mut self, id: ParamId, value: f32) {
        self.rampers[id.index()].set(value);
    }

    /// Finish every ramp in progress.
    pub fn settle(&mut self) {
        for ramper in &mut self.rampers {
            ramper.set(ramper.goal());
        }
    }

    /// Where `id` is heading.
    pub fn goal(&self, id: ParamId) -> f32 {
        self.rampers[id.index()].goal()
    }

    /// Where `id` is right now.
    pub fn value(&self, id: ParamId) -> f32 {
        self.rampers[id.index()].get()
    }

    pub fn ramper(&self, id: ParamId) -> &ParameterRamper {
        &self.rampers[id.index()]
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coeffs
    }

    #[inline]
    fn update_coefficients(&mut self, cutoff: f32, resonance: f32) {
        self.coeffs = Coefficients::new(cutoff, resonance, self.sample_rate);
        self.coeff_inputs = (cutoff, resonance);
    }
}

impl Default for FilterKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderKernel for FilterKernel {
    #[inline]
    fn apply_event(&mut self, event: &ParamEvent) {
        let ramper = &mut self.rampers[event.param.index()];
        if event.ramp_frames == 0 {
            ramper.set(event.value);
        } else {
            ramper.start_ramp(event.value, event.ramp_frames);
        }
    }

    fn process(&mut self, buffers: &RenderBuffers<'_>, frames: Range<usize>) {
        let channel_count = buffers.channel_count().min(self.channels.len());

        let mut inputs: [&[Cell<f32>]; MAX_CHANNELS] = [&[]; MAX_CHANNELS];
        let mut outputs: [&[Cell<f32>]; MAX_CHANNELS] = [&[]; MAX_CHANNELS];
        for ch in 0..channel_count {
            inputs[ch] = buffers.input(ch, frames.clone());
            outputs[ch] = buffers.output(ch, frames.clone());
        }

        for frame in 0..frames.len() {
            let cutoff = self.rampers[ParamId::Cutoff.index()].get_step();
            let resonance = self.rampers[ParamId::Resonance.index()].get_step();
            if (cutoff, resonance) != self.coeff_inputs {
                self.update_coefficients(cutoff, resonance);
            }

            let coeffs = self.coeffs;
            for (ch, state) in self.channels[..channel_count].iter_mut().enumerate() {
                // Unset channels come through as empty views
                if let (Some(x), Some(y)) = (inputs[ch].get(frame), outputs[ch].get(frame)) {
                    y.set(state.next_sample(x.get(), coeffs));
                }
            }
        }
    }
}
