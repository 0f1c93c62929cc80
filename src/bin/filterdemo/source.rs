//! Test signal for the demo: two slightly detuned band-limited saws.

use saavy_ramp::{engine::BufferList, PullInput};

const DETUNE_CENTS: f32 = 9.0;
const LEVEL: f32 = 0.3;

#[inline]
fn polyblep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

struct Saw {
    phase: f32,
    increment: f32,
}

impl Saw {
    fn new(freq: f32, sample_rate: f32, phase: f32) -> Self {
        Self {
            phase,
            increment: freq / sample_rate,
        }
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let value = 2.0 * self.phase - 1.0 - polyblep(self.phase, self.increment);
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value
    }
}

/// Upstream "bus" for the filter: the left channel leans on the lower saw, the
/// right on the upper one.
pub struct SawPair {
    low: Saw,
    high: Saw,
}

impl SawPair {
    pub fn new(freq: f32, sample_rate: f32) -> Self {
        let spread = 2.0f32.powf(DETUNE_CENTS / 1200.0);
        Self {
            low: Saw::new(freq / spread, sample_rate, 0.0),
            high: Saw::new(freq * spread, sample_rate, 0.5),
        }
    }
}

impl PullInput for SawPair {
    fn pull_input(
        &mut self,
        _timestamp: u64,
        frame_count: usize,
        input: &mut BufferList<'_>,
    ) -> Result<(), i32> {
        let channels = input.channel_count();
        for frame in 0..frame_count {
            let low = self.low.next_sample();
            let high = self.high.next_sample();

            for ch in 0..channels {
                let (a, b) = if ch % 2 == 0 { (0.65, 0.35) } else { (0.35, 0.65) };
                if let Some(samples) = input.channel_mut(ch) {
                    if let Some(sample) = samples.get_mut(frame) {
                        *sample = LEVEL * (a * low + b * high);
                    }
                }
            }
        }
        Ok(())
    }
}
