//! Unit configuration, bus formats and allocation errors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{MAX_BLOCK_SIZE, MAX_CHANNELS};

/// Sample rate and channel count of one bus.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFormat {
    pub sample_rate: f64,
    pub channels: usize,
}

impl AudioFormat {
    pub fn new(sample_rate: f64, channels: usize) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn stereo(sample_rate: f64) -> Self {
        Self::new(sample_rate, 2)
    }
}

/// Sizing and smoothing for a [`FilterUnit`](super::FilterUnit).
///
/// ```ignore
/// let config = UnitConfig::new().max_frames(256).smoothing_ms(10.0);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConfig {
    /// Largest block a single render call may ask for
    pub max_frames: usize,
    /// Events the renderer can hold for one block
    pub event_capacity: usize,
    /// Slots in the control-to-render queue
    pub queue_capacity: usize,
    /// Ramp length used by `set_value` once render resources exist
    pub smoothing_ms: f32,
}

impl UnitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_frames(mut self, frames: usize) -> Self {
        self.max_frames = frames;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn smoothing_ms(mut self, ms: f32) -> Self {
        self.smoothing_ms = ms.max(0.0);
        self
    }

    /// Smoothing time converted to frames at `sample_rate`.
    pub fn ramp_frames(&self, sample_rate: f64) -> u32 {
        let frames = f64::from(self.smoothing_ms) * 0.001 * sample_rate;
        if frames.is_finite() && frames > 0.0 {
            frames.round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }

    /// Check a pair of bus formats against this configuration.
    pub fn validate(&self, input: AudioFormat, output: AudioFormat) -> Result<(), UnitError> {
        if self.max_frames == 0 || self.max_frames > MAX_BLOCK_SIZE {
            return Err(UnitError::InvalidMaxFrames {
                requested: self.max_frames,
                max: MAX_BLOCK_SIZE,
            });
        }

        if input.channels == 0 || output.channels == 0 {
            return Err(UnitError::NoChannels);
        }

        let widest = input.channels.max(output.channels);
        if widest > MAX_CHANNELS {
            return Err(UnitError::TooManyChannels {
                requested: widest,
                max: MAX_CHANNELS,
            });
        }

        if input.channels != output.channels {
            return Err(UnitError::ChannelCountMismatch {
                input: input.channels,
                output: output.channels,
            });
        }

        for rate in [input.sample_rate, output.sample_rate] {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(UnitError::InvalidSampleRate(rate));
            }
        }

        if input.sample_rate != output.sample_rate {
            return Err(UnitError::SampleRateMismatch {
                input: input.sample_rate,
                output: output.sample_rate,
            });
        }

        Ok(())
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            max_frames: 512,
            event_capacity: 256,
            queue_capacity: 1024,
            smoothing_ms: 20.0,
        }
    }
}

/// Reasons render resources cannot be allocated.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitError {
    /// A bus has zero channels
    NoChannels,
    TooManyChannels { requested: usize, max: usize },
    /// The effect processes channel N of the input into channel N of the output
    ChannelCountMismatch { input: usize, output: usize },
    SampleRateMismatch { input: f64, output: f64 },
    InvalidSampleRate(f64),
    InvalidMaxFrames { requested: usize, max: usize },
}

impl std::fmt::Display for UnitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitError::NoChannels => write!(f, "Bus format has no channels"),
            UnitError::TooManyChannels { requested, max } => {
                write!(f, "Too many channels: {} requested, at most {}", requested, max)
            }
            UnitError::ChannelCountMismatch { input, output } => {
                write!(
                    f,
                    "Channel count mismatch: input has {}, output has {}",
                    input, output
                )
            }
            UnitError::SampleRateMismatch { input, output } => {
                write!(
                    f,
                    "Sample rate mismatch: input {} Hz, output {} Hz",
                    input, output
                )
            }
            UnitError::InvalidSampleRate(rate) => write!(f, "Invalid sample rate: {}", rate),
            UnitError::InvalidMaxFrames { requested, max } => {
                write!(
                    f,
                    "Invalid maximum block size: {} frames (must be 1..={})",
                    requested, max
                )
            }
        }
    }
}

impl std::error::Error for UnitError {}
