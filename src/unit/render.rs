//! Render-context half of an allocated unit.

use std::sync::Arc;

use crate::{
    engine::{
        buffers::{BufferList, RenderBuffers},
        event::EventList,
        scheduler::EventQueue,
        walker::render_with_events,
    },
    params::ParamId,
    unit::{kernel::FilterKernel, SharedState, UnitConfig},
};

/// Status for frame counts above the allocated maximum.
pub const STATUS_TOO_MANY_FRAMES: i32 = -10874;
/// Status for buffers that do not match the allocated format.
pub const STATUS_FORMAT_NOT_SUPPORTED: i32 = -10868;

/// Upstream audio provider.
///
/// Fills `input` with `frame_count` frames starting at `timestamp`. An `Err`
/// status aborts the render call and is passed back to the host unchanged.
pub trait PullInput {
    fn pull_input(
        &mut self,
        timestamp: u64,
        frame_count: usize,
        input: &mut BufferList<'_>,
    ) -> Result<(), i32>;
}

/// Why a render call produced no audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// Pulling input failed with this upstream status
    InputUnavailable { status: i32 },
    TooManyFrames { requested: usize, max: usize },
    /// The output bus has the wrong channel count or is too short
    ChannelMismatch { expected: usize, actual: usize },
}

impl RenderError {
    /// Host status code. The upstream status is returned verbatim.
    pub fn status(&self) -> i32 {
        match self {
            RenderError::InputUnavailable { status } => *status,
            RenderError::TooManyFrames { .. } => STATUS_TOO_MANY_FRAMES,
            RenderError::ChannelMismatch { .. } => STATUS_FORMAT_NOT_SUPPORTED,
        }
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::InputUnavailable { status } => {
                write!(f, "Input unavailable (status {})", status)
            }
            RenderError::TooManyFrames { requested, max } => {
                write!(f, "Too many frames: {} requested, at most {}", requested, max)
            }
            RenderError::ChannelMismatch { expected, actual } => {
                write!(
                    f,
                    "Output bus mismatch: expected {} channels, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Host status for a render result: 0 on success.
pub fn render_status(result: &Result<(), RenderError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.status(),
    }
}

/// Everything the render callback needs. Move it to the audio thread.
///
/// Owns the kernel, the input storage and the event list, all sized at
/// allocation, so [`render`](Self::render) never allocates.
pub struct Renderer {
    pub(crate) kernel: FilterKernel,
    pub(crate) queue: EventQueue,
    pub(crate) shared: Arc<SharedState>,
    pub(crate) config: UnitConfig,
    input_storage: Vec<Vec<f32>>,
    events: EventList,
}

impl Renderer {
    pub(crate) fn new(
        kernel: FilterKernel,
        queue: EventQueue,
        shared: Arc<SharedState>,
        config: UnitConfig,
        channels: usize,
    ) -> Self {
        Self {
            kernel,
            queue,
            shared,
            input_storage: vec![vec![0.0; config.max_frames]; channels],
            events: EventList::with_capacity(config.event_capacity),
            config,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.input_storage.len()
    }

    pub fn max_frames(&self) -> usize {
        self.config.max_frames
    }

    pub fn kernel(&self) -> &FilterKernel {
        &self.kernel
    }

    /// Start of the input storage for channel `ch`. In-place renders write
    /// here.
    pub fn input_data_ptr(&self, ch: usize) -> *const f32 {
        self.input_storage
            .get(ch)
            .map_or(std::ptr::null(), |c| c.as_ptr())
    }

    /// Render `frame_count` frames starting at sample time `timestamp`.
    ///
    /// Pulls input, applies every queued event due in this block at its exact
    /// sample, and writes `output`. If `output` is unset it is pointed at the
    /// renderer's input storage and filled in place; that is why it borrows
    /// from the renderer.
    ///
    /// When the pull fails nothing is rendered, queued events stay queued and
    /// the clock does not move. The same holds for an empty block.
    ///
    /// Never logs: late, ignored and deferred events are counted for
    /// [`ParamController::take_diagnostics`](crate::unit::ParamController::take_diagnostics).
    pub fn render<'s>(
        &'s mut self,
        timestamp: u64,
        frame_count: u32,
        source: &mut impl PullInput,
        output: &mut BufferList<'s>,
    ) -> Result<(), RenderError> {
        let Self {
            kernel,
            queue,
            shared,
            config,
            input_storage,
            events,
        } = self;

        let frames = frame_count as usize;
        if frames > config.max_frames {
            return Err(RenderError::TooManyFrames {
                requested: frames,
                max: config.max_frames,
            });
        }

        let channels = input_storage.len();
        if output.channel_count() != channels {
            return Err(RenderError::ChannelMismatch {
                expected: channels,
                actual: output.channel_count(),
            });
        }
        if !output.is_unset() && (0..channels).any(|ch| output.frames(ch) < frames) {
            return Err(RenderError::ChannelMismatch {
                expected: channels,
                actual: output.channel_count(),
            });
        }

        if frames == 0 {
            return Ok(());
        }

        let mut input = BufferList::from_channels(input_storage.iter_mut().map(|c| &mut c[..frames]));
        source
            .pull_input(timestamp, frames, &mut input)
            .map_err(|status| RenderError::InputUnavailable { status })?;

        events.clear();
        let drained = queue.drain_block(timestamp, frame_count, events);

        let buffers = RenderBuffers::prepare(&input, output);
        let walked = render_with_events(kernel, events.as_slice(), frames, &buffers);

        for id in ParamId::ALL {
            shared.store_goal(id, kernel.goal(id));
        }
        shared.store_sample_time(timestamp + u64::from(frame_count));
        shared.record_anomalies(walked.ignored, drained.late + walked.late, drained.overflowed);

        Ok(())
    }
}
