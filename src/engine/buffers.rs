//! Channel buffer lists and the in-place/out-of-place decision.

/*
In-Place vs Out-of-Place
========================

A host hands an effect two buffer lists per render call: the input it pulled
from upstream and the output it wants filled. The output may come in two
flavours:

  out-of-place   The host already points every output channel at its own
                 memory. We read from input and write to output.

  in-place       The host leaves the output pointers null. We point each
                 output channel at the matching input channel and overwrite
                 the input as we go. No allocation, no copy.

The decision is made once per render call, before any sample is processed:

    output[0].data == null ?
        yes →  output[ch].data = input[ch].data   for every channel
        no  →  leave output untouched

From then on the per-sample code does not know or care which case it is in.


Aliasing
--------

In-place means input and output point at the same memory. Rust does not allow
a `&[f32]` and a `&mut [f32]` over the same samples at the same time, so the
render path never sees plain slices. It sees `&[Cell<f32>]` instead: shared
views that may alias and still allow writes. Reading `input[i].get()` then
writing `output[i].set(y)` is correct in both modes.
*/

use std::{cell::Cell, marker::PhantomData, ops::Range, ptr, slice};

use crate::MAX_CHANNELS;

/// One channel: a data pointer (null when unset) and its length in frames.
#[derive(Debug, Clone, Copy)]
struct ChannelBuffer {
    data: *mut f32,
    frames: usize,
}

impl ChannelBuffer {
    const UNSET: Self = Self {
        data: ptr::null_mut(),
        frames: 0,
    };
}

/// A list of up to [`MAX_CHANNELS`] non-interleaved channel buffers.
///
/// Borrows its memory for `'a`. Channels may be unset (null), in which case
/// they can be pointed at other memory by [`RenderBuffers::prepare`].
pub struct BufferList<'a> {
    channels: [ChannelBuffer; MAX_CHANNELS],
    channel_count: usize,
    _marker: PhantomData<&'a mut [f32]>,
}

impl<'a> BufferList<'a> {
    /// Point at caller-owned channel slices. Channels past [`MAX_CHANNELS`]
    /// are ignored.
    pub fn from_channels<I>(channels: I) -> Self
    where
        I: IntoIterator<Item = &'a mut [f32]>,
    {
        let mut list = Self::unset(0, 0);
        for channel in channels.into_iter().take(MAX_CHANNELS) {
            list.channels[list.channel_count] = ChannelBuffer {
                data: channel.as_mut_ptr(),
                frames: channel.len(),
            };
            list.channel_count += 1;
        }
        list
    }

    /// `channel_count` channels of `frames` frames with no data attached.
    pub fn unset(channel_count: usize, frames: usize) -> Self {
        let channel_count = channel_count.min(MAX_CHANNELS);
        let mut channels = [ChannelBuffer::UNSET; MAX_CHANNELS];
        for channel in &mut channels[..channel_count] {
            channel.frames = frames;
        }
        Self {
            channels,
            channel_count,
            _marker: PhantomData,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Frames available in channel `index`, 0 if out of range.
    pub fn frames(&self, index: usize) -> usize {
        self.get(index).map_or(0, |c| c.frames)
    }

    /// Whether channel 0 has no data attached.
    pub fn is_unset(&self) -> bool {
        self.data_ptr(0).is_null()
    }

    /// Raw data pointer of channel `index`, null when unset or out of range.
    pub fn data_ptr(&self, index: usize) -> *const f32 {
        self.get(index).map_or(ptr::null(), |c| c.data as *const f32)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        let c = self.get(index)?;
        if c.data.is_null() {
            return None;
        }
        // SAFETY: data points at `frames` valid samples borrowed for 'a, and
        // `&self` prevents a concurrent `channel_mut`.
        Some(unsafe { slice::from_raw_parts(c.data, c.frames) })
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        let c = self.get(index)?;
        if c.data.is_null() {
            return None;
        }
        // SAFETY: as above; `&mut self` makes the borrow exclusive.
        Some(unsafe { slice::from_raw_parts_mut(c.data, c.frames) })
    }

    fn get(&self, index: usize) -> Option<ChannelBuffer> {
        self.channels[..self.channel_count].get(index).copied()
    }
}

impl std::fmt::Debug for BufferList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferList")
            .field("channels", &&self.channels[..self.channel_count])
            .finish()
    }
}

/// Which way the output relates to the input for this render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferMode {
    /// Output aliases input
    InPlace,
    /// Output is caller-provided memory
    OutOfPlace,
}

/// Resolved input/output views for one render call.
///
/// Built once by [`RenderBuffers::prepare`]; the per-sample code reads and
/// writes through cell slices that stay valid whether or not the two sides
/// alias.
pub struct RenderBuffers<'b> {
    input: [ChannelBuffer; MAX_CHANNELS],
    output: [ChannelBuffer; MAX_CHANNELS],
    channel_count: usize,
    frames: usize,
    mode: BufferMode,
    _marker: PhantomData<&'b [Cell<f32>]>,
}

impl<'b> RenderBuffers<'b> {
    /// Decide between in-place and out-of-place processing.
    ///
    /// If `output` channel 0 is unset, every output channel is pointed at the
    /// matching input channel. Otherwise `output` is left untouched. Only
    /// channels present on both sides are processed.
    pub fn prepare<'a: 'b>(input: &'b BufferList<'a>, output: &'b mut BufferList<'a>) -> Self {
        let channel_count = input.channel_count.min(output.channel_count);

        let mode = if output.is_unset() {
            for ch in 0..channel_count {
                output.channels[ch].data = input.channels[ch].data;
                output.channels[ch].frames = input.channels[ch].frames;
            }
            BufferMode::InPlace
        } else {
            BufferMode::OutOfPlace
        };

        let frames = (0..channel_count)
            .map(|ch| input.channels[ch].frames.min(output.channels[ch].frames))
            .min()
            .unwrap_or(0);

        Self {
            input: input.channels,
            output: output.channels,
            channel_count,
            frames,
            mode,
            _marker: PhantomData,
        }
    }

    pub fn mode(&self) -> BufferMode {
        self.mode
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Frames every channel can hold.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Input samples of channel `ch` within `range`.
    ///
    /// Panics if `ch` or `range` is out of bounds.
    #[inline]
    pub fn input(&self, ch: usize, range: Range<usize>) -> &[Cell<f32>] {
        Self::cells(&self.input[..self.channel_count][ch], range, self.frames)
    }

    /// Output samples of channel `ch` within `range`.
    ///
    /// Panics if `ch` or `range` is out of bounds.
    #[inline]
    pub fn output(&self, ch: usize, range: Range<usize>) -> &[Cell<f32>] {
        Self::cells(&self.output[..self.channel_count][ch], range, self.frames)
    }

    #[inline]
    fn cells(channel: &ChannelBuffer, range: Range<usize>, frames: usize) -> &[Cell<f32>] {
        assert!(range.start <= range.end && range.end <= frames);
        if channel.data.is_null() || range.is_empty() {
            return &[];
        }
        // SAFETY: the channel holds at least `frames` samples borrowed for 'b
        // and `range` lies within them. Cell<f32> has the layout of f32, and
        // shared cell views may alias each other (in-place mode).
        unsafe {
            slice::from_raw_parts(
                channel.data.add(range.start) as *const Cell<f32>,
                range.end - range.start,
            )
        }
    }
}
