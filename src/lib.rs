//! Sample-accurate parameter ramping and event-driven rendering for a
//! realtime low-pass filter effect.
//!
//! - [`dsp`]: the ramper and the filter math
//! - [`engine`]: event delivery, buffer resolution and the block walker
//! - [`params`]: the parameter registry
//! - [`unit`]: the effect lifecycle, split into render and control halves

pub mod dsp;
pub mod engine;
pub mod params;
pub mod unit;

pub use dsp::ramper::ParameterRamper;
pub use engine::event::EventTime;
pub use params::{ParamId, ParamSpec, PARAMS};
pub use unit::{
    render_status, AllocateError, AudioFormat, FilterUnit, ParamController, ParameterAccess,
    PullInput, RenderDiagnostics, RenderError, Renderer, UnitConfig, UnitError,
};

/// Largest block any unit can be configured for.
pub const MAX_BLOCK_SIZE: usize = 4096;
/// Channels per bus.
pub const MAX_CHANNELS: usize = 8;
