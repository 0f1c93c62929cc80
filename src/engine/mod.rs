//! Render-time plumbing: event delivery, buffer resolution and the
//! sample-accurate block walker.
//!
//! Nothing in here knows about filters. The unit layer plugs its kernel into
//! [`walker::render_with_events`] through the [`walker::RenderKernel`] trait.

pub mod buffers;
pub mod event;
pub mod scheduler;
pub mod walker;

pub use buffers::{BufferList, BufferMode, RenderBuffers};
pub use event::{EventList, EventTime, ParamEvent, ScheduledEvent};
pub use scheduler::{channel, DrainReport, EventQueue, ScheduleError, Scheduler};
pub use walker::{render_with_events, RenderKernel, WalkReport};
