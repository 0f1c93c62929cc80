//! The filter effect as a unit with a render-resource lifecycle.
//!
//! A [`FilterUnit`] starts out owning its kernel outright; parameter writes go
//! straight to the rampers. Allocating render resources splits it in two:
//!
//! ```text
//!                allocate_render_resources
//!   FilterUnit  ───────────────────────────▶  Renderer        (audio thread)
//!       ▲                                     ParamController (control thread)
//!       │                                            │
//!       └──────── deallocate_render_resources ◀──────┘
//! ```
//!
//! While split, the two halves talk only through the event queue and a
//! handful of atomics.

pub mod config;
pub mod controller;
pub mod kernel;
pub mod render;

use std::sync::{
    atomic::{AtomicU32, AtomicU64, Ordering},
    Arc,
};

use log::{debug, warn};

pub use config::{AudioFormat, UnitConfig, UnitError};
pub use controller::ParamController;
pub use kernel::FilterKernel;
pub use render::{render_status, PullInput, RenderError, Renderer};

use crate::{
    engine::scheduler::channel,
    params::{ParamId, PARAMS},
};

/// Read and write parameter values by id.
pub trait ParameterAccess {
    fn set_value(&mut self, id: ParamId, value: f32);
    fn value(&self, id: ParamId) -> f32;
}

/// Event anomalies the renderer counted since they were last taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderDiagnostics {
    /// Events at or past the end of their block, dropped
    pub ignored: u32,
    /// Events applied after their scheduled sample
    pub late: u32,
    /// Blocks that left due events queued because a buffer was full
    pub overflows: u32,
}

impl RenderDiagnostics {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// State published by the renderer after every block.
#[derive(Debug)]
pub(crate) struct SharedState {
    goals: [AtomicU32; ParamId::COUNT],
    sample_time: AtomicU64,
    ignored: AtomicU32,
    late: AtomicU32,
    overflows: AtomicU32,
}

impl SharedState {
    pub(crate) fn new(goals: [f32; ParamId::COUNT]) -> Self {
        Self {
            goals: goals.map(|goal| AtomicU32::new(goal.to_bits())),
            sample_time: AtomicU64::new(0),
            ignored: AtomicU32::new(0),
            late: AtomicU32::new(0),
            overflows: AtomicU32::new(0),
        }
    }

    /// Render side. Plain atomic adds, nothing else.
    pub(crate) fn record_anomalies(&self, ignored: u32, late: u32, overflowed: bool) {
        if ignored > 0 {
            self.ignored.fetch_add(ignored, Ordering::Relaxed);
        }
        if late > 0 {
            self.late.fetch_add(late, Ordering::Relaxed);
        }
        if overflowed {
            self.overflows.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn take_diagnostics(&self) -> RenderDiagnostics {
        RenderDiagnostics {
            ignored: self.ignored.swap(0, Ordering::Relaxed),
            late: self.late.swap(0, Ordering::Relaxed),
            overflows: self.overflows.swap(0, Ordering::Relaxed),
        }
    }

    pub(crate) fn store_goal(&self, id: ParamId, value: f32) {
        self.goals[id.index()].store(value.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn goal(&self, id: ParamId) -> f32 {
        f32::from_bits(self.goals[id.index()].load(Ordering::Relaxed))
    }

    pub(crate) fn store_sample_time(&self, time: u64) {
        self.sample_time.store(time, Ordering::Relaxed);
    }

    pub(crate) fn sample_time(&self) -> u64 {
        self.sample_time.load(Ordering::Relaxed)
    }
}

/// The filter effect before render resources exist.
#[derive(Debug, Clone)]
pub struct FilterUnit {
    kernel: FilterKernel,
    config: UnitConfig,
}

impl FilterUnit {
    pub fn new(config: UnitConfig) -> Self {
        Self {
            kernel: FilterKernel::new(),
            config,
        }
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    pub fn kernel(&self) -> &FilterKernel {
        &self.kernel
    }

    /// Validate the bus formats, size every buffer, and split into the render
    /// and control halves.
    ///
    /// On failure the unit is handed back inside the error.
    pub fn allocate_render_resources(
        mut self,
        input: AudioFormat,
        output: AudioFormat,
    ) -> Result<(Renderer, ParamController), AllocateError> {
        if let Err(error) = self.config.validate(input, output) {
            return Err(AllocateError { unit: self, error });
        }

        let sample_rate = output.sample_rate;
        let channels = output.channels;
        self.kernel.prepare(sample_rate as f32, channels);

        let goals = PARAMS.map(|spec| self.kernel.goal(spec.id));
        let shared = Arc::new(SharedState::new(goals));
        let (scheduler, queue) = channel(self.config.queue_capacity);
        let ramp_frames = self.config.ramp_frames(sample_rate);

        debug!(
            "Allocated render resources: {} ch @ {} Hz, {} max frames, {} event slots",
            channels, sample_rate, self.config.max_frames, self.config.event_capacity
        );

        let renderer = Renderer::new(self.kernel, queue, Arc::clone(&shared), self.config, channels);
        let controller = ParamController::new(scheduler, shared, sample_rate, ramp_frames);
        Ok((renderer, controller))
    }

    /// Reunite the two halves.
    ///
    /// Ramps in progress jump to their goals, and queued changes that never
    /// reached a render call are applied directly, so every value written
    /// through the controller survives.
    pub fn deallocate_render_resources(renderer: Renderer, controller: ParamController) -> Self {
        if !Arc::ptr_eq(&renderer.shared, &controller.shared) {
            warn!("Deallocating a renderer with a controller from another allocation");
        }
        drop(controller);

        let Renderer {
            mut kernel,
            mut queue,
            config,
            ..
        } = renderer;

        kernel.settle();
        let mut pending = 0;
        while let Some(event) = queue.pop() {
            kernel.set(event.param, event.value);
            pending += 1;
        }
        kernel.reset();

        debug!("Deallocated render resources, applied {} pending changes", pending);

        Self { kernel, config }
    }
}

impl Default for FilterUnit {
    fn default() -> Self {
        Self::new(UnitConfig::default())
    }
}

impl ParameterAccess for FilterUnit {
    /// Jump `id` to `value` (clamped). No ramp: nothing is rendering yet.
    fn set_value(&mut self, id: ParamId, value: f32) {
        self.kernel.set(id, id.spec().clamp(value));
    }

    fn value(&self, id: ParamId) -> f32 {
        self.kernel.goal(id)
    }
}

/// Allocation failed; the unit comes back unchanged.
#[derive(Debug)]
pub struct AllocateError {
    pub unit: FilterUnit,
    pub error: UnitError,
}

impl AllocateError {
    pub fn into_unit(self) -> FilterUnit {
        self.unit
    }
}

impl std::fmt::Display for AllocateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cannot allocate render resources: {}", self.error)
    }
}

impl std::error::Error for AllocateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
