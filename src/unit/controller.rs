//! Control-context half of an allocated unit.

use std::sync::Arc;

use log::warn;

use crate::{
    dsp::filter::magnitude_response,
    engine::{
        event::EventTime,
        scheduler::{ScheduleError, Scheduler},
    },
    params::ParamId,
    unit::{ParameterAccess, RenderDiagnostics, SharedState},
};

/// Writes parameter changes into the render queue and reads back what the
/// renderer last published.
///
/// Never touches the kernel. Values read here lag the renderer by at most one
/// block.
pub struct ParamController {
    pub(crate) scheduler: Scheduler,
    pub(crate) shared: Arc<SharedState>,
    sample_rate: f64,
    ramp_frames: u32,
}

impl ParamController {
    pub(crate) fn new(
        scheduler: Scheduler,
        shared: Arc<SharedState>,
        sample_rate: f64,
        ramp_frames: u32,
    ) -> Self {
        Self {
            scheduler,
            shared,
            sample_rate,
            ramp_frames,
        }
    }

    /// Queue a change of `id` to `value`, ramped over `ramp_frames`, at
    /// `time` on the render clock.
    ///
    /// `value` is clamped to the parameter's range. Times may arrive in any
    /// order, and a far-off event never delays the writes queued after it.
    pub fn schedule(
        &mut self,
        time: EventTime,
        ramp_frames: u32,
        id: ParamId,
        value: f32,
    ) -> Result<(), ScheduleError> {
        self.scheduler
            .schedule(time, ramp_frames, id, id.spec().clamp(value))
    }

    /// Render clock: the sample time just past the last rendered block.
    pub fn sample_time(&self) -> u64 {
        self.shared.sample_time()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Ramp length used by [`set_value`](ParameterAccess::set_value).
    pub fn smoothing_frames(&self) -> u32 {
        self.ramp_frames
    }

    /// Free slots in the render queue.
    pub fn queue_slots(&self) -> usize {
        self.scheduler.slots()
    }

    /// Take the event anomalies counted by the renderer since the last call,
    /// logging a warning for each kind seen.
    pub fn take_diagnostics(&self) -> RenderDiagnostics {
        let diagnostics = self.shared.take_diagnostics();
        if diagnostics.ignored > 0 {
            warn!(
                "Ignored {} parameter events past the end of their block",
                diagnostics.ignored
            );
        }
        if diagnostics.late > 0 {
            warn!("Applied {} late parameter events at block start", diagnostics.late);
        }
        if diagnostics.overflows > 0 {
            warn!(
                "{} blocks deferred parameter changes to a later block (event buffers full)",
                diagnostics.overflows
            );
        }
        diagnostics
    }

    /// Magnitude of the filter at `frequencies`, evaluated at the published
    /// parameter goals.
    pub fn frequency_response(&self, frequencies: &[f32], out: &mut [f32]) {
        magnitude_response(
            self.value(ParamId::Cutoff),
            self.value(ParamId::Resonance),
            self.sample_rate as f32,
            frequencies,
            out,
        );
    }
}

impl ParameterAccess for ParamController {
    /// Smoothly move `id` to `value` starting at the next rendered block.
    fn set_value(&mut self, id: ParamId, value: f32) {
        if let Err(err) = self.schedule(EventTime::Immediate, self.ramp_frames, id, value) {
            warn!("{}", err);
        }
    }

    /// The goal the renderer last published for `id`.
    fn value(&self, id: ParamId) -> f32 {
        self.shared.goal(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scheduler::channel;

    fn make_controller(capacity: usize) -> (ParamController, crate::engine::scheduler::EventQueue) {
        let (scheduler, queue) = channel(capacity);
        let shared = Arc::new(SharedState::new([400.0, -5.0]));
        (ParamController::new(scheduler, shared, 48_000.0, 960), queue)
    }

    #[test]
    fn test_set_value_schedules_smoothed_immediate() {
        let (mut controller, mut queue) = make_controller(4);
        controller.set_value(ParamId::Cutoff, 1_000.0);

        let event = queue.pop().unwrap();
        assert_eq!(event.time, EventTime::Immediate);
        assert_eq!(event.param, ParamId::Cutoff);
        assert_eq!(event.value, 1_000.0);
        assert_eq!(event.ramp_frames, 960);
    }

    #[test]
    fn test_schedule_clamps_to_range() {
        let (mut controller, mut queue) = make_controller(4);
        controller
            .schedule(EventTime::At(10), 0, ParamId::Resonance, 90.0)
            .unwrap();
        assert_eq!(queue.pop().unwrap().value, 20.0);
    }

    #[test]
    fn test_value_reads_published_goal() {
        let (mut controller, _queue) = make_controller(4);
        controller.set_value(ParamId::Cutoff, 1_000.0);

        // Nothing rendered yet
        assert_eq!(controller.value(ParamId::Cutoff), 400.0);

        controller.shared.store_goal(ParamId::Cutoff, 1_000.0);
        assert_eq!(controller.value(ParamId::Cutoff), 1_000.0);
    }

    #[test]
    fn test_set_value_on_full_queue_is_dropped() {
        let (mut controller, mut queue) = make_controller(1);
        controller.set_value(ParamId::Cutoff, 500.0);
        controller.set_value(ParamId::Cutoff, 600.0);

        assert_eq!(controller.queue_slots(), 0);
        assert_eq!(queue.pop().unwrap().value, 500.0);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_take_diagnostics_drains_counts() {
        let (controller, _queue) = make_controller(4);
        assert!(controller.take_diagnostics().is_clean());

        controller.shared.record_anomalies(0, 2, true);
        let diagnostics = controller.take_diagnostics();
        assert_eq!(diagnostics.late, 2);
        assert_eq!(diagnostics.overflows, 1);
        assert!(controller.take_diagnostics().is_clean());
    }

    #[test]
    fn test_frequency_response_uses_goals() {
        let (controller, _queue) = make_controller(4);
        let freqs = [0.0, 400.0];
        let mut out = [0.0f32; 2];
        controller.frequency_response(&freqs, &mut out);

        let mut expected = [0.0f32; 2];
        magnitude_response(400.0, -5.0, 48_000.0, &freqs, &mut expected);
        assert_eq!(out, expected);
    }
}
