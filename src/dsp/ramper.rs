//! Click-free parameter ramping.

/*
Parameter Ramping
=================

When a parameter jumps from one value to another between two samples, the
signal it controls jumps too. A cutoff that leaps from 400 Hz to 4 kHz in a
single sample produces an audible click. A ramp spreads that change across a
fixed number of samples so the parameter glides instead of stepping.

Vocabulary
----------

  goal          The value the ramp is heading towards. Once the ramp is done
                the parameter rests here.

  duration      How many samples the ramp lasts. 0 means "jump immediately".

  remaining     How many samples are left before the goal is reached.
                0 means "not ramping".

  inverse slope The per-sample change, measured backwards from the goal.
                Positive when ramping down, negative when ramping up.


The Line Equation
-----------------

The obvious implementation keeps a running value and adds an increment every
sample:

    value += increment            (repeated `duration` times)

With f32 this drifts. Every addition rounds, and after a few thousand samples
the sum lands a little above or below the goal. Worse, the ramp might still be
"arriving" after it should have finished.

Instead we evaluate a straight line anchored at the goal:

    value = inverse_slope × remaining + goal

    remaining:  64   48   32   16    0
    value:     400  550  700  850 1000     (400 → 1000 over 64 samples)

Every sample is computed fresh from the same two numbers, so rounding never
accumulates. When `remaining` reaches 0 the first term vanishes and the value
is *exactly* the goal.


Starting a Ramp Mid-Ramp
------------------------

A new ramp always starts from wherever the parameter is right now:

    inverse_slope = (current − new_goal) / duration

The current value must be read BEFORE the goal is overwritten, otherwise the
line would be anchored to the wrong point. The old ramp's leftover duration is
simply discarded: the new ramp replaces it completely.


Stepping
--------

`get` is side-effect free. The render loop calls `step` once per rendered
sample after reading the value, or `get_step` to do both at once. Parameters
that are only read once per block are advanced with `step_by` after the loop.
*/

/// A parameter that moves linearly towards its goal, one sample at a time.
///
/// The state is exactly `(goal, inverse_slope, samples_remaining)`. The clamp
/// bounds are recorded for introspection only; neither [`set`](Self::set) nor
/// [`start_ramp`](Self::start_ramp) enforces them.
#[derive(Debug, Clone, Copy)]
pub struct ParameterRamper {
    clamp_low: f32,
    clamp_high: f32,
    goal: f32,
    inverse_slope: f32,
    samples_remaining: u32,
}

impl ParameterRamper {
    /// Create a ramper resting at `value`.
    pub fn new(value: f32) -> Self {
        Self::with_bounds(value, f32::NEG_INFINITY, f32::INFINITY)
    }

    /// Create a ramper resting at `value` that records a `[low, high]` range.
    pub fn with_bounds(value: f32, low: f32, high: f32) -> Self {
        Self {
            clamp_low: low,
            clamp_high: high,
            goal: value,
            inverse_slope: 0.0,
            samples_remaining: 0,
        }
    }

    /// Jump to `value` immediately, cancelling any ramp in progress.
    ///
    /// Not smoothed. Meant for initialization, not for live changes.
    #[inline]
    pub fn set(&mut self, value: f32) {
        self.goal = value;
        self.inverse_slope = 0.0;
        self.samples_remaining = 0;
    }

    /// Ramp linearly from the current value to `new_goal` over `duration`
    /// samples. Supersedes any ramp in progress.
    #[inline]
    pub fn start_ramp(&mut self, new_goal: f32, duration: u32) {
        if duration == 0 {
            self.set(new_goal);
        } else {
            // inverse_slope must be computed from the current value before
            // the goal is replaced.
            self.inverse_slope = (self.get() - new_goal) / duration as f32;
            self.samples_remaining = duration;
            self.goal = new_goal;
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.inverse_slope * self.samples_remaining as f32 + self.goal
    }

    /// Final target of the ramp, regardless of progress.
    #[inline]
    pub fn goal(&self) -> f32 {
        self.goal
    }

    /// Advance one sample. Call after reading the value for that sample.
    #[inline]
    pub fn step(&mut self) {
        if self.samples_remaining != 0 {
            self.samples_remaining -= 1;
        }
    }

    /// Read the current value, then advance one sample.
    ///
    /// Skips the multiply-add when not ramping.
    #[inline]
    pub fn get_step(&mut self) -> f32 {
        if self.samples_remaining != 0 {
            let value = self.get();
            self.samples_remaining -= 1;
            value
        } else {
            self.goal
        }
    }

    /// Advance `n` samples at once, stopping at the goal.
    ///
    /// For parameters that did not take part in the current inner loop.
    #[inline]
    pub fn step_by(&mut self, n: u32) {
        self.samples_remaining = self.samples_remaining.saturating_sub(n);
    }

    pub fn samples_remaining(&self) -> u32 {
        self.samples_remaining
    }

    pub fn is_ramping(&self) -> bool {
        self.samples_remaining != 0
    }

    /// Recorded `(low, high)` range.
    pub fn bounds(&self) -> (f32, f32) {
        (self.clamp_low, self.clamp_high)
    }

    pub fn set_bounds(&mut self, low: f32, high: f32) {
        self.clamp_low = low;
        self.clamp_high = high;
    }
}

impl Default for ParameterRamper {
    fn default() -> Self {
        Self::new(0.0)
    }
}
