//! Low-level DSP primitives.
//!
//! Both are allocation-free and realtime-safe. They know nothing about events
//! or buffers; the unit layer wires them together.

/// Linear, drift-free parameter smoothing.
pub mod ramper;
/// Resonant state-variable low-pass and its magnitude response.
pub mod filter;
