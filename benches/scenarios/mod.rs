//! Real-world scenario benchmarks.
//!
//! Whole render calls as a host would make them: pulled input, drained
//! events, sample-accurate walking and the filter kernel.

mod automation;

pub use automation::{bench_render, bench_walker};
