//! Benchmarks for low-level DSP primitives.

mod filter;
mod ramper;

pub use filter::bench_filter;
pub use ramper::bench_ramper;
