//! Real-world scenario benchmarks.
//!
//! These benchmarks model the sequencer as it runs: the effects graph under
//! different routings, and the whole engine ticking through a pattern.

mod effects;
mod engine;

pub use effects::bench_effects;
pub use engine::bench_engine;
