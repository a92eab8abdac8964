//! An eight-step, four-row melodic step sequencer with a hi-hat lane and a
//! parallel effects graph (auto filter, delay, reverb, distortion).
//!
//! The [`engine::Engine`] runs on the audio thread and owns every piece of
//! mutable audio state; the [`engine::Controller`] talks to it through
//! lock-free queues.

pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph;
pub mod sequencing;
pub mod synth;

pub use error::{Error, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
