//! Low-level DSP primitives used by the effect nodes and voices.
//!
//! These components are allocation-free once constructed, so the effect graph
//! can run them on the audio thread. They stay focused on the signal math; the
//! graph layer adds parameters, wet/dry and lifecycle.

/// Circular delay line and feedback echo.
pub mod delay;
/// Soft-clip waveshaper.
pub mod distortion;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter.
pub mod filter;
/// Output-chain peak limiter.
pub mod limiter;
/// Wet/dry and summing helpers.
pub mod mix;
/// Oscillator waveforms and noise.
pub mod oscillator;
/// Schroeder reverb with RT60 decay and pre-delay.
pub mod reverb;

pub use envelope::EnvelopeState;
