//! The effects graph: four effect nodes wired into parallel lanes that merge
//! into a gain-staged output chain.
//!
//! The nodes wrap the low-level DSP primitives with named parameters, wet/dry
//! and range clamping. [`effects::EffectsGraph`] owns their lifecycle and the
//! routing between them.

/// Feedback delay node.
pub mod delay;
/// Soft-clip distortion node.
pub mod distortion;
/// Lifecycle, parameter and mute management for the whole graph.
pub mod effects;
/// LFO-swept resonant low-pass.
pub mod filter;
/// Core trait shared by all effect nodes.
pub mod node;
/// Effect and parameter identities, ranges and snapshots.
pub mod params;
/// Schroeder reverb node.
pub mod reverb;
/// Edge-list routing and its validation.
pub mod topology;

pub use effects::{EffectsGraph, EffectsStatus};
pub use node::{EffectNode, RenderCtx};
pub use params::{ActiveEffects, EffectKind, EffectParam, EffectsSnapshot, ParamRange};
pub use topology::{Lane, LaneMask, SourceRouting, Topology};
