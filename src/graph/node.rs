use crate::graph::params::{EffectKind, EffectParam};

/// Context passed to effect nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - now: sample-clock position of the first sample in the block
pub struct RenderCtx {
    pub sample_rate: f32,
    pub now: u64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, now: u64) -> Self {
        Self { sample_rate, now }
    }

    /// Time of the first sample in seconds
    pub fn time(&self) -> f64 {
        self.now as f64 / self.sample_rate as f64
    }
}

/// Core trait for the effect nodes in the graph
///
/// Nodes process a buffer in place and expose their parameters by
/// [`EffectParam`]. Values are clamped to the parameter's range on write.
pub trait EffectNode: Send {
    fn kind(&self) -> EffectKind;

    fn render_block(&mut self, buffer: &mut [f32], ctx: &RenderCtx);

    /// Current value, or `None` if the parameter belongs to another effect.
    fn get_param(&self, param: EffectParam) -> Option<f32>;

    /// Returns `false` if the parameter belongs to another effect.
    fn set_param(&mut self, param: EffectParam, value: f32) -> bool;

    /// Clear internal state (delay lines, filter memory)
    fn reset(&mut self) {
        // Default: stateless
    }
}
