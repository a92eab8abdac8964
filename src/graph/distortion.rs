use crate::dsp::distortion::shape;
use crate::dsp::mix::blend_dry_wet;
use crate::graph::node::{EffectNode, RenderCtx};
use crate::graph::params::{DistortionParams, EffectKind, EffectParam};

/// Soft-clip waveshaper with an amount (drive) and wet blend.
///
/// Disabling distortion zeroes `amount`, not `wet`: the shaper stays in the
/// path at its gentlest curve.
pub struct DistortionNode {
    params: DistortionParams,
}

impl DistortionNode {
    pub fn new(params: DistortionParams) -> Self {
        let mut node = Self {
            params: DistortionParams::default(),
        };
        node.set_param(EffectParam::DistortionAmount, params.amount);
        node.set_param(EffectParam::DistortionWet, params.wet);
        node
    }

    pub fn params(&self) -> DistortionParams {
        self.params
    }
}

impl Default for DistortionNode {
    fn default() -> Self {
        Self::new(DistortionParams::default())
    }
}

impl EffectNode for DistortionNode {
    fn kind(&self) -> EffectKind {
        EffectKind::Distortion
    }

    fn render_block(&mut self, buffer: &mut [f32], _ctx: &RenderCtx) {
        let amount = self.params.amount;
        let wet = self.params.wet;
        for sample in buffer.iter_mut() {
            *sample = blend_dry_wet(*sample, shape(*sample, amount), wet);
        }
    }

    fn get_param(&self, param: EffectParam) -> Option<f32> {
        match param {
            EffectParam::DistortionAmount => Some(self.params.amount),
            EffectParam::DistortionWet => Some(self.params.wet),
            _ => None,
        }
    }

    fn set_param(&mut self, param: EffectParam, value: f32) -> bool {
        let value = param.range().clamp(value);
        match param {
            EffectParam::DistortionAmount => self.params.amount = value,
            EffectParam::DistortionWet => self.params.wet = value,
            _ => return false,
        }
        true
    }
}
