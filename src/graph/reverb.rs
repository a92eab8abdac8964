use crate::dsp::mix::blend_dry_wet;
use crate::dsp::reverb::SchroederReverb;
use crate::graph::node::{EffectNode, RenderCtx};
use crate::graph::params::{EffectKind, EffectParam, ReverbParams};

/*
Reverb Node
===========

Schroeder reverb (4 parallel combs, 2 series allpasses) behind a pre-delay.

Parameters
----------

Decay (0.1 - 10 s):
  RT60, the time for the tail to fall by 60 dB. The comb feedback gains are
  derived from it.

Pre-delay (0 - 0.5 s):
  Gap between the dry sound and the start of the tail.

Wet (0.0 - 1.0):
  0.0 = all dry, 0.3 = subtle, 1.0 = tail only
*/

pub struct ReverbNode {
    reverb: SchroederReverb,
    params: ReverbParams,
}

impl ReverbNode {
    /// The comb and pre-delay lengths are fixed at construction, so the node
    /// needs the stream's sample rate up front.
    pub fn new(sample_rate: f32, params: ReverbParams) -> Self {
        let decay = EffectParam::ReverbDecay.range().clamp(params.decay);
        let pre_delay = EffectParam::ReverbPreDelay.range().clamp(params.pre_delay);
        Self {
            reverb: SchroederReverb::new(sample_rate, decay, pre_delay),
            params: ReverbParams {
                decay,
                pre_delay,
                wet: EffectParam::ReverbWet.range().clamp(params.wet),
            },
        }
    }

    pub fn params(&self) -> ReverbParams {
        self.params
    }
}

impl EffectNode for ReverbNode {
    fn kind(&self) -> EffectKind {
        EffectKind::Reverb
    }

    fn render_block(&mut self, buffer: &mut [f32], _ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            let dry = *sample;
            let tail = self.reverb.process(dry);
            *sample = blend_dry_wet(dry, tail, self.params.wet);
        }
    }

    fn get_param(&self, param: EffectParam) -> Option<f32> {
        match param {
            EffectParam::ReverbDecay => Some(self.params.decay),
            EffectParam::ReverbPreDelay => Some(self.params.pre_delay),
            EffectParam::ReverbWet => Some(self.params.wet),
            _ => None,
        }
    }

    fn set_param(&mut self, param: EffectParam, value: f32) -> bool {
        let value = param.range().clamp(value);
        match param {
            EffectParam::ReverbDecay => {
                self.params.decay = value;
                self.reverb.set_decay(value);
            }
            EffectParam::ReverbPreDelay => {
                self.params.pre_delay = value;
                self.reverb.set_pre_delay(value);
            }
            EffectParam::ReverbWet => self.params.wet = value,
            _ => return false,
        }
        true
    }

    fn reset(&mut self) {
        self.reverb.reset();
    }
}
