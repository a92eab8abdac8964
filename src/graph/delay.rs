use crate::dsp::delay::FeedbackDelay;
use crate::dsp::mix::blend_dry_wet;
use crate::graph::node::{EffectNode, RenderCtx};
use crate::graph::params::{DelayParams, EffectKind, EffectParam};

/*
Feedback Delay Node
===================

Repeats the input after `time` seconds; each repeat is fed back scaled by
`feedback`, so the echoes die away geometrically. Feedback tops out at 0.9
so the loop always decays.

  dry ──┬──────────────────────────────┐
        │                              mix(wet) ──> out
        └──> [delay line] ──┬──────────┘
                  ^         │
                  └── × fb ─┘
*/

pub struct FeedbackDelayNode {
    delay: FeedbackDelay,
    params: DelayParams,
}

impl FeedbackDelayNode {
    pub fn new(params: DelayParams) -> Self {
        let mut node = Self {
            delay: FeedbackDelay::new(),
            params: DelayParams::default(),
        };
        node.set_param(EffectParam::DelayTime, params.time);
        node.set_param(EffectParam::DelayFeedback, params.feedback);
        node.set_param(EffectParam::DelayWet, params.wet);
        node
    }

    pub fn params(&self) -> DelayParams {
        self.params
    }
}

impl Default for FeedbackDelayNode {
    fn default() -> Self {
        Self::new(DelayParams::default())
    }
}

impl EffectNode for FeedbackDelayNode {
    fn kind(&self) -> EffectKind {
        EffectKind::Delay
    }

    fn render_block(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let delay_samples = self.params.time * ctx.sample_rate;
        for sample in buffer.iter_mut() {
            let dry = *sample;
            let echo = self.delay.process(dry, delay_samples, self.params.feedback);
            *sample = blend_dry_wet(dry, echo, self.params.wet);
        }
    }

    fn get_param(&self, param: EffectParam) -> Option<f32> {
        match param {
            EffectParam::DelayTime => Some(self.params.time),
            EffectParam::DelayFeedback => Some(self.params.feedback),
            EffectParam::DelayWet => Some(self.params.wet),
            _ => None,
        }
    }

    fn set_param(&mut self, param: EffectParam, value: f32) -> bool {
        let value = param.range().clamp(value);
        match param {
            EffectParam::DelayTime => self.params.time = value,
            EffectParam::DelayFeedback => self.params.feedback = value,
            EffectParam::DelayWet => self.params.wet = value,
            _ => return false,
        }
        true
    }

    fn reset(&mut self) {
        self.delay.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_echoes_after_delay_time() {
        let sr = 1000.0;
        let mut node = FeedbackDelayNode::new(DelayParams {
            time: 0.1,
            feedback: 0.5,
            wet: 1.0,
        });
        let mut buffer = vec![0.0f32; 350];
        buffer[0] = 1.0;
        node.render_block(&mut buffer, &RenderCtx::new(sr, 0));

        assert!(buffer[0].abs() < 1e-6);
        assert!((buffer[100] - 1.0).abs() < 1e-3);
        assert!((buffer[200] - 0.5).abs() < 1e-3);
        assert!((buffer[300] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn feedback_is_capped() {
        let mut node = FeedbackDelayNode::default();
        node.set_param(EffectParam::DelayFeedback, 1.5);
        assert_eq!(node.params().feedback, 0.9);
    }
}
