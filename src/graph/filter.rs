use crate::dsp::filter::{FilterType, SVFilter};
use crate::dsp::mix::blend_dry_wet;
use crate::dsp::oscillator::OscillatorBlock;
use crate::graph::node::{EffectNode, RenderCtx};
use crate::graph::params::{EffectKind, EffectParam, FilterParams};

/*
Auto Filter Node
================

A resonant low-pass whose cutoff is swept by a sine LFO.

  cutoff = BASE_CUTOFF · 2^(OCTAVES · depth · lfo)      lfo in [0, 1]

Parameters
----------

Frequency (0.1 - 10 Hz):  LFO rate
Depth (0.0 - 1.0):        how far the sweep opens above BASE_CUTOFF
Resonance (0.1 - 20):     filter Q
Wet (0.0 - 1.0):          dry/wet blend

LFO lifecycle
-------------

The LFO is either running, stopped, or stopped with a start scheduled on the
sample clock. While stopped the cutoff sits at BASE_CUTOFF. A scheduled start
fires on the exact sample it names and restarts the cycle from phase zero.
*/

/// Cutoff when the LFO is at its lowest point (or stopped)
pub const BASE_CUTOFF: f32 = 200.0;
/// Sweep range above the base cutoff at depth 1.0
pub const OCTAVES: f32 = 2.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoState {
    Running,
    Stopped,
    /// Stopped, starting at the given sample
    Scheduled(u64),
}

pub struct AutoFilterNode {
    filter: SVFilter,
    lfo: OscillatorBlock,
    lfo_state: LfoState,
    params: FilterParams,
}

impl AutoFilterNode {
    pub fn new(params: FilterParams) -> Self {
        let mut node = Self {
            filter: SVFilter::new(FilterType::LowPass, BASE_CUTOFF, params.resonance),
            lfo: OscillatorBlock::sine(),
            lfo_state: LfoState::Running,
            params: FilterParams::default(),
        };
        node.set_param(EffectParam::FilterFrequency, params.frequency);
        node.set_param(EffectParam::FilterDepth, params.depth);
        node.set_param(EffectParam::FilterResonance, params.resonance);
        node.set_param(EffectParam::FilterWet, params.wet);
        node
    }

    pub fn params(&self) -> FilterParams {
        self.params
    }

    /// Freeze the sweep at the base cutoff and drop any scheduled start.
    pub fn stop_lfo(&mut self) {
        self.lfo_state = LfoState::Stopped;
    }

    /// Start the LFO from phase zero at sample `at`.
    pub fn start_lfo_at(&mut self, at: u64) {
        self.lfo_state = LfoState::Scheduled(at);
    }

    pub fn lfo_state(&self) -> LfoState {
        self.lfo_state
    }

    pub fn is_lfo_running(&self) -> bool {
        self.lfo_state == LfoState::Running
    }

    /// Current cutoff in Hz
    pub fn cutoff(&self) -> f32 {
        self.filter.cutoff()
    }

    #[inline]
    fn sweep_cutoff(&self, lfo: f32) -> f32 {
        let unipolar = (lfo + 1.0) * 0.5;
        BASE_CUTOFF * 2.0_f32.powf(OCTAVES * self.params.depth * unipolar)
    }
}

impl Default for AutoFilterNode {
    fn default() -> Self {
        Self::new(FilterParams::default())
    }
}

impl EffectNode for AutoFilterNode {
    fn kind(&self) -> EffectKind {
        EffectKind::Filter
    }

    fn render_block(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in buffer.iter_mut().enumerate() {
            if let LfoState::Scheduled(at) = self.lfo_state {
                if ctx.now + i as u64 >= at {
                    self.lfo.reset();
                    self.lfo_state = LfoState::Running;
                }
            }

            let cutoff = match self.lfo_state {
                LfoState::Running => {
                    let lfo = self.lfo.next_sample(self.params.frequency, ctx.sample_rate);
                    self.sweep_cutoff(lfo)
                }
                _ => BASE_CUTOFF,
            };
            self.filter.set_cutoff(cutoff);

            let dry = *sample;
            let filtered = self.filter.process(dry, ctx.sample_rate);
            *sample = blend_dry_wet(dry, filtered, self.params.wet);
        }
    }

    fn get_param(&self, param: EffectParam) -> Option<f32> {
        match param {
            EffectParam::FilterFrequency => Some(self.params.frequency),
            EffectParam::FilterDepth => Some(self.params.depth),
            EffectParam::FilterResonance => Some(self.params.resonance),
            EffectParam::FilterWet => Some(self.params.wet),
            _ => None,
        }
    }

    fn set_param(&mut self, param: EffectParam, value: f32) -> bool {
        let value = param.range().clamp(value);
        match param {
            EffectParam::FilterFrequency => self.params.frequency = value,
            EffectParam::FilterDepth => self.params.depth = value,
            EffectParam::FilterResonance => {
                self.params.resonance = value;
                self.filter.set_q(value);
            }
            EffectParam::FilterWet => self.params.wet = value,
            _ => return false,
        }
        true
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    #[test]
    fn stopped_lfo_holds_base_cutoff() {
        let mut node = AutoFilterNode::default();
        node.stop_lfo();
        let mut buffer = vec![0.1f32; 512];
        node.render_block(&mut buffer, &RenderCtx::new(SR, 0));
        assert_eq!(node.cutoff(), BASE_CUTOFF);
    }

    #[test]
    fn scheduled_start_fires_on_its_sample() {
        let mut node = AutoFilterNode::default();
        node.stop_lfo();
        node.start_lfo_at(1000);

        let mut buffer = vec![0.0f32; 512];
        node.render_block(&mut buffer, &RenderCtx::new(SR, 0));
        assert_eq!(node.lfo_state(), LfoState::Scheduled(1000));

        node.render_block(&mut buffer, &RenderCtx::new(SR, 512));
        assert!(node.is_lfo_running());
    }

    #[test]
    fn sweep_stays_within_depth_range() {
        let mut node = AutoFilterNode::default();
        node.set_param(EffectParam::FilterFrequency, 10.0);
        let top = BASE_CUTOFF * 2.0_f32.powf(OCTAVES * node.params().depth);

        let mut buffer = vec![0.0f32; 64];
        for block in 0..200u64 {
            node.render_block(&mut buffer, &RenderCtx::new(SR, block * 64));
            let cutoff = node.cutoff();
            assert!(cutoff >= BASE_CUTOFF - 1e-3 && cutoff <= top + 1e-2);
        }
    }

    #[test]
    fn zero_wet_passes_dry() {
        let mut node = AutoFilterNode::default();
        node.set_param(EffectParam::FilterWet, 0.0);
        let input: Vec<f32> = (0..256).map(|i| ((i as f32) * 0.3).sin()).collect();
        let mut buffer = input.clone();
        node.render_block(&mut buffer, &RenderCtx::new(SR, 0));
        assert_eq!(buffer, input);
    }

    #[test]
    fn rejects_foreign_params_and_clamps() {
        let mut node = AutoFilterNode::default();
        assert!(!node.set_param(EffectParam::DelayWet, 0.5));
        assert!(node.set_param(EffectParam::FilterResonance, 100.0));
        assert_eq!(node.get_param(EffectParam::FilterResonance), Some(20.0));
        assert_eq!(node.get_param(EffectParam::ReverbWet), None);
    }
}
