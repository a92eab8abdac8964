//! Hi-hat voice (closed).
//!
//! A tight, short burst of filtered noise.
//!
//! 1. White noise provides the "metallic" character
//! 2. High-pass filter removes low frequencies (hi-hats are bright)
//! 3. Very short envelope for that tight "tss" sound

use crate::dsp::envelope::Envelope;
use crate::dsp::filter::SVFilter;
use crate::dsp::oscillator::OscillatorBlock;
use crate::synth::message::NoteTrigger;
use crate::synth::voice::SoundSource;

const HIGHPASS_HZ: f32 = 7000.0;
const HIHAT_GAIN: f32 = 0.2;

pub struct HiHat {
    sample_rate: f32,
    noise: OscillatorBlock,
    filter: SVFilter,
    env: Envelope,
    release_at: Option<u64>,
}

impl HiHat {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            noise: OscillatorBlock::noise(),
            filter: SVFilter::highpass(HIGHPASS_HZ),
            env: Envelope::adsr(0.001, 0.05, 0.0, 0.03),
            release_at: None,
        }
    }
}

impl SoundSource for HiHat {
    /// Pitch is ignored; only the timing matters.
    fn trigger(&mut self, trigger: NoteTrigger) {
        self.release_at = Some(trigger.release_at());
        self.env.note_on();
    }

    fn render(&mut self, out: &mut [f32], now: u64) {
        for (i, sample) in out.iter_mut().enumerate() {
            if self.release_at.is_some_and(|at| now + i as u64 >= at) {
                self.env.note_off(self.sample_rate);
                self.release_at = None;
            }

            if !self.env.is_active() {
                *sample = 0.0;
                continue;
            }

            let level = self.env.next_sample(self.sample_rate);
            let noise = self.noise.next_sample(0.0, self.sample_rate);
            *sample = self.filter.process(noise, self.sample_rate) * level * HIHAT_GAIN;
        }
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}
