//! Schroeder reverb with a decay time and a pre-delay.
//!
//! ```text
//! Input ─→ [Pre-delay] ─┬─→ [Comb 1] ─┐
//!                       ├─→ [Comb 2] ─┤
//!                       ├─→ [Comb 3] ─┼─→ (+) ─→ [Allpass 1] ─→ [Allpass 2] ─→ Output
//!                       └─→ [Comb 4] ─┘
//! ```
//!
//! Decay is specified as RT60, the time for the tail to fall by 60 dB. Each
//! comb with loop delay `d` seconds gets the feedback gain that reaches
//! -60 dB after `decay` seconds:
//!
//! ```text
//! g = 10^(-3 · d / decay)
//! ```

use super::delay::DelayLine;

/// Comb loop times in ms, mutually prime so the echoes do not pile up.
const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];
const ALLPASS_GAIN: f32 = 0.5;
/// One-pole damping inside the comb loops (0 = bright, 1 = dark).
const DAMPING: f32 = 0.3;
/// Longest pre-delay: 0.5 s at 96 kHz.
const MAX_PRE_DELAY_SAMPLES: usize = 48_000;

struct Comb {
    line: DelayLine,
    delay: f32,
    feedback: f32,
    filter_state: f32,
}

impl Comb {
    fn new(delay: f32) -> Self {
        Self {
            line: DelayLine::with_capacity(delay as usize + 2),
            delay,
            feedback: 0.0,
            filter_state: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let out = self.line.read(self.delay);
        self.filter_state = out * (1.0 - DAMPING) + self.filter_state * DAMPING;
        self.line.write(x + self.filter_state * self.feedback);
        out
    }
}

struct Allpass {
    line: DelayLine,
    delay: f32,
}

impl Allpass {
    fn new(delay: f32) -> Self {
        Self {
            line: DelayLine::with_capacity(delay as usize + 2),
            delay,
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let delayed = self.line.read(self.delay);
        let out = -ALLPASS_GAIN * x + delayed;
        self.line.write(x + ALLPASS_GAIN * out);
        out
    }
}

pub struct SchroederReverb {
    sample_rate: f32,
    pre_delay: DelayLine,
    pre_delay_samples: f32,
    combs: [Comb; 4],
    allpasses: [Allpass; 2],
}

impl SchroederReverb {
    pub fn new(sample_rate: f32, decay_secs: f32, pre_delay_secs: f32) -> Self {
        let ms = |ms: f32| (ms * sample_rate / 1000.0).max(1.0);
        let mut reverb = Self {
            sample_rate,
            pre_delay: DelayLine::with_capacity(MAX_PRE_DELAY_SAMPLES),
            pre_delay_samples: 0.0,
            combs: COMB_DELAYS_MS.map(|d| Comb::new(ms(d))),
            allpasses: ALLPASS_DELAYS_MS.map(|d| Allpass::new(ms(d))),
        };
        reverb.set_decay(decay_secs);
        reverb.set_pre_delay(pre_delay_secs);
        reverb
    }

    /// Set the RT60 decay time in seconds.
    pub fn set_decay(&mut self, decay_secs: f32) {
        let decay = decay_secs.max(0.01);
        for comb in self.combs.iter_mut() {
            let loop_secs = comb.delay / self.sample_rate;
            comb.feedback = 10.0_f32.powf(-3.0 * loop_secs / decay).min(0.98);
        }
    }

    pub fn set_pre_delay(&mut self, pre_delay_secs: f32) {
        let max = (self.pre_delay.capacity() - 1) as f32;
        self.pre_delay_samples = (pre_delay_secs.max(0.0) * self.sample_rate).clamp(0.0, max);
    }

    /// Process one sample; returns the wet signal only.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let input = if self.pre_delay_samples < 1.0 {
            x
        } else {
            let delayed = self.pre_delay.read(self.pre_delay_samples);
            self.pre_delay.write(x);
            delayed
        };

        let mut sum = 0.0;
        for comb in self.combs.iter_mut() {
            sum += comb.process(input);
        }
        let mut out = sum * 0.25;
        for allpass in self.allpasses.iter_mut() {
            out = allpass.process(out);
        }
        out
    }

    pub fn reset(&mut self) {
        self.pre_delay.reset();
        for comb in self.combs.iter_mut() {
            comb.line.reset();
            comb.filter_state = 0.0;
        }
        for allpass in self.allpasses.iter_mut() {
            allpass.line.reset();
        }
    }
}
