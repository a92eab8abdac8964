use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
State-Variable Filter (TPT form)
================================

| type      | passes          | rejects         |
| --------- | --------------- | --------------- |
| low-pass  | below cutoff    | above cutoff    |
| high-pass | above cutoff    | below cutoff    |
| band-pass | around cutoff   | both sides      |

Two integrators with trapezoidal ("topology-preserving") discretisation:

    g = tan(π · cutoff / sample_rate)
    k = 1 / Q
    h = 1 / (1 + g·(g + k))

    v1 = h · (ic1 + g · (x − ic2))
    v2 = ic2 + g · v1
    ic1 = 2·v1 − ic1
    ic2 = 2·v2 − ic2

    low = v2, band = v1, high = x − k·v1 − v2

Cutoff can change every sample without blowing up, which is what the
auto-filter needs: its LFO sweeps the cutoff continuously.

Q of 0.707 is the flat Butterworth response; higher Q peaks at the cutoff.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
}

pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,
    cutoff_hz: f32,
    q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: q.max(0.01),
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, 0.707)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, 0.707)
    }

    /// Filter one sample at the given sample rate.
    #[inline]
    pub fn process(&mut self, x: f32, sample_rate: f32) -> f32 {
        let cutoff = self.cutoff_hz.clamp(10.0, sample_rate * 0.49);
        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / self.q;
        let h = 1.0 / (1.0 + g * (g + k));

        let v1 = h * (self.ic1eq + g * (x - self.ic2eq));
        let v2 = self.ic2eq + g * v1;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.filter_type {
            FilterType::LowPass => v2,
            FilterType::BandPass => v1,
            FilterType::HighPass => x - k * v1 - v2,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q.max(0.01);
    }

    pub fn q(&self) -> f32 {
        self.q
    }
}
