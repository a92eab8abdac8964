//! Peak limiter for the end of the output chain.
//!
//! Gain reduction follows the signal peak with instant attack and an
//! exponential release. The output never exceeds the threshold, so summing
//! three parallel effect paths cannot clip the destination.

pub struct Limiter {
    threshold: f32,
    release_coeff: f32,
    gain: f32,
}

impl Limiter {
    /// `threshold_db` is the ceiling in dBFS, `release_secs` the recovery time.
    pub fn new(sample_rate: f32, threshold_db: f32, release_secs: f32) -> Self {
        let release_samples = (release_secs * sample_rate).max(1.0);
        Self {
            threshold: 10.0_f32.powf(threshold_db / 20.0),
            release_coeff: (-1.0 / release_samples).exp(),
            gain: 1.0,
        }
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let peak = x.abs();
        let target = if peak > self.threshold {
            self.threshold / peak
        } else {
            1.0
        };

        if target < self.gain {
            self.gain = target;
        } else {
            self.gain = target + (self.gain - target) * self.release_coeff;
        }

        (x * self.gain).clamp(-self.threshold, self.threshold)
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.gain = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_threshold() {
        let mut limiter = Limiter::new(48_000.0, -3.0, 0.05);
        let mut buffer: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 4.0 } else { -3.0 }).collect();
        limiter.render(&mut buffer);
        let ceiling = limiter.threshold();
        assert!(buffer.iter().all(|s| s.abs() <= ceiling + 1e-6));
    }

    #[test]
    fn quiet_signal_passes_untouched() {
        let mut limiter = Limiter::new(48_000.0, -3.0, 0.05);
        let mut buffer = vec![0.2f32; 256];
        limiter.render(&mut buffer);
        assert!(buffer.iter().all(|&s| (s - 0.2).abs() < 1e-6));
    }
}
