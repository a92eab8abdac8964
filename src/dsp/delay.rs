/// Longest delay any line can hold: 2 s at 96 kHz.
pub const MAX_DELAY_SAMPLES: usize = 192_000;

/// Circular delay buffer with linear-interpolated reads.
///
/// The buffer is allocated once in `new` and never resized, so reading and
/// writing are allocation-free.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new() -> Self {
        Self::with_capacity(MAX_DELAY_SAMPLES)
    }

    pub fn with_capacity(samples: usize) -> Self {
        Self {
            buffer: vec![0.0; samples.max(2)],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Read the sample written `delay` samples ago (fractional).
    #[inline]
    pub fn read(&self, delay: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1.0, (len - 1) as f32);
        let whole = delay.floor() as usize;
        let frac = delay - whole as f32;

        let a = self.buffer[(self.write_pos + len - whole) % len];
        let b = self.buffer[(self.write_pos + len - whole - 1) % len];
        a + (b - a) * frac
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Echo with feedback: `y[n] = x[n - d] + feedback · y[n - d]` (wet only).
pub struct FeedbackDelay {
    line: DelayLine,
}

impl FeedbackDelay {
    pub fn new() -> Self {
        Self {
            line: DelayLine::new(),
        }
    }

    /// Process one sample; returns the delayed (wet) signal.
    #[inline]
    pub fn process(&mut self, x: f32, delay_samples: f32, feedback: f32) -> f32 {
        let delayed = self.line.read(delay_samples);
        self.line.write(x + delayed * feedback.clamp(0.0, 0.99));
        delayed
    }

    pub fn reset(&mut self) {
        self.line.reset();
    }
}

impl Default for FeedbackDelay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_back_after_delay() {
        let mut line = DelayLine::with_capacity(64);
        let mut out = Vec::new();
        for n in 0..20 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            out.push(line.read(10.0));
            line.write(x);
        }
        // Sample written at n=0 is 10 writes behind at n=10
        assert!((out[10] - 1.0).abs() < 1e-6);
        assert_eq!(out.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn feedback_repeats_decay() {
        let mut delay = FeedbackDelay::new();
        let mut echoes = Vec::new();
        for n in 0..40 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let y = delay.process(x, 10.0, 0.5);
            if y.abs() > 1e-6 {
                echoes.push((n, y));
            }
        }
        assert_eq!(echoes, vec![(10, 1.0), (20, 0.5), (30, 0.25)]);
    }
}
