//! Summing and wet/dry helpers.
//!
//! `wet` is the balance between processed and unprocessed signal:
//! 0.0 = all dry, 1.0 = all wet. A wet of 0.0 leaves the node in the signal
//! path but makes it transparent, which is how effects are muted.

/// Blend dry and wet samples: `dry · (1 - wet) + processed · wet`.
#[inline]
pub fn blend_dry_wet(dry: f32, processed: f32, wet: f32) -> f32 {
    dry * (1.0 - wet) + processed * wet
}

/// Add `src` into `dst` sample by sample.
///
/// Can exceed [-1.0, +1.0]; the output chain's pre-gain and limiter take care
/// of that.
#[inline]
pub fn sum_into(dst: &mut [f32], src: &[f32]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d += s;
    }
}

#[inline]
pub fn apply_gain(buffer: &mut [f32], gain: f32) {
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_wet_is_transparent() {
        assert_eq!(blend_dry_wet(0.4, -0.9, 0.0), 0.4);
    }

    #[test]
    fn full_wet_is_processed_only() {
        assert_eq!(blend_dry_wet(0.4, -0.9, 1.0), -0.9);
    }

    #[test]
    fn sum_into_adds() {
        let mut a = [0.1, 0.2];
        sum_into(&mut a, &[0.3, -0.2]);
        assert!((a[0] - 0.4).abs() < 1e-6);
        assert!(a[1].abs() < 1e-6);
    }
}
