//! Waveshaping distortion.
//!
//! A waveshaper applies a transfer function to each sample. Here the transfer
//! function is the soft clipper `f(x) = x / (1 + |x|)` with a drive in front:
//!
//! ```text
//! y = f(x · drive) · makeup
//! ```
//!
//! `amount` (0.0 - 1.0) maps onto drive. At amount 0 the drive is 1 and quiet
//! signals pass almost unchanged; the curve still rounds off peaks, so
//! amount 0 is "least distorted", not "bypassed".

/// Drive reached at amount = 1.0.
const MAX_DRIVE: f32 = 50.0;

/// Drive for a normalised distortion amount.
#[inline]
pub fn drive_for_amount(amount: f32) -> f32 {
    1.0 + amount.clamp(0.0, 1.0) * (MAX_DRIVE - 1.0)
}

/// Soft clipping: x / (1 + |x|).
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

/// Shape one sample for the given amount, with makeup gain so a full-scale
/// input stays full-scale.
#[inline]
pub fn shape(sample: f32, amount: f32) -> f32 {
    let drive = drive_for_amount(amount);
    let makeup = (1.0 + drive) / drive;
    soft_clip(sample, drive) * makeup
}
