//! Color math
//!
//! - [`conversion`] - sRGB transfer functions (encoded <-> linear light)
//! - [`adjust`] - saturation, hue-range lift, value gamma and channel gain

pub mod adjust;
pub mod conversion;

pub use conversion::{srgb8_to_linear, to_encoded, to_linear};

/// Absorbs round-off from the transfer functions so that an exact 1.0 input
/// does not land one step below full scale after truncation.
pub(crate) const QUANTIZE_EPSILON: f64 = 1e-9;

/// Truncate a 0..255 scaled value to a byte, saturating at both ends.
///
/// NaN maps to 0.
#[inline]
pub(crate) fn quantize(scaled: f64) -> u8 {
    if !scaled.is_finite() {
        return if scaled == f64::INFINITY { 255 } else { 0 };
    }
    (scaled + QUANTIZE_EPSILON).floor().clamp(0.0, 255.0) as u8
}

/// Quantize a unit-range channel to 0..255.
#[inline]
pub(crate) fn unit_to_u8(channel: f64) -> u8 {
    quantize(channel * 255.0)
}
