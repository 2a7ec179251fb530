//! sRGB transfer functions
//!
//! Averaging must happen in linear light; captured pixels arrive gamma
//! encoded. Both directions are piecewise: a linear toe near black and a
//! 2.4 power segment above it.

use once_cell::sync::Lazy;

/// Encoded value at which the decode curve switches from the linear toe to
/// the power segment.
pub const ENCODED_KNEE: f64 = 0.04045;

/// Linear value at which the encode curve switches segments.
///
/// This is the exact image of [`ENCODED_KNEE`] under the linear toe
/// (0.0031308049...). The customary 0.0031308 leaves a sliver of inputs just
/// below the knee that decode on the toe but re-encode on the power segment.
pub const LINEAR_KNEE: f64 = ENCODED_KNEE / TOE_SLOPE;

const TOE_SLOPE: f64 = 12.92;
const OFFSET: f64 = 0.055;
const SCALE: f64 = 1.055;
const GAMMA: f64 = 2.4;

/// Decode an encoded channel value in [0, 1] to linear light.
#[inline]
pub fn to_linear(c: f64) -> f64 {
    if c <= ENCODED_KNEE {
        c / TOE_SLOPE
    } else {
        ((c + OFFSET) / SCALE).powf(GAMMA)
    }
}

/// Encode a linear-light channel value in [0, 1].
#[inline]
pub fn to_encoded(c: f64) -> f64 {
    if c <= LINEAR_KNEE {
        c * TOE_SLOPE
    } else {
        SCALE * c.powf(1.0 / GAMMA) - OFFSET
    }
}

/// Decode every element in place.
pub fn to_linear_in_place(values: &mut [f64]) {
    for v in values {
        *v = to_linear(*v);
    }
}

/// Encode every element in place.
pub fn to_encoded_in_place(values: &mut [f64]) {
    for v in values {
        *v = to_encoded(*v);
    }
}

static SRGB8_TO_LINEAR: Lazy<[f64; 256]> = Lazy::new(|| {
    let mut table = [0.0; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = to_linear(i as f64 / 255.0);
    }
    table
});

/// Decode an 8-bit encoded channel through a lookup table.
///
/// The table is filled with [`to_linear`], so results are bit-identical to
/// the scalar path.
#[inline]
pub fn srgb8_to_linear(value: u8) -> f64 {
    SRGB8_TO_LINEAR[value as usize]
}
