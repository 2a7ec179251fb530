//! Perceptual color adjustment
//!
//! Order matters: encode, boost saturation in HSV, shape value, rebuild RGB,
//! then apply channel gain as a final cosmetic correction. Gain must stay out
//! of the HSV stage and the value gamma must act before reconstruction.

use super::conversion::to_encoded;
use crate::aggregate::LinearSample;
use crate::mode::ModeProfile;
use palette::{FromColor, Hsv, Srgb};

type HsvF64 = Hsv<palette::encoding::Srgb, f64>;

/// Adjusted color in encoded space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedColor {
    /// Encoded RGB after gain, each channel in [0, 1]
    pub rgb: [f64; 3],
    /// HSV value before gain (after any value gamma), in [0, 1]
    pub value: f64,
}

/// Applies a profile's saturation, value and gain shaping
#[derive(Debug, Clone, Copy)]
pub struct ColorAdjuster<'a> {
    profile: &'a ModeProfile,
}

impl<'a> ColorAdjuster<'a> {
    /// Create an adjuster for a profile
    pub fn new(profile: &'a ModeProfile) -> Self {
        Self { profile }
    }

    /// Adjust one linear sample
    pub fn adjust(&self, sample: LinearSample) -> AdjustedColor {
        let [r, g, b] = sample.channels().map(|c| clamp_unit(to_encoded(clamp_unit(c))));

        let hsv = HsvF64::from_color(Srgb::<f64>::new(r, g, b));
        let hue = hsv.hue.into_positive_degrees() / 360.0;

        let mut saturation = hsv.saturation * self.profile.saturation_boost;
        if self.profile.hue_boost.contains(hue) {
            saturation *= self.profile.hue_boost.multiplier;
        }
        let saturation = clamp_unit(saturation);

        let value = match self.profile.value_gamma {
            Some(gamma) => clamp_unit(hsv.value).powf(gamma),
            None => clamp_unit(hsv.value),
        };

        let rebuilt = Srgb::<f64>::from_color(HsvF64::new(hue * 360.0, saturation, value));
        let [gr, gg, gb] = self.profile.gain;

        AdjustedColor {
            rgb: [
                clamp_unit(rebuilt.red * gr),
                clamp_unit(rebuilt.green * gg),
                clamp_unit(rebuilt.blue * gb),
            ],
            value,
        }
    }
}

fn clamp_unit(c: f64) -> f64 {
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}
