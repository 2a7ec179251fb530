//! Perceptual value to device dimming

use crate::color::quantize;
use crate::mode::{BrightnessMap, ModeProfile};

/// Maps HSV value in [0, 1] to a dimming level via `floor + span * value`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessMapper {
    map: BrightnessMap,
}

impl BrightnessMapper {
    /// Create a mapper from an affine map
    pub fn new(map: BrightnessMap) -> Self {
        Self { map }
    }

    /// Mapper for a profile's brightness settings
    pub fn for_profile(profile: &ModeProfile) -> Self {
        Self::new(profile.brightness)
    }

    /// Inclusive output range
    pub fn range(&self) -> (u8, u8) {
        self.map.range()
    }

    /// Map a value to dimming, truncated and clamped to [`range`](Self::range)
    pub fn map(&self, value: f64) -> u8 {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (low, high) = self.range();
        quantize(self.map.floor as f64 + self.map.span as f64 * value).clamp(low, high)
    }
}
