//! Final light command

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color and dimming sent to a fixture
///
/// Every field is already in device range; there is nothing left to clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorCommand {
    /// Red, 0..=255
    pub r: u8,
    /// Green, 0..=255
    pub g: u8,
    /// Blue, 0..=255
    pub b: u8,
    /// Device dimming level
    pub brightness: u8,
}

impl ColorCommand {
    /// Create a command from an RGB triple and dimming level
    pub const fn new(rgb: [u8; 3], brightness: u8) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            brightness,
        }
    }

    /// RGB triple
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for ColorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x} @ {}",
            self.r, self.g, self.b, self.brightness
        )
    }
}
