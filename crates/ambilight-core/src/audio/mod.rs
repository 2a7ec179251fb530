//! Sound-reactive input path
//!
//! - [`analyzer`] - magnitude spectrum of one mono audio block
//! - [`spectral`] - low/mid/high band energies mapped to RGB
//!
//! This path skips aggregation, color adjustment and smoothing.

pub mod analyzer;
pub mod spectral;

pub use analyzer::{Spectrum, SpectrumAnalyzer};
pub use spectral::{SpectralColorMapper, SpectrumBands};

/// Sample rate the sound mode asks the input device for
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Samples per analysed block
pub const DEFAULT_BLOCK_SIZE: usize = 1024;
/// Dimming sent with every sound-mode command
pub const DEFAULT_SOUND_BRIGHTNESS: u8 = 200;
