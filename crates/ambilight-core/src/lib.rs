//! Ambilight Core - Signal-to-Color Pipeline
//!
//! This crate turns ambient signals into light commands:
//! - **Color**: sRGB transfer functions and HSV-based color adjustment
//! - **Aggregation**: per-mode region selection, subsampling and weighted averaging
//! - **Smoothing**: exponential smoothing of emitted colors
//! - **Brightness**: perceptual value to device dimming range
//! - **Audio**: FFT spectrum analysis and spectrum-to-color mapping
//!
//! ## Quick Start
//!
//! ```rust
//! use ambilight_core::{ColorPipeline, Frame, Mode, ModeProfile};
//!
//! # fn main() -> ambilight_core::Result<()> {
//! let mut pipeline = ColorPipeline::new(ModeProfile::defaults(Mode::Ambient))?;
//! let frame = Frame::filled(64, 36, [0, 0, 0]);
//! let command = pipeline.process(&frame);
//! assert_eq!(command.rgb(), [0, 0, 0]);
//! assert_eq!(command.brightness, 60);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Per-mode spatial averaging
pub mod aggregate;
/// Audio spectrum analysis and color mapping
pub mod audio;
/// Value to dimming mapping
pub mod brightness;
/// Capture collaborator contract
pub mod capture;
/// Color space conversion and adjustment
pub mod color;
/// Final light command
pub mod command;
/// Error types
pub mod error;
/// Frames and regions
pub mod frame;
/// Operating modes and their tunables
pub mod mode;
/// Visual pipeline composition
pub mod pipeline;
/// Temporal smoothing
pub mod smoothing;

pub use aggregate::{LinearSample, SampleAggregator};
pub use audio::{Spectrum, SpectralColorMapper, SpectrumAnalyzer, SpectrumBands};
pub use brightness::BrightnessMapper;
pub use capture::FrameSource;
pub use color::adjust::{AdjustedColor, ColorAdjuster};
pub use command::ColorCommand;
pub use error::{CoreError, Result};
pub use frame::{Frame, FrameView, Rect, Size};
pub use mode::{
    BrightnessMap, HueBoost, Mode, ModeOverrides, ModeProfile, ModeProfiles, PreBlend,
    RegionPolicy, Weighting,
};
pub use pipeline::ColorPipeline;
pub use smoothing::{SmoothingState, TemporalSmoother};
