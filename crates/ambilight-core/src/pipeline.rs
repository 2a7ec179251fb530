//! Frame to command composition
//!
//! One [`ColorPipeline`] per running visual session. It owns the only state
//! carried between iterations: the previous linear sample (modes with a
//! pre-blend) and the smoother's last emitted color.

use crate::aggregate::{LinearSample, SampleAggregator};
use crate::brightness::BrightnessMapper;
use crate::color::adjust::ColorAdjuster;
use crate::color::unit_to_u8;
use crate::command::ColorCommand;
use crate::error::{CoreError, Result};
use crate::frame::{Frame, Rect, Size};
use crate::mode::ModeProfile;
use crate::smoothing::{SmoothingState, TemporalSmoother};
use tracing::{debug, trace};

/// Stateful visual pipeline for one mode
#[derive(Debug, Clone)]
pub struct ColorPipeline {
    profile: ModeProfile,
    smoother: TemporalSmoother,
    brightness: BrightnessMapper,
    previous: Option<LinearSample>,
    smoothing: SmoothingState,
}

impl ColorPipeline {
    /// Build a pipeline for a visual mode profile
    ///
    /// Fails if the profile is invalid or belongs to a non-visual mode.
    pub fn new(profile: ModeProfile) -> Result<Self> {
        if !profile.mode.is_visual() {
            return Err(CoreError::NotVisual(profile.mode));
        }
        profile.validate()?;
        debug!("Color pipeline ready: {}", profile);

        Ok(Self {
            smoother: TemporalSmoother::new(profile.smoothing),
            brightness: BrightnessMapper::for_profile(&profile),
            profile,
            previous: None,
            smoothing: SmoothingState::new(),
        })
    }

    /// Profile driving this pipeline
    pub fn profile(&self) -> &ModeProfile {
        &self.profile
    }

    /// Part of a display of `display` size that this mode samples
    pub fn capture_region(&self, display: Size) -> Rect {
        self.profile.region.select(display)
    }

    /// Process a frame of the whole display
    pub fn process(&mut self, frame: &Frame) -> ColorCommand {
        let sample = SampleAggregator::new(&self.profile).aggregate(frame, self.previous);
        self.finish(sample)
    }

    /// Process a frame that was already grabbed from [`capture_region`](Self::capture_region)
    pub fn process_region(&mut self, frame: &Frame) -> ColorCommand {
        let sample =
            SampleAggregator::new(&self.profile).aggregate_region(frame.as_view(), self.previous);
        self.finish(sample)
    }

    /// Forget all carried state, as at session start
    pub fn reset(&mut self) {
        self.previous = None;
        self.smoothing.reset();
    }

    /// Linear sample retained for the next pre-blend, if any
    pub fn previous_sample(&self) -> Option<LinearSample> {
        self.previous
    }

    /// Smoother state
    pub fn smoothing_state(&self) -> &SmoothingState {
        &self.smoothing
    }

    fn finish(&mut self, sample: LinearSample) -> ColorCommand {
        if self.profile.pre_blend.is_some() {
            self.previous = Some(sample);
        }

        let adjusted = ColorAdjuster::new(&self.profile).adjust(sample);
        let candidate = adjusted.rgb.map(unit_to_u8);
        let rgb = self.smoother.smooth(candidate, &mut self.smoothing);
        let command = ColorCommand::new(rgb, self.brightness.map(adjusted.value));

        trace!(
            "{}: candidate {:?} -> {}",
            self.profile.mode,
            candidate,
            command
        );
        command
    }
}
