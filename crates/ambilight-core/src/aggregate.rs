//! Spatial aggregation of a frame into one linear-light color
//!
//! The frame region chosen by the mode's [`RegionPolicy`] is stride
//! subsampled to roughly the profile's capture resolution, decoded to linear
//! light and averaged, either flat or with a radial center weight. Modes with
//! a [`PreBlend`] then mix the result with the previous iteration's sample.
//!
//! [`RegionPolicy`]: crate::mode::RegionPolicy
//! [`PreBlend`]: crate::mode::PreBlend

use crate::color::srgb8_to_linear;
use crate::frame::{Frame, FrameView, Size};
use crate::mode::{ModeProfile, Weighting};
use tracing::trace;

/// Mean linear-light color of one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearSample {
    /// Red, linear light
    pub r: f64,
    /// Green, linear light
    pub g: f64,
    /// Blue, linear light
    pub b: f64,
}

impl LinearSample {
    /// All channels zero
    pub const BLACK: LinearSample = LinearSample {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Create a new sample
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array
    pub fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// `alpha * self + (1 - alpha) * previous`, per channel
    pub fn blend(self, previous: LinearSample, alpha: f64) -> LinearSample {
        let mix = |new: f64, old: f64| alpha * new + (1.0 - alpha) * old;
        LinearSample::new(
            mix(self.r, previous.r),
            mix(self.g, previous.g),
            mix(self.b, previous.b),
        )
    }
}

/// Reduces a frame to a [`LinearSample`] according to a mode profile
#[derive(Debug, Clone, Copy)]
pub struct SampleAggregator<'a> {
    profile: &'a ModeProfile,
}

impl<'a> SampleAggregator<'a> {
    /// Create an aggregator for a profile
    pub fn new(profile: &'a ModeProfile) -> Self {
        Self { profile }
    }

    /// Aggregate a full display frame
    ///
    /// The mode's region is cropped out of `frame` first.
    pub fn aggregate(&self, frame: &Frame, previous: Option<LinearSample>) -> LinearSample {
        let region = self.profile.region.select(frame.size());
        self.aggregate_region(frame.view(region), previous)
    }

    /// Aggregate a view that already covers the mode's region
    pub fn aggregate_region(
        &self,
        view: FrameView<'_>,
        previous: Option<LinearSample>,
    ) -> LinearSample {
        let grid = LinearGrid::subsample(view, self.profile.capture);
        let sample = match self.profile.weighting {
            Weighting::Uniform => grid.mean(),
            Weighting::Radial { center_bias } => grid.radial_mean(center_bias),
        };

        trace!(
            "aggregated {}x{} grid -> ({:.4}, {:.4}, {:.4})",
            grid.width,
            grid.height,
            sample.r,
            sample.g,
            sample.b
        );

        match (self.profile.pre_blend, previous) {
            (Some(blend), Some(prev)) => sample.blend(prev, blend.reactive_alpha),
            _ => sample,
        }
    }
}

/// Subsampled region in linear light, row-major
struct LinearGrid {
    width: usize,
    height: usize,
    texels: Vec<[f64; 3]>,
}

impl LinearGrid {
    /// Keep every k-th column and row, `k = max(1, dim / target)`
    fn subsample(view: FrameView<'_>, target: Size) -> Self {
        if view.is_empty() {
            return Self {
                width: 0,
                height: 0,
                texels: Vec::new(),
            };
        }

        let step_x = stride(view.width(), target.width);
        let step_y = stride(view.height(), target.height);

        let mut texels = Vec::new();
        let mut height = 0;
        for y in (0..view.height()).step_by(step_y) {
            height += 1;
            for x in (0..view.width()).step_by(step_x) {
                let [r, g, b] = view.pixel(x, y);
                texels.push([srgb8_to_linear(r), srgb8_to_linear(g), srgb8_to_linear(b)]);
            }
        }
        let width = texels.len() / height.max(1);

        Self {
            width,
            height,
            texels,
        }
    }

    fn mean(&self) -> LinearSample {
        if self.texels.is_empty() {
            return LinearSample::BLACK;
        }
        let mut sum = [0.0; 3];
        for texel in &self.texels {
            for (acc, c) in sum.iter_mut().zip(texel) {
                *acc += c;
            }
        }
        let n = self.texels.len() as f64;
        LinearSample::new(sum[0] / n, sum[1] / n, sum[2] / n)
    }

    fn radial_mean(&self, center_bias: f64) -> LinearSample {
        let weights = radial_weights(self.width, self.height, center_bias);
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return self.mean();
        }

        let mut sum = [0.0; 3];
        for (texel, w) in self.texels.iter().zip(&weights) {
            for (acc, c) in sum.iter_mut().zip(texel) {
                *acc += c * w;
            }
        }
        LinearSample::new(sum[0] / total, sum[1] / total, sum[2] / total)
    }
}

fn stride(extent: u32, target: u32) -> usize {
    (extent / target.max(1)).max(1) as usize
}

/// Row-major weights `max(0, center_bias - dist / max_dist)`
///
/// The center is `(width / 2, height / 2)` in integer texel coordinates and
/// `max_dist` its distance to the origin (1 when the center is the origin).
pub fn radial_weights(width: usize, height: usize, center_bias: f64) -> Vec<f64> {
    let (cx, cy) = ((width / 2) as f64, (height / 2) as f64);
    let max_dist = if cx > 0.0 || cy > 0.0 {
        (cx * cx + cy * cy).sqrt()
    } else {
        1.0
    };

    let mut weights = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let dist = (x as f64 - cx).hypot(y as f64 - cy);
            weights.push((center_bias - dist / max_dist).max(0.0));
        }
    }
    weights
}
