//! Operating modes and their tunables
//!
//! Every mode is described by an immutable [`ModeProfile`] built once at
//! startup. The profile carries both the numeric tunables and the mode's
//! strategy for spatial sampling ([`RegionPolicy`], [`Weighting`],
//! [`PreBlend`]), so no component branches on the mode identifier itself.

use crate::error::{CoreError, Result};
use crate::frame::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Full-screen flat average, smooth
    Ambient,
    /// Center crop, coarse sampling, reactive
    Gaming,
    /// Full-screen center-weighted average with value punch-up
    Movie,
    /// Audio spectrum driven
    Sound,
}

impl Mode {
    /// All modes in display order
    pub const ALL: [Mode; 4] = [Mode::Ambient, Mode::Gaming, Mode::Movie, Mode::Sound];

    /// Lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Ambient => "ambient",
            Mode::Gaming => "gaming",
            Mode::Movie => "movie",
            Mode::Sound => "sound",
        }
    }

    /// True for the screen-capture modes
    pub fn is_visual(&self) -> bool {
        !matches!(self, Mode::Sound)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ambient" => Ok(Mode::Ambient),
            "gaming" => Ok(Mode::Gaming),
            "movie" => Ok(Mode::Movie),
            "sound" => Ok(Mode::Sound),
            other => Err(CoreError::UnknownMode(other.to_string())),
        }
    }
}

/// Which part of the display is sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionPolicy {
    /// Whole display surface
    Full,
    /// Centered rectangle spanning `fraction` of each dimension
    Center {
        /// Share of width and height kept, in (0, 1]
        fraction: f64,
    },
}

impl RegionPolicy {
    /// Region of a display of the given size to capture
    pub fn select(&self, display: Size) -> Rect {
        match *self {
            RegionPolicy::Full => Rect::full(display),
            RegionPolicy::Center { fraction } => {
                let margin = (1.0 - fraction) / 2.0;
                let (x, width) = center_span(display.width, margin);
                let (y, height) = center_span(display.height, margin);
                Rect::new(x, y, width, height)
            }
        }
    }
}

fn center_span(extent: u32, margin: f64) -> (u32, u32) {
    let start = (extent as f64 * margin) as u32;
    let end = (extent as f64 * (1.0 - margin)) as u32;
    let start = start.min(extent.saturating_sub(1));
    (start, end.saturating_sub(start).max(1))
}

/// Spatial weighting of the subsampled grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weighting {
    /// Plain mean
    Uniform,
    /// `max(0, center_bias - dist / max_dist)` around the grid center
    Radial {
        /// Weight at the exact center
        center_bias: f64,
    },
}

/// Blend of a new linear sample with the previous one, before color adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreBlend {
    /// Weight of the new sample, in [0, 1]
    pub reactive_alpha: f64,
}

/// Extra saturation for a band of hues that fixtures tend to render dull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueBoost {
    /// Inclusive hue interval in [0, 1)
    pub range: (f64, f64),
    /// Saturation multiplier applied inside the interval
    pub multiplier: f64,
}

impl HueBoost {
    /// True if `hue` lies in the boosted interval
    pub fn contains(&self, hue: f64) -> bool {
        self.range.0 <= hue && hue <= self.range.1
    }
}

/// Affine map from perceptual value to device dimming: `floor + span * v`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessMap {
    /// Dimming at value 0
    pub floor: u8,
    /// Dimming added at value 1
    pub span: u8,
}

impl BrightnessMap {
    /// Inclusive output range
    pub fn range(&self) -> (u8, u8) {
        (self.floor, self.floor.saturating_add(self.span))
    }
}

const DEFAULT_CAPTURE: Size = Size::new(60, 34);
const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(80);
const DEFAULT_SMOOTHING: f64 = 0.65;
const DEFAULT_SATURATION_BOOST: f64 = 1.2;
const DEFAULT_HUE_BOOST: HueBoost = HueBoost {
    range: (0.12, 0.45),
    multiplier: 1.12,
};
// Counters the red cast common on RGB bulbs
const DEFAULT_GAIN: [f64; 3] = [1.1, 1.0, 1.05];
const DEFAULT_BRIGHTNESS: BrightnessMap = BrightnessMap {
    floor: 60,
    span: 195,
};

const MOVIE_CAPTURE: Size = Size::new(48, 28);
const MOVIE_SATURATION_BOOST: f64 = 1.1;
const MOVIE_CENTER_BIAS: f64 = 1.6;
const MOVIE_VALUE_GAMMA: f64 = 0.9;

const GAMING_CAPTURE: Size = Size::new(16, 16);
const GAMING_FRAME_INTERVAL: Duration = Duration::from_millis(30);
const GAMING_SMOOTHING: f64 = 0.30;
const GAMING_CENTER_FRACTION: f64 = 0.5;
const GAMING_CENTER_BIAS: f64 = 1.2;
const GAMING_REACTIVE_ALPHA: f64 = 0.75;
const GAMING_BRIGHTNESS: BrightnessMap = BrightnessMap {
    floor: 100,
    span: 155,
};

/// Immutable per-mode configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModeProfile {
    /// Mode this profile belongs to
    pub mode: Mode,
    /// Target resolution of the subsampled grid
    pub capture: Size,
    /// Sleep between loop iterations
    pub frame_interval: Duration,
    /// Output smoothing factor in [0, 1]; higher is slower
    pub smoothing: f64,
    /// Saturation multiplier
    pub saturation_boost: f64,
    /// Hue-band saturation lift
    pub hue_boost: HueBoost,
    /// Per-channel gain (r, g, b), applied after HSV reconstruction
    pub gain: [f64; 3],
    /// Value to dimming map
    pub brightness: BrightnessMap,
    /// Exponent applied to HSV value before reconstruction
    pub value_gamma: Option<f64>,
    /// Region selection strategy
    pub region: RegionPolicy,
    /// Spatial weighting strategy
    pub weighting: Weighting,
    /// Optional temporal pre-blend in linear space
    pub pre_blend: Option<PreBlend>,
}

impl ModeProfile {
    /// Built-in tunables for a mode
    pub fn defaults(mode: Mode) -> Self {
        let base = Self {
            mode,
            capture: DEFAULT_CAPTURE,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            smoothing: DEFAULT_SMOOTHING,
            saturation_boost: DEFAULT_SATURATION_BOOST,
            hue_boost: DEFAULT_HUE_BOOST,
            gain: DEFAULT_GAIN,
            brightness: DEFAULT_BRIGHTNESS,
            value_gamma: None,
            region: RegionPolicy::Full,
            weighting: Weighting::Uniform,
            pre_blend: None,
        };

        match mode {
            Mode::Ambient | Mode::Sound => base,
            Mode::Movie => Self {
                capture: MOVIE_CAPTURE,
                saturation_boost: MOVIE_SATURATION_BOOST,
                value_gamma: Some(MOVIE_VALUE_GAMMA),
                weighting: Weighting::Radial {
                    center_bias: MOVIE_CENTER_BIAS,
                },
                ..base
            },
            Mode::Gaming => Self {
                capture: GAMING_CAPTURE,
                frame_interval: GAMING_FRAME_INTERVAL,
                smoothing: GAMING_SMOOTHING,
                brightness: GAMING_BRIGHTNESS,
                region: RegionPolicy::Center {
                    fraction: GAMING_CENTER_FRACTION,
                },
                weighting: Weighting::Radial {
                    center_bias: GAMING_CENTER_BIAS,
                },
                pre_blend: Some(PreBlend {
                    reactive_alpha: GAMING_REACTIVE_ALPHA,
                }),
                ..base
            },
        }
    }

    /// Apply user overrides on top of this profile
    pub fn with_overrides(mut self, overrides: &ModeOverrides) -> Self {
        if let Some(width) = overrides.capture_width {
            self.capture.width = width;
        }
        if let Some(height) = overrides.capture_height {
            self.capture.height = height;
        }
        if let Some(ms) = overrides.frame_interval_ms {
            self.frame_interval = Duration::from_millis(ms);
        }
        if let Some(smoothing) = overrides.smoothing {
            self.smoothing = smoothing;
        }
        if let Some(boost) = overrides.saturation_boost {
            self.saturation_boost = boost;
        }
        if let Some([lo, hi]) = overrides.hue_boost_range {
            self.hue_boost.range = (lo, hi);
        }
        if let Some(multiplier) = overrides.hue_boost_multiplier {
            self.hue_boost.multiplier = multiplier;
        }
        if let Some(gain) = overrides.gain {
            self.gain = gain;
        }
        if let Some(floor) = overrides.brightness_floor {
            self.brightness.floor = floor;
        }
        if let Some(span) = overrides.brightness_span {
            self.brightness.span = span;
        }
        if let Some(gamma) = overrides.value_gamma {
            self.value_gamma = Some(gamma);
        }
        if let Some(fraction) = overrides.center_fraction {
            self.region = RegionPolicy::Center { fraction };
        }
        if let Some(center_bias) = overrides.center_bias {
            self.weighting = Weighting::Radial { center_bias };
        }
        if let Some(reactive_alpha) = overrides.reactive_alpha {
            self.pre_blend = Some(PreBlend { reactive_alpha });
        }
        self
    }

    /// Check the profile invariants
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| {
            Err(CoreError::InvalidProfile {
                mode: self.mode,
                reason,
            })
        };

        if self.capture.is_empty() {
            return fail(format!(
                "capture resolution must be non-zero, got {}x{}",
                self.capture.width, self.capture.height
            ));
        }
        if !unit_interval(self.smoothing) {
            return fail(format!("smoothing must be in [0, 1], got {}", self.smoothing));
        }
        if !(self.saturation_boost.is_finite() && self.saturation_boost >= 0.0) {
            return fail(format!(
                "saturation boost must be >= 0, got {}",
                self.saturation_boost
            ));
        }
        let (lo, hi) = self.hue_boost.range;
        if !(lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi && hi < 1.0) {
            return fail(format!(
                "hue boost range must be a sub-interval of [0, 1), got ({}, {})",
                lo, hi
            ));
        }
        if !(self.hue_boost.multiplier.is_finite() && self.hue_boost.multiplier >= 0.0) {
            return fail(format!(
                "hue boost multiplier must be >= 0, got {}",
                self.hue_boost.multiplier
            ));
        }
        if let Some(g) = self.gain.iter().find(|g| !(g.is_finite() && **g > 0.0)) {
            return fail(format!("channel gains must be > 0, got {}", g));
        }
        if self.brightness.floor as u16 + self.brightness.span as u16 > 255 {
            return fail(format!(
                "brightness floor + span must not exceed 255, got {} + {}",
                self.brightness.floor, self.brightness.span
            ));
        }
        if let Some(gamma) = self.value_gamma {
            if !(gamma.is_finite() && gamma > 0.0) {
                return fail(format!("value gamma must be > 0, got {}", gamma));
            }
        }
        if let RegionPolicy::Center { fraction } = self.region {
            if !(fraction.is_finite() && fraction > 0.0 && fraction <= 1.0) {
                return fail(format!("center fraction must be in (0, 1], got {}", fraction));
            }
        }
        if let Weighting::Radial { center_bias } = self.weighting {
            if !(center_bias.is_finite() && center_bias > 0.0) {
                return fail(format!("center bias must be > 0, got {}", center_bias));
            }
        }
        if let Some(blend) = self.pre_blend {
            if !unit_interval(blend.reactive_alpha) {
                return fail(format!(
                    "reactive alpha must be in [0, 1], got {}",
                    blend.reactive_alpha
                ));
            }
        }
        Ok(())
    }
}

fn unit_interval(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

impl fmt::Display for ModeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.mode)?;
        if !self.mode.is_visual() {
            return writeln!(f, "  (spectrum driven; visual tunables unused)");
        }
        writeln!(f, "  capture          {}x{}", self.capture.width, self.capture.height)?;
        writeln!(f, "  frame interval   {} ms", self.frame_interval.as_millis())?;
        writeln!(f, "  smoothing        {}", self.smoothing)?;
        writeln!(f, "  saturation boost {}", self.saturation_boost)?;
        writeln!(
            f,
            "  hue boost        {:.2}..{:.2} x{}",
            self.hue_boost.range.0, self.hue_boost.range.1, self.hue_boost.multiplier
        )?;
        writeln!(
            f,
            "  gain             r={} g={} b={}",
            self.gain[0], self.gain[1], self.gain[2]
        )?;
        let (lo, hi) = self.brightness.range();
        writeln!(f, "  brightness       {}..{}", lo, hi)?;
        if let Some(gamma) = self.value_gamma {
            writeln!(f, "  value gamma      {}", gamma)?;
        }
        match self.region {
            RegionPolicy::Full => writeln!(f, "  region           full")?,
            RegionPolicy::Center { fraction } => {
                writeln!(f, "  region           center {}%", fraction * 100.0)?
            }
        }
        match self.weighting {
            Weighting::Uniform => writeln!(f, "  weighting        uniform")?,
            Weighting::Radial { center_bias } => {
                writeln!(f, "  weighting        radial (bias {})", center_bias)?
            }
        }
        if let Some(blend) = self.pre_blend {
            writeln!(f, "  pre-blend        alpha {}", blend.reactive_alpha)?;
        }
        Ok(())
    }
}

/// Optional per-mode overrides, typically read from a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModeOverrides {
    /// Subsample grid width
    pub capture_width: Option<u32>,
    /// Subsample grid height
    pub capture_height: Option<u32>,
    /// Loop interval in milliseconds
    pub frame_interval_ms: Option<u64>,
    /// Output smoothing factor
    pub smoothing: Option<f64>,
    /// Saturation multiplier
    pub saturation_boost: Option<f64>,
    /// Boosted hue interval `[lo, hi]`
    pub hue_boost_range: Option<[f64; 2]>,
    /// Saturation multiplier inside the hue interval
    pub hue_boost_multiplier: Option<f64>,
    /// Channel gains `[r, g, b]`
    pub gain: Option<[f64; 3]>,
    /// Dimming at value 0
    pub brightness_floor: Option<u8>,
    /// Dimming added at value 1
    pub brightness_span: Option<u8>,
    /// Value exponent
    pub value_gamma: Option<f64>,
    /// Switch to a center crop of this fraction
    pub center_fraction: Option<f64>,
    /// Switch to radial weighting with this bias
    pub center_bias: Option<f64>,
    /// Enable the linear pre-blend with this alpha
    pub reactive_alpha: Option<f64>,
}

/// Strategy table: one validated profile per mode
#[derive(Debug, Clone)]
pub struct ModeProfiles {
    profiles: HashMap<Mode, ModeProfile>,
}

impl ModeProfiles {
    /// Built-in profiles for every mode
    pub fn defaults() -> Self {
        Self {
            profiles: Mode::ALL
                .iter()
                .map(|&mode| (mode, ModeProfile::defaults(mode)))
                .collect(),
        }
    }

    /// Built-in profiles with overrides applied, then validated
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (Mode, &'a ModeOverrides)>,
    ) -> Result<Self> {
        let mut table = Self::defaults();
        for (mode, o) in overrides {
            let profile = ModeProfile::defaults(mode).with_overrides(o);
            table.profiles.insert(mode, profile);
        }
        for mode in Mode::ALL {
            table.get(mode).validate()?;
        }
        Ok(table)
    }

    /// Profile for a mode
    pub fn get(&self, mode: Mode) -> &ModeProfile {
        // Every mode is inserted on construction
        &self.profiles[&mode]
    }

    /// Profiles in [`Mode::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = &ModeProfile> {
        Mode::ALL.iter().map(move |mode| self.get(*mode))
    }
}

impl Default for ModeProfiles {
    fn default() -> Self {
        Self::defaults()
    }
}
