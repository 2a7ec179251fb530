//! Spectrum to color
//!
//! Bass drives red, mids green and treble blue. Each band value is the mean
//! magnitude of the bins whose frequency falls in it; the three are then
//! normalized by their sum.

use super::analyzer::Spectrum;
use crate::command::ColorCommand;
use std::ops::Range;

/// Bass band, Hz
pub const LOW_BAND: Range<f32> = 20.0..250.0;
/// Mid band, Hz
pub const MID_BAND: Range<f32> = 250.0..2_000.0;
/// Treble band, Hz
pub const HIGH_BAND: Range<f32> = 2_000.0..8_000.0;

const SILENCE_EPSILON: f64 = 1e-6;

/// Mean magnitudes of the three bands of one block
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectrumBands {
    /// 20 Hz to 250 Hz
    pub low: f64,
    /// 250 Hz to 2 kHz
    pub mid: f64,
    /// 2 kHz to 8 kHz
    pub high: f64,
}

impl SpectrumBands {
    /// Split a spectrum into bands
    ///
    /// Bins outside every band are ignored and an empty band is zero.
    pub fn from_spectrum(spectrum: &Spectrum) -> Self {
        let mut sums = [0.0f64; 3];
        let mut counts = [0usize; 3];

        for (freq, magnitude) in spectrum.bins() {
            let band = if LOW_BAND.contains(&freq) {
                0
            } else if MID_BAND.contains(&freq) {
                1
            } else if HIGH_BAND.contains(&freq) {
                2
            } else {
                continue;
            };
            let magnitude = if magnitude.is_finite() {
                magnitude.max(0.0)
            } else {
                0.0
            };
            sums[band] += magnitude as f64;
            counts[band] += 1;
        }

        let mean = |i: usize| {
            if counts[i] == 0 {
                0.0
            } else {
                sums[i] / counts[i] as f64
            }
        };

        Self {
            low: mean(0),
            mid: mean(1),
            high: mean(2),
        }
    }

    /// `low + mid + high`
    pub fn total(&self) -> f64 {
        self.low + self.mid + self.high
    }
}

/// Maps band energies to an RGB share of full scale
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralColorMapper;

impl SpectralColorMapper {
    /// Create a mapper
    pub fn new() -> Self {
        Self
    }

    /// `255 * band / (low + mid + high + eps)` per channel, truncated
    ///
    /// Silence maps to black.
    pub fn map_bands(&self, bands: SpectrumBands) -> [u8; 3] {
        let total = bands.total() + SILENCE_EPSILON;
        [bands.low, bands.mid, bands.high]
            .map(|band| (255.0 * band / total).clamp(0.0, 255.0) as u8)
    }

    /// Color of one spectrum
    pub fn map(&self, spectrum: &Spectrum) -> [u8; 3] {
        self.map_bands(SpectrumBands::from_spectrum(spectrum))
    }

    /// Command for one spectrum at a caller-chosen dimming
    pub fn command(&self, spectrum: &Spectrum, brightness: u8) -> ColorCommand {
        ColorCommand::new(self.map(spectrum), brightness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SpectrumAnalyzer;
    use std::f32::consts::PI;

    fn spectrum(bins: &[(f32, f32)]) -> Spectrum {
        Spectrum {
            frequencies: bins.iter().map(|b| b.0).collect(),
            magnitudes: bins.iter().map(|b| b.1).collect(),
        }
    }

    #[test]
    fn test_band_means() {
        let s = spectrum(&[
            (10.0, 50.0),
            (100.0, 2.0),
            (200.0, 4.0),
            (1_000.0, 3.0),
            (3_000.0, 1.0),
            (9_000.0, 100.0),
        ]);
        let bands = SpectrumBands::from_spectrum(&s);
        assert_eq!(bands.low, 3.0);
        assert_eq!(bands.mid, 3.0);
        assert_eq!(bands.high, 1.0);

        // 255 * 3 / 7 = 109.28, 255 / 7 = 36.43
        assert_eq!(SpectralColorMapper::new().map(&s), [109, 109, 36]);
    }

    #[test]
    fn test_band_edges_are_half_open() {
        let s = spectrum(&[(20.0, 1.0), (250.0, 2.0), (2_000.0, 4.0), (8_000.0, 8.0)]);
        let bands = SpectrumBands::from_spectrum(&s);
        assert_eq!((bands.low, bands.mid, bands.high), (1.0, 2.0, 4.0));
    }

    #[test]
    fn test_silence_is_black() {
        let s = spectrum(&[(100.0, 0.0), (1_000.0, 0.0), (4_000.0, 0.0)]);
        assert_eq!(SpectralColorMapper::new().map(&s), [0, 0, 0]);
        assert_eq!(SpectralColorMapper::new().map(&Spectrum::default()), [0, 0, 0]);
    }

    #[test]
    fn test_empty_bands_count_as_zero() {
        let s = spectrum(&[(1_000.0, 5.0)]);
        assert_eq!(SpectralColorMapper::new().map(&s), [0, 254, 0]);
    }

    #[test]
    fn test_tones_pick_their_channel() {
        let n = 1024;
        let mut analyzer = SpectrumAnalyzer::new(n, 44_100);
        let tone = |bin: usize| -> Vec<f32> {
            (0..n)
                .map(|i| (2.0 * PI * bin as f32 * i as f32 / n as f32).sin())
                .collect()
        };
        let mapper = SpectralColorMapper::new();

        // Bin 4 ~ 172 Hz, bin 20 ~ 861 Hz, bin 116 ~ 4996 Hz
        let [r, g, b] = mapper.map(&analyzer.analyze(&tone(4)));
        assert!(r >= 250 && g <= 2 && b <= 2, "{r} {g} {b}");
        let [r, g, b] = mapper.map(&analyzer.analyze(&tone(20)));
        assert!(g >= 250 && r <= 2 && b <= 2, "{r} {g} {b}");
        let [r, g, b] = mapper.map(&analyzer.analyze(&tone(116)));
        assert!(b >= 250 && r <= 2 && g <= 2, "{r} {g} {b}");
    }

    #[test]
    fn test_command_carries_fixed_brightness() {
        let s = spectrum(&[(100.0, 1.0)]);
        let cmd = SpectralColorMapper::new().command(&s, 200);
        assert_eq!(cmd.brightness, 200);
        assert_eq!(cmd.r, 254);
    }
}
