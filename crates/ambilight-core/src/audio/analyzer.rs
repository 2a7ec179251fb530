//! Block FFT
//!
//! A plain real-input transform over one block with no window and no
//! overlap. Only the non-negative frequency half is kept.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Magnitude spectrum of one block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    /// `|X[k]|` for `k = 0..=n/2`
    pub magnitudes: Vec<f32>,
    /// Center frequency of each bin in Hz, `k * sample_rate / n`
    pub frequencies: Vec<f32>,
}

impl Spectrum {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.magnitudes.len().min(self.frequencies.len())
    }

    /// True if there are no bins
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(frequency, magnitude)` pairs
    pub fn bins(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
    }
}

/// FFT analyzer for fixed-size mono blocks
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    block_size: usize,
    sample_rate: u32,
    frequencies: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("block_size", &self.block_size)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl SpectrumAnalyzer {
    /// Plan a transform for blocks of `block_size` samples at `sample_rate`
    ///
    /// A zero block size is raised to one.
    pub fn new(block_size: usize, sample_rate: u32) -> Self {
        let block_size = block_size.max(1);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(block_size);
        let scratch_len = fft.get_inplace_scratch_len();

        let frequencies = (0..=block_size / 2)
            .map(|k| (k as f64 * sample_rate as f64 / block_size as f64) as f32)
            .collect();

        debug!(
            "SpectrumAnalyzer created: sample_rate={}, block_size={}",
            sample_rate, block_size
        );

        Self {
            fft,
            block_size,
            sample_rate,
            frequencies,
            buffer: vec![Complex::new(0.0, 0.0); block_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    /// Samples per block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bin frequencies in Hz
    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    /// Transform one block
    ///
    /// Short blocks are zero padded and long ones truncated. Non-finite
    /// samples count as silence.
    pub fn analyze(&mut self, samples: &[f32]) -> Spectrum {
        if samples.len() != self.block_size {
            trace!(
                "block of {} samples resized to {}",
                samples.len(),
                self.block_size
            );
        }

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = samples.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(if s.is_finite() { s } else { 0.0 }, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let magnitudes = self.buffer[..self.frequencies.len()]
            .iter()
            .map(|c| c.norm())
            .collect();

        Spectrum {
            magnitudes,
            frequencies: self.frequencies.clone(),
        }
    }
}
