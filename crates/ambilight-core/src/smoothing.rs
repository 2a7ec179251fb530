//! Exponential smoothing of emitted colors

use crate::color::quantize;

/// Last emitted RGB of a running session
///
/// Starts unset so the first frame passes through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothingState {
    last: Option<[u8; 3]>,
}

impl SmoothingState {
    /// Fresh, unset state
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a value has been emitted
    pub fn is_set(&self) -> bool {
        self.last.is_some()
    }

    /// Last emitted RGB, if any
    pub fn last(&self) -> Option<[u8; 3]> {
        self.last
    }

    /// Forget the last emitted value
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Per-channel EMA: `floor(previous * alpha + candidate * (1 - alpha))`
///
/// Higher `alpha` is smoother and slower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalSmoother {
    alpha: f64,
}

impl TemporalSmoother {
    /// Create a smoother; `alpha` is clamped to [0, 1]
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        Self { alpha }
    }

    /// Smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Smooth a candidate against `state` and record the emitted value
    pub fn smooth(&self, candidate: [u8; 3], state: &mut SmoothingState) -> [u8; 3] {
        let emitted = match state.last {
            None => candidate,
            Some(previous) => {
                let mut out = [0u8; 3];
                for ((o, p), c) in out.iter_mut().zip(previous).zip(candidate) {
                    *o = quantize(p as f64 * self.alpha + c as f64 * (1.0 - self.alpha));
                }
                out
            }
        };
        state.last = Some(emitted);
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_bypasses_smoothing() {
        let smoother = TemporalSmoother::new(0.9);
        let mut state = SmoothingState::new();
        assert!(!state.is_set());
        assert_eq!(smoother.smooth([10, 200, 33], &mut state), [10, 200, 33]);
        assert_eq!(state.last(), Some([10, 200, 33]));
    }

    #[test]
    fn test_blend_formula() {
        let smoother = TemporalSmoother::new(0.65);
        let mut state = SmoothingState::new();
        smoother.smooth([100, 0, 255], &mut state);
        // 100*0.65 + 200*0.35 = 135, 0*0.65 + 100*0.35 = 35, 255*0.65 + 0 = 165.75
        assert_eq!(smoother.smooth([200, 100, 0], &mut state), [135, 35, 165]);
    }

    #[test]
    fn test_state_holds_emitted_value() {
        let smoother = TemporalSmoother::new(0.5);
        let mut state = SmoothingState::new();
        smoother.smooth([0, 0, 0], &mut state);
        let out = smoother.smooth([255, 255, 255], &mut state);
        assert_eq!(state.last(), Some(out));
        assert_ne!(out, [255, 255, 255]);
    }

    #[test]
    fn test_alpha_zero_follows_input() {
        let smoother = TemporalSmoother::new(0.0);
        let mut state = SmoothingState::new();
        smoother.smooth([1, 2, 3], &mut state);
        assert_eq!(smoother.smooth([250, 128, 7], &mut state), [250, 128, 7]);
    }

    #[test]
    fn test_steady_input_is_fixed_point() {
        for alpha in [0.0, 0.3, 0.65, 0.99] {
            let smoother = TemporalSmoother::new(alpha);
            let mut state = SmoothingState::new();
            for _ in 0..10 {
                assert_eq!(smoother.smooth([255, 77, 1], &mut state), [255, 77, 1]);
            }
        }
    }

    #[test]
    fn test_converges_from_above_exactly() {
        for alpha in [0.3, 0.65, 0.9] {
            let smoother = TemporalSmoother::new(alpha);
            let mut state = SmoothingState::new();
            smoother.smooth([255, 255, 255], &mut state);
            let mut out = [0; 3];
            for _ in 0..500 {
                out = smoother.smooth([40, 40, 40], &mut state);
            }
            assert_eq!(out, [40, 40, 40], "alpha={alpha}");
        }
    }

    #[test]
    fn test_converges_from_below_within_floor_dead_band() {
        // Rising values stall once the step falls below one unit; the gap left
        // is bounded by 1 / (1 - alpha)
        for alpha in [0.3, 0.65, 0.9] {
            let smoother = TemporalSmoother::new(alpha);
            let mut state = SmoothingState::new();
            smoother.smooth([0, 0, 0], &mut state);
            let mut out = [0; 3];
            for _ in 0..500 {
                out = smoother.smooth([200, 200, 200], &mut state);
            }
            let gap = 200.0 - out[0] as f64;
            assert!(gap >= 0.0 && gap < 1.0 / (1.0 - alpha), "alpha={alpha} out={out:?}");
        }
    }

    #[test]
    fn test_reset_restores_bypass() {
        let smoother = TemporalSmoother::new(0.65);
        let mut state = SmoothingState::new();
        smoother.smooth([0, 0, 0], &mut state);
        state.reset();
        assert_eq!(smoother.smooth([99, 99, 99], &mut state), [99, 99, 99]);
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(TemporalSmoother::new(4.0).alpha(), 1.0);
        assert_eq!(TemporalSmoother::new(-1.0).alpha(), 0.0);
        assert_eq!(TemporalSmoother::new(f64::NAN).alpha(), 0.0);
    }
}
