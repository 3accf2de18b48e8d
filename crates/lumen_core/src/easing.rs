//! Easing functions for animation interpolation.
//!
//! Every curve maps `[0, 1]` onto `[0, 1]` with `f(0) = 0` and `f(1) = 1`.
//! Input outside the unit range is clamped.

use serde::{Deserialize, Serialize};

/// Easing curve variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-in (slow start, fast end).
    EaseInQuad,
    /// Quadratic ease-out (fast start, slow end).
    EaseOutQuad,
    /// Cubic ease-in.
    EaseInCubic,
    /// Cubic ease-out. Used for entrances and counters.
    #[default]
    EaseOutCubic,
    /// Cubic ease-in-out.
    EaseInOutCubic,
    /// Sinusoidal ease-in-out. Symmetric, used for breathing loops.
    EaseInOutSine,
}

impl Easing {
    /// Evaluate the curve at `t`
    #[inline]
    pub fn apply(&self, t: f32) -> f32 {
        self.apply_f64(t as f64) as f32
    }

    /// Evaluate the curve at `t` in double precision (counters)
    #[inline]
    pub fn apply_f64(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let omt = 1.0 - t;
                1.0 - omt * omt * omt
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
            Easing::EaseInOutSine => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInOutSine,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_input_clamping() {
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
        assert_eq!(Easing::EaseOutCubic.apply_f64(2.0), 1.0);
    }

    #[test]
    fn test_ease_out_cubic_shape() {
        // 1 - 0.5^3
        assert_eq!(Easing::EaseOutCubic.apply(0.5), 0.875);
        assert!(Easing::EaseOutCubic.apply(0.25) > 0.25);
    }

    #[test]
    fn test_in_out_curves_are_symmetric() {
        for easing in [Easing::EaseInOutCubic, Easing::EaseInOutSine] {
            let a = easing.apply(0.3);
            let b = easing.apply(0.7);
            assert!((a + b - 1.0).abs() < 1e-5, "{easing:?}");
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut last = 0.0;
            for i in 0..=100 {
                let v = easing.apply_f64(i as f64 / 100.0);
                assert!(v >= last, "{easing:?} not monotonic at step {i}");
                last = v;
            }
        }
    }

    #[test]
    fn test_single_and_double_precision_agree() {
        for easing in ALL {
            for step in 0..=20 {
                let t = step as f32 / 20.0;
                let single = easing.apply(t);
                let double = easing.apply_f64(t as f64);
                assert!((single as f64 - double).abs() < 1e-6, "{easing:?} at {t}");
            }
        }
    }
}
