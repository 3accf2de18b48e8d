//! One-shot viewport gate
//!
//! Reveals and counters start the first time their container becomes
//! sufficiently visible and never re-arm afterwards.

/// Fires once, on the first observation at or above the threshold
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportGate {
    threshold: f32,
    fired: bool,
}

impl ViewportGate {
    /// Create a gate; thresholds outside `[0, 1]` are clamped with a warning
    pub fn new(threshold: f32) -> Self {
        let clamped = if threshold.is_nan() {
            0.0
        } else {
            threshold.clamp(0.0, 1.0)
        };
        if clamped != threshold {
            tracing::warn!(
                "Viewport threshold {} outside [0, 1]; using {}",
                threshold,
                clamped
            );
        }
        Self {
            threshold: clamped,
            fired: false,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Feed a visibility observation. Returns true exactly once.
    pub fn observe(&mut self, visible_fraction: f32) -> bool {
        if self.fired || visible_fraction < self.threshold {
            return false;
        }
        // A zero threshold still needs the container to be on screen
        if self.threshold == 0.0 && visible_fraction <= 0.0 {
            return false;
        }
        self.fired = true;
        true
    }

    /// Mark as fired without an observation (reduced motion settles early)
    pub fn disarm(&mut self) {
        self.fired = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let mut gate = ViewportGate::new(0.2);
        assert!(!gate.observe(0.1));
        assert!(gate.observe(0.2));
        assert!(!gate.observe(0.0));
        assert!(!gate.observe(1.0));
        assert!(gate.has_fired());
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(ViewportGate::new(1.5).threshold(), 1.0);
        assert_eq!(ViewportGate::new(-0.5).threshold(), 0.0);
        assert_eq!(ViewportGate::new(f32::NAN).threshold(), 0.0);
    }

    #[test]
    fn test_zero_threshold_requires_visibility() {
        let mut gate = ViewportGate::new(0.0);
        assert!(!gate.observe(0.0));
        assert!(gate.observe(0.01));
    }

    #[test]
    fn test_disarm() {
        let mut gate = ViewportGate::new(0.5);
        gate.disarm();
        assert!(!gate.observe(1.0));
    }
}
