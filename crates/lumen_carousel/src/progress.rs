//! Autoplay timer and progress indicator

use std::time::Duration;

/// Time since the last slide change, capped at the autoplay interval
///
/// The progress bar reads straight from this timer: it freezes when the
/// timer is not advanced and restarts when the timer is reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoplayTimer {
    interval: Duration,
    elapsed: Duration,
}

impl AutoplayTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Accumulate `dt`; stays at the interval once reached
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.interval);
    }

    pub fn is_due(&self) -> bool {
        self.elapsed >= self.interval
    }

    /// Indicator fill in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.interval.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f32() / self.interval.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fills_and_caps() {
        let mut timer = AutoplayTimer::new(Duration::from_millis(1000));
        timer.advance(Duration::from_millis(250));
        assert!((timer.progress() - 0.25).abs() < 1e-6);
        assert!(!timer.is_due());

        timer.advance(Duration::from_millis(2000));
        assert_eq!(timer.elapsed(), Duration::from_millis(1000));
        assert_eq!(timer.progress(), 1.0);
        assert!(timer.is_due());
    }

    #[test]
    fn test_reset() {
        let mut timer = AutoplayTimer::new(Duration::from_millis(1000));
        timer.advance(Duration::from_millis(600));
        timer.reset();
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_zero_interval() {
        let timer = AutoplayTimer::new(Duration::ZERO);
        assert_eq!(timer.progress(), 0.0);
    }
}
