//! Motion configuration
//!
//! Timing constants live in a `lumen.toml` style file so they can be tuned
//! without recompiling. Every field has a default, so an empty file is valid:
//!
//! ```toml
//! [reveal]
//! stagger_ms = 80
//! threshold = 0.15
//!
//! [slider]
//! transition_ms = 700
//! autoplay_ms = 5000
//! swipe_threshold = 50.0
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::{Error, Result};

/// Complete motion configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    pub reveal: RevealConfig,
    pub counter: CounterConfig,
    pub ambient: AmbientConfig,
    pub hover: HoverConfig,
    pub slider: SliderSection,
}

/// Entrance reveal timing
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Delay between consecutive targets (ms)
    pub stagger_ms: u32,
    /// Visible fraction of the container that triggers the entrance
    pub threshold: f32,
    /// Initial downward offset of each target
    pub start_offset: f32,
    /// Duration of a single target's entrance (ms)
    pub duration_ms: u32,
    pub easing: Easing,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            stagger_ms: 80,
            threshold: 0.15,
            start_offset: 24.0,
            duration_ms: 600,
            easing: Easing::EaseOutCubic,
        }
    }
}

/// Numeric counter timing
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CounterConfig {
    pub duration_ms: u32,
    pub threshold: f32,
    pub easing: Easing,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1800,
            threshold: 0.3,
            easing: Easing::EaseOutCubic,
        }
    }
}

/// Default periods for ambient loops
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub breathe_period_ms: u32,
    pub breathe_baseline: f32,
    pub breathe_peak: f32,
    pub orbit_period_ms: u32,
    pub streak_period_ms: u32,
    /// Fraction of each streak cycle spent parked between sweeps
    pub streak_pause_fraction: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            breathe_period_ms: 4000,
            breathe_baseline: 1.0,
            breathe_peak: 1.06,
            orbit_period_ms: 20_000,
            streak_period_ms: 6000,
            streak_pause_fraction: 0.6,
        }
    }
}

/// Hover/focus micro-interaction timing
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HoverConfig {
    pub duration_ms: u32,
    pub easing: Easing,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            easing: Easing::EaseOutCubic,
        }
    }
}

/// Carousel timing and gesture tuning
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SliderSection {
    /// Lock window for a slide transition (ms)
    pub transition_ms: u32,
    /// Time since the last slide change before autoplay advances (ms)
    pub autoplay_ms: u32,
    /// Horizontal drag distance that counts as a swipe
    pub swipe_threshold: f32,
    /// Whether autoplay starts enabled
    pub autoplay: bool,
}

impl Default for SliderSection {
    fn default() -> Self {
        Self {
            transition_ms: 700,
            autoplay_ms: 5000,
            swipe_threshold: 50.0,
            autoplay: true,
        }
    }
}

/// Milliseconds to `Duration`
pub fn ms(value: u32) -> Duration {
    Duration::from_millis(value as u64)
}

impl MotionConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: MotionConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("Loaded motion config from {}", path.display());
        Ok(config)
    }

    /// Reject values the controllers cannot honour
    pub fn validate(&self) -> Result<()> {
        unit_range("reveal.threshold", self.reveal.threshold)?;
        unit_range("counter.threshold", self.counter.threshold)?;
        non_negative("reveal.start_offset", self.reveal.start_offset)?;
        non_negative("slider.swipe_threshold", self.slider.swipe_threshold)?;

        if self.slider.autoplay_ms == 0 {
            return Err(Error::Invalid {
                field: "slider.autoplay_ms",
                reason: "autoplay interval must be greater than zero".to_string(),
            });
        }

        let pause = self.ambient.streak_pause_fraction;
        if !(0.0..1.0).contains(&pause) {
            return Err(Error::Invalid {
                field: "ambient.streak_pause_fraction",
                reason: format!("{} is outside [0, 1)", pause),
            });
        }

        for (field, period) in [
            ("ambient.breathe_period_ms", self.ambient.breathe_period_ms),
            ("ambient.orbit_period_ms", self.ambient.orbit_period_ms),
            ("ambient.streak_period_ms", self.ambient.streak_period_ms),
        ] {
            if period == 0 {
                return Err(Error::Invalid {
                    field,
                    reason: "loop period must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn unit_range(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Invalid {
            field,
            reason: format!("{} is outside [0, 1]", value),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Invalid {
            field,
            reason: format!("{} is negative", value),
        })
    }
}
