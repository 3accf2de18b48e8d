//! Reduced-motion preference
//!
//! Every controller consults a [`MotionPreference`] before scheduling work.
//! The preference reads an environment-level signal through a
//! [`MotionPreferenceSource`]. A source that cannot answer never fails the
//! caller: an unavailable signal means "motion enabled".

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Environment variable consulted by [`EnvPreference`]
pub const REDUCED_MOTION_ENV: &str = "LUMEN_REDUCED_MOTION";

/// Something that knows whether the user asked for reduced motion
pub trait MotionPreferenceSource {
    /// `Some(true)` when reduced motion is requested, `None` when unknown
    fn prefers_reduced_motion(&self) -> Option<bool>;
}

/// Fixed answer, for hosts that resolve the preference themselves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StaticPreference(pub bool);

impl MotionPreferenceSource for StaticPreference {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        Some(self.0)
    }
}

/// Reads [`REDUCED_MOTION_ENV`] on every query
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvPreference;

impl EnvPreference {
    /// Interpret a raw environment value
    pub fn parse(raw: &str) -> Option<bool> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "reduce" => Some(true),
            "0" | "false" | "no" | "no-preference" => Some(false),
            _ => None,
        }
    }
}

impl MotionPreferenceSource for EnvPreference {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        std::env::var(REDUCED_MOTION_ENV)
            .ok()
            .and_then(|raw| Self::parse(&raw))
    }
}

/// Host-owned cell, flipped from the host's own change listener
///
/// Clones share the same cell.
#[derive(Clone, Debug, Default)]
pub struct SharedPreference {
    value: Rc<Cell<Option<bool>>>,
}

impl SharedPreference {
    pub fn new(value: Option<bool>) -> Self {
        Self {
            value: Rc::new(Cell::new(value)),
        }
    }

    pub fn set(&self, value: Option<bool>) {
        self.value.set(value);
    }
}

impl MotionPreferenceSource for SharedPreference {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.value.get()
    }
}

/// The reduced-motion preference as seen by controllers
///
/// Cheap to clone; all clones read the same source.
#[derive(Clone)]
pub struct MotionPreference {
    source: Rc<dyn MotionPreferenceSource>,
    last: Rc<Cell<bool>>,
}

impl MotionPreference {
    pub fn new(source: impl MotionPreferenceSource + 'static) -> Self {
        let reduced = source.prefers_reduced_motion().unwrap_or(false);
        Self {
            source: Rc::new(source),
            last: Rc::new(Cell::new(reduced)),
        }
    }

    /// Full motion, regardless of environment
    pub fn full_motion() -> Self {
        Self::new(StaticPreference(false))
    }

    /// Reduced motion, regardless of environment
    pub fn reduced() -> Self {
        Self::new(StaticPreference(true))
    }

    /// Read from [`REDUCED_MOTION_ENV`]
    pub fn from_env() -> Self {
        Self::new(EnvPreference)
    }

    /// Whether reduced motion is requested. Unavailable signals read as `false`.
    pub fn query(&self) -> bool {
        self.source.prefers_reduced_motion().unwrap_or(false)
    }

    /// Re-read the source after an external change notification
    ///
    /// Returns `true` when the value differs from the previous refresh.
    pub fn refresh(&self) -> bool {
        let reduced = self.query();
        let changed = self.last.replace(reduced) != reduced;
        if changed {
            tracing::debug!("Motion preference changed: reduced_motion={}", reduced);
        }
        changed
    }
}

impl Default for MotionPreference {
    fn default() -> Self {
        Self::full_motion()
    }
}

impl fmt::Debug for MotionPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionPreference")
            .field("reduced_motion", &self.query())
            .finish()
    }
}
