//! Lumen Core
//!
//! Foundational types shared by the Lumen motion crates:
//!
//! - **Geometry**: `Point`, `Size`, `Rect` and the decomposed `Transform`
//! - **Animatable**: the capability interface every visual target implements
//! - **Easing**: interpolation curves
//! - **MotionPreference**: the reduced-motion signal every controller honours
//! - **Configuration**: TOML-backed timing constants
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{Animatable, MotionPreference, SharedTarget, Transform};
//!
//! let target = SharedTarget::new();
//! let mut boxed = target.boxed();
//! boxed.set_transform(Transform::translate(0.0, 24.0));
//!
//! assert_eq!(target.transform().translate_y, 24.0);
//! assert!(!MotionPreference::full_motion().query());
//! ```

pub mod animatable;
pub mod config;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod preference;

pub use animatable::{Animatable, BoxedTarget, SharedTarget, TargetState};
pub use config::{
    ms, AmbientConfig, CounterConfig, HoverConfig, MotionConfig, RevealConfig, SliderSection,
};
pub use easing::Easing;
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size, Transform};
pub use preference::{
    EnvPreference, MotionPreference, MotionPreferenceSource, SharedPreference, StaticPreference,
    REDUCED_MOTION_ENV,
};
