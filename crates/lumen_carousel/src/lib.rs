//! Lumen Carousel
//!
//! A slide carousel whose navigation is an explicit state machine:
//!
//! - **Transition lock**: one slide change in flight at a time; competing input is dropped
//! - **Autoplay**: advances after an idle interval, held while hovered, dragged or paused
//! - **Drag**: horizontal swipes past a threshold via [`DragGesture`]
//! - **Keyboard**: arrow keys while focus is inside the carousel
//! - **Progress**: an indicator derived from the autoplay timer
//!
//! # Example
//!
//! ```rust
//! use lumen_carousel::{Direction, SliderConfig, SliderStateMachine};
//! use lumen_core::Point;
//!
//! let mut slider = SliderStateMachine::new(4, SliderConfig::default());
//!
//! slider.pointer_down(Point::new(300.0, 40.0));
//! let change = slider.pointer_up(Point::new(220.0, 40.0)).unwrap();
//! assert_eq!((change.index, change.direction), (1, Direction::Next));
//!
//! // Still transitioning: dropped, not queued
//! assert!(slider.go_prev().is_none());
//! ```

pub mod gesture;
pub mod progress;
pub mod slider;

pub use gesture::{classify, DragGesture, DragOutcome};
pub use progress::AutoplayTimer;
pub use slider::{
    Direction, NavigationSource, SlideChange, Slider, SliderConfig, SliderSnapshot,
    SliderStateMachine,
};
