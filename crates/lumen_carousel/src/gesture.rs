//! Horizontal drag detection
//!
//! ```text
//! Idle --press--> Dragging --release--> Swiped(direction) | Cancelled
//!                     |
//!                     +--leave/cancel--> Cancelled
//! ```
//!
//! Outcomes are returned to the caller and the gesture goes back to `Idle`,
//! so the origin never outlives the drag.

use lumen_core::Point;

use crate::slider::Direction;

/// How a drag ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    /// Travelled past the threshold
    Swiped(Direction),
    /// Released short of the threshold, or interrupted
    Cancelled,
}

/// Drag gesture state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragGesture {
    #[default]
    Idle,
    Dragging {
        origin: Point,
    },
}

impl DragGesture {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragGesture::Dragging { .. })
    }

    /// Where the current drag started
    pub fn origin(&self) -> Option<Point> {
        match self {
            DragGesture::Dragging { origin } => Some(*origin),
            DragGesture::Idle => None,
        }
    }

    /// Pointer down; a press during a drag restarts it
    pub fn press(&mut self, at: Point) {
        *self = DragGesture::Dragging { origin: at };
    }

    /// Pointer up. Returns `None` when no drag was in progress.
    pub fn release(&mut self, at: Point, threshold: f32) -> Option<DragOutcome> {
        let origin = self.origin()?;
        *self = DragGesture::Idle;

        let outcome = match classify(at.x - origin.x, threshold) {
            Some(direction) => DragOutcome::Swiped(direction),
            None => DragOutcome::Cancelled,
        };
        Some(outcome)
    }

    /// Pointer left or the platform cancelled. Returns `None` when idle.
    pub fn cancel(&mut self) -> Option<DragOutcome> {
        self.origin()?;
        *self = DragGesture::Idle;
        Some(DragOutcome::Cancelled)
    }
}

/// Map a horizontal travel to a navigation direction
///
/// Dragging left (negative) pulls in the next slide. The travel has to be
/// strictly beyond the threshold; a non-finite travel is never a swipe.
pub fn classify(delta: f32, threshold: f32) -> Option<Direction> {
    if !delta.is_finite() || delta.abs() <= threshold {
        None
    } else if delta < 0.0 {
        Some(Direction::Next)
    } else {
        Some(Direction::Prev)
    }
}
