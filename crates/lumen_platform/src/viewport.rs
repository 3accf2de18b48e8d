//! Viewport intersection
//!
//! Hosts observe containers (scroll position, layout changes) and report how
//! much of each container is visible. Reveal and counter controllers trigger
//! on these reports.

use std::fmt;

use lumen_core::Rect;

/// Host-assigned identifier of an observed container
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

impl From<u64> for ContainerId {
    fn from(id: u64) -> Self {
        ContainerId(id)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

/// A container's visibility changed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEvent {
    pub container: ContainerId,
    /// Fraction of the container's area inside the viewport, in `[0, 1]`
    pub visible_fraction: f32,
}

impl IntersectionEvent {
    pub fn new(container: impl Into<ContainerId>, visible_fraction: f32) -> Self {
        Self {
            container: container.into(),
            visible_fraction: visible_fraction.clamp(0.0, 1.0),
        }
    }

    /// Build an event from layout rectangles
    pub fn from_rects(container: impl Into<ContainerId>, bounds: Rect, viewport: Rect) -> Self {
        Self::new(container, visible_fraction(bounds, viewport))
    }
}

/// Fraction of `container`'s area that lies inside `viewport`
///
/// A zero-area container counts as fully visible once its origin is inside
/// the viewport, so empty sections still trigger.
pub fn visible_fraction(container: Rect, viewport: Rect) -> f32 {
    let area = container.area();
    if area <= 0.0 {
        return if viewport.contains(container.origin) {
            1.0
        } else {
            0.0
        };
    }

    container
        .intersection(&viewport)
        .map(|overlap| (overlap.area() / area).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}
