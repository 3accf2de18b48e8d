//! Lumen Platform Vocabulary
//!
//! Platform-agnostic event types consumed by the motion components:
//!
//! - [`InputEvent`] - pointer, keyboard and focus input for interactive components
//! - [`IntersectionEvent`] - how much of an observed container is on screen
//!
//! Hosts translate their native events (DOM, winit, terminal, ...) into these
//! types; nothing here depends on a rendering technology.

mod input;
pub mod viewport;

pub use input::{FocusEvent, InputEvent, Key, KeyState, KeyboardEvent, Modifiers, PointerEvent};
pub use viewport::{visible_fraction, ContainerId, IntersectionEvent};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::input::{
        FocusEvent, InputEvent, Key, KeyState, KeyboardEvent, Modifiers, PointerEvent,
    };
    pub use crate::viewport::{visible_fraction, ContainerId, IntersectionEvent};
}
