//! Input event types for pointer, keyboard and focus

use lumen_core::Point;

/// Input events delivered to interactive components
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer (mouse, pen or single touch) event
    Pointer(PointerEvent),
    /// Keyboard event
    Keyboard(KeyboardEvent),
    /// Focus moved into or out of the component's subtree
    Focus(FocusEvent),
}

// ============================================================================
// Pointer Events
// ============================================================================

/// Pointer events in component-local coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved over the component
    Entered,
    /// Pointer left the component
    Left,
    /// Primary button pressed / finger down
    Pressed {
        /// X position when pressed
        x: f32,
        /// Y position when pressed
        y: f32,
    },
    /// Pointer moved while over the component
    Moved {
        /// X position
        x: f32,
        /// Y position
        y: f32,
    },
    /// Primary button released / finger up
    Released {
        /// X position when released
        x: f32,
        /// Y position when released
        y: f32,
    },
    /// The platform cancelled the gesture (e.g. by a system gesture)
    Cancelled,
}

impl PointerEvent {
    /// Get the position (returns None for events without coordinates)
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Pressed { x, y }
            | PointerEvent::Moved { x, y }
            | PointerEvent::Released { x, y } => Some(Point::new(*x, *y)),
            PointerEvent::Entered | PointerEvent::Left | PointerEvent::Cancelled => None,
        }
    }
}

// ============================================================================
// Keyboard Events
// ============================================================================

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed or released
    pub key: Key,
    /// Whether the key was pressed or released
    pub state: KeyState,
    /// Modifier keys held during this event
    pub modifiers: Modifiers,
}

impl KeyboardEvent {
    /// A key press with no modifiers
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
        }
    }
}

/// Key press/release state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key was pressed
    Pressed,
    /// Key was released
    Released,
}

/// Modifier key state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift key is held
    pub shift: bool,
    /// Control key is held
    pub ctrl: bool,
    /// Alt key is held (Option on macOS)
    pub alt: bool,
    /// Meta key is held (Command on macOS, Windows key on Windows)
    pub meta: bool,
}

impl Modifiers {
    /// Check if no modifiers are held
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt && !self.meta
    }

    /// Ctrl, Alt or Meta held (shortcut chords belong to the host)
    pub fn has_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Key codes the motion components care about
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    // Arrow keys
    Left,
    Right,
    Up,
    Down,

    // Special keys
    Space,
    Enter,
    Escape,
    Tab,
    Home,
    End,

    // Character input
    Char(char),

    // Unknown key
    Unknown,
}

// ============================================================================
// Focus Events
// ============================================================================

/// Focus changes for a component subtree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusEvent {
    /// The component or one of its descendants gained focus
    Entered,
    /// Focus moved outside the component
    Left,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_position() {
        assert_eq!(
            PointerEvent::Pressed { x: 10.0, y: 4.0 }.position(),
            Some(Point::new(10.0, 4.0))
        );
        assert_eq!(PointerEvent::Left.position(), None);
    }

    #[test]
    fn test_modifiers() {
        assert!(Modifiers::default().is_empty());
        let shift = Modifiers {
            shift: true,
            ..Default::default()
        };
        assert!(!shift.has_command());
        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        assert!(ctrl.has_command());
    }
}
