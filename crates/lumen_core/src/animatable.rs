//! Animatable capability
//!
//! The motion system never touches a renderer directly. Anything that can
//! receive opacity, transform or text updates implements [`Animatable`] and is
//! handed to a controller at registration time.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::Transform;

/// A visual target the motion system can drive
pub trait Animatable {
    /// Set opacity in `[0, 1]`
    fn set_opacity(&mut self, opacity: f32);

    /// Set the visual transform
    fn set_transform(&mut self, transform: Transform);

    /// Set displayed text (counters). Targets without text ignore it.
    fn set_text(&mut self, _text: &str) {}
}

/// Boxed target as stored by controllers
pub type BoxedTarget = Box<dyn Animatable>;

impl<T: Animatable + ?Sized> Animatable for Box<T> {
    fn set_opacity(&mut self, opacity: f32) {
        (**self).set_opacity(opacity);
    }

    fn set_transform(&mut self, transform: Transform) {
        (**self).set_transform(transform);
    }

    fn set_text(&mut self, text: &str) {
        (**self).set_text(text);
    }
}

/// Last values written to a target
#[derive(Clone, Debug, PartialEq)]
pub struct TargetState {
    pub opacity: f32,
    pub transform: Transform,
    pub text: Option<String>,
    /// Number of writes received (any property)
    pub writes: usize,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transform: Transform::IDENTITY,
            text: None,
            writes: 0,
        }
    }
}

/// A target whose state can be read back by the host
///
/// Cloning shares the same underlying state, so one clone can be registered
/// with a controller while another is kept for inspection.
#[derive(Clone, Default)]
pub struct SharedTarget {
    state: Rc<RefCell<TargetState>>,
}

impl SharedTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> TargetState {
        self.state.borrow().clone()
    }

    pub fn opacity(&self) -> f32 {
        self.state.borrow().opacity
    }

    pub fn transform(&self) -> Transform {
        self.state.borrow().transform
    }

    pub fn text(&self) -> Option<String> {
        self.state.borrow().text.clone()
    }

    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    /// Box a clone for handing to a controller
    pub fn boxed(&self) -> BoxedTarget {
        Box::new(self.clone())
    }
}

impl Animatable for SharedTarget {
    fn set_opacity(&mut self, opacity: f32) {
        let mut state = self.state.borrow_mut();
        state.opacity = opacity;
        state.writes += 1;
    }

    fn set_transform(&mut self, transform: Transform) {
        let mut state = self.state.borrow_mut();
        state.transform = transform;
        state.writes += 1;
    }

    fn set_text(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.text = Some(text.to_string());
        state.writes += 1;
    }
}
