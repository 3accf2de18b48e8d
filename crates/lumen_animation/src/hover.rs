//! Hover and focus micro-interactions
//!
//! A bounded progress in `[0, 1]` moves toward 1 while the element is engaged
//! (hovered or focused) and back toward 0 otherwise. Reversing mid-way
//! continues from the current progress rather than restarting.
//!
//! # Example
//!
//! ```ignore
//! let mut accent = HoverMicroInteraction::new(
//!     scheduler.handle(),
//!     preference.clone(),
//!     border.boxed(),
//!     HoverEffect::BorderExpand,
//!     &config.hover,
//! );
//!
//! accent.on_enter();
//! scheduler.advance(Duration::from_millis(150));
//! accent.on_leave();
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use lumen_core::{ms, BoxedTarget, Easing, HoverConfig, MotionPreference, Transform};
use lumen_platform::{FocusEvent, InputEvent, PointerEvent};

use crate::scheduler::{FrameTask, SchedulerHandle, TaskGuard, TaskStatus};

/// How eased progress maps onto the target
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HoverEffect {
    /// Accent line grows horizontally from nothing to full width
    BorderExpand,
    /// Highlight fades in while sliding `travel` units into place
    Shimmer { travel: f32 },
    /// Element rises by `distance`
    Lift { distance: f32 },
}

struct HoverState {
    progress: f32,
    hovered: bool,
    focused: bool,
    duration: Duration,
    easing: Easing,
    effect: HoverEffect,
    target: BoxedTarget,
    preference: MotionPreference,
}

impl HoverState {
    fn engaged(&self) -> bool {
        self.hovered || self.focused
    }

    fn destination(&self) -> f32 {
        if self.engaged() {
            1.0
        } else {
            0.0
        }
    }

    fn apply(&mut self) {
        let eased = self.easing.apply(self.progress);
        match self.effect {
            HoverEffect::BorderExpand => self.target.set_transform(Transform::scale_xy(eased, 1.0)),
            HoverEffect::Shimmer { travel } => {
                self.target.set_opacity(eased);
                self.target
                    .set_transform(Transform::translate(-travel * (1.0 - eased), 0.0));
            }
            HoverEffect::Lift { distance } => self
                .target
                .set_transform(Transform::translate(0.0, -distance * eased)),
        }
    }

    fn snap(&mut self) {
        self.progress = self.destination();
        self.apply();
    }
}

impl FrameTask for HoverState {
    fn tick(&mut self, dt: Duration) -> TaskStatus {
        let destination = self.destination();

        if self.preference.query() || self.duration.is_zero() {
            self.snap();
            return TaskStatus::Done;
        }

        let step = dt.as_secs_f32() / self.duration.as_secs_f32();
        self.progress = if destination > self.progress {
            (self.progress + step).min(destination)
        } else {
            (self.progress - step).max(destination)
        };
        self.apply();

        if self.progress == destination {
            TaskStatus::Done
        } else {
            TaskStatus::Continue
        }
    }
}

/// Pointer/focus driven micro-interaction on one target
pub struct HoverMicroInteraction {
    scheduler: SchedulerHandle,
    preference: MotionPreference,
    state: Rc<RefCell<HoverState>>,
    task: TaskGuard,
}

impl HoverMicroInteraction {
    /// Create the interaction and put the target in its resting state
    pub fn new(
        scheduler: SchedulerHandle,
        preference: MotionPreference,
        target: BoxedTarget,
        effect: HoverEffect,
        config: &HoverConfig,
    ) -> Self {
        let mut state = HoverState {
            progress: 0.0,
            hovered: false,
            focused: false,
            duration: ms(config.duration_ms),
            easing: config.easing,
            effect,
            target,
            preference: preference.clone(),
        };
        state.apply();

        Self {
            scheduler,
            preference,
            state: Rc::new(RefCell::new(state)),
            task: TaskGuard::inert(),
        }
    }

    pub fn on_enter(&mut self) {
        self.state.borrow_mut().hovered = true;
        self.kick();
    }

    pub fn on_leave(&mut self) {
        self.state.borrow_mut().hovered = false;
        self.kick();
    }

    pub fn on_focus(&mut self) {
        self.state.borrow_mut().focused = true;
        self.kick();
    }

    pub fn on_blur(&mut self) {
        self.state.borrow_mut().focused = false;
        self.kick();
    }

    /// Route a platform event; returns true if it was relevant
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Pointer(PointerEvent::Entered) => self.on_enter(),
            InputEvent::Pointer(PointerEvent::Left | PointerEvent::Cancelled) => self.on_leave(),
            InputEvent::Focus(FocusEvent::Entered) => self.on_focus(),
            InputEvent::Focus(FocusEvent::Left) => self.on_blur(),
            _ => return false,
        }
        true
    }

    /// Linear progress toward the engaged state
    pub fn progress(&self) -> f32 {
        self.state.borrow().progress
    }

    pub fn is_engaged(&self) -> bool {
        self.state.borrow().engaged()
    }

    /// Check if a frame task is currently moving the progress
    pub fn is_animating(&self) -> bool {
        self.task.is_active()
    }

    /// Start moving toward the current destination if not there yet
    fn kick(&mut self) {
        {
            let mut state = self.state.borrow_mut();
            if state.progress == state.destination() {
                return;
            }
            if self.preference.query() || state.duration.is_zero() {
                state.snap();
                return;
            }
        }

        if !self.task.is_active() {
            self.task = self.scheduler.register_shared(self.state.clone());
            tracing::trace!("Hover transition started");
        }
    }
}
