//! Slider state machine
//!
//! ```text
//!            go_to / go_next / go_prev / autoplay / swipe / arrow key
//!   Idle  ------------------------------------------------------------>  Transitioning
//!    ^                                                                     (locked)
//!    +---------------------- transition window elapsed --------------------+
//! ```
//!
//! Autoplay, drag and keyboard all write the same state. The transition lock
//! is the only serialization point: while it is held every navigation request
//! is dropped (never queued).
//!
//! [`SliderStateMachine`] is pure and clock-free; time only enters through
//! [`SliderStateMachine::advance`]. [`Slider`] mounts it on a frame scheduler.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use lumen_animation::{FrameTask, SchedulerHandle, TaskGuard, TaskStatus};
use lumen_core::{ms, MotionPreference, Point, SliderSection};
use lumen_platform::{FocusEvent, InputEvent, Key, KeyState, KeyboardEvent, PointerEvent};

use crate::gesture::{DragGesture, DragOutcome};
use crate::progress::AutoplayTimer;

/// Direction of a slide change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Prev,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => write!(f, "next"),
            Direction::Prev => write!(f, "prev"),
        }
    }
}

/// What requested a navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationSource {
    /// `go_to` / `go_next` / `go_prev` (buttons, dots)
    Manual,
    Autoplay,
    Swipe,
    Keyboard,
}

/// An accepted navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideChange {
    pub index: usize,
    pub previous: usize,
    pub direction: Direction,
    pub source: NavigationSource,
}

/// Slider timing and gesture tuning
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderConfig {
    /// Lock window after each slide change
    pub transition: Duration,
    /// Time since the last slide change before autoplay advances
    pub autoplay_interval: Duration,
    /// Horizontal drag distance that counts as a swipe
    pub swipe_threshold: f32,
    /// Whether autoplay starts enabled
    pub autoplay: bool,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self::from(&SliderSection::default())
    }
}

impl From<&SliderSection> for SliderConfig {
    fn from(section: &SliderSection) -> Self {
        Self {
            transition: ms(section.transition_ms),
            autoplay_interval: ms(section.autoplay_ms),
            swipe_threshold: section.swipe_threshold,
            autoplay: section.autoplay,
        }
    }
}

/// Read-only view for host chrome (dots, arrows, progress bar)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderSnapshot {
    pub slide_count: usize,
    pub current: usize,
    /// Outgoing slide while a transition is in flight
    pub previous: Option<usize>,
    pub direction: Option<Direction>,
    pub locked: bool,
    /// Autoplay progress indicator in `[0, 1]`
    pub progress: f32,
    pub autoplay_enabled: bool,
    /// Whether the autoplay timer is currently running
    pub autoplay_armed: bool,
}

impl fmt::Display for SliderSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slide {}/{}", self.current + 1, self.slide_count.max(1))?;
        if let Some(direction) = self.direction {
            write!(f, " ({})", direction)?;
        }
        if let Some(previous) = self.previous {
            write!(f, " from {}", previous + 1)?;
        }
        if self.locked {
            write!(f, " [locked]")?;
        }
        let autoplay = match (self.autoplay_enabled, self.autoplay_armed) {
            (false, _) => "paused",
            (true, false) => "held",
            (true, true) => "running",
        };
        write!(f, " autoplay={} progress={:.2}", autoplay, self.progress)
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// Carousel navigation state
pub struct SliderStateMachine {
    config: SliderConfig,
    slide_count: usize,
    current: usize,
    previous: Option<usize>,
    direction: Option<Direction>,
    /// Remaining transition window; zero when unlocked
    lock_remaining: Duration,
    autoplay_enabled: bool,
    pointer_over: bool,
    focus_within: bool,
    drag: DragGesture,
    timer: AutoplayTimer,
    reduced_motion: bool,
}

impl SliderStateMachine {
    pub fn new(slide_count: usize, config: SliderConfig) -> Self {
        if slide_count <= 1 {
            tracing::debug!(
                "Slider with {} slide(s); navigation disabled",
                slide_count
            );
        }
        Self {
            config,
            slide_count,
            current: 0,
            previous: None,
            direction: None,
            lock_remaining: Duration::ZERO,
            autoplay_enabled: config.autoplay,
            pointer_over: false,
            focus_within: false,
            drag: DragGesture::Idle,
            timer: AutoplayTimer::new(config.autoplay_interval),
            reduced_motion: false,
        }
    }

    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    /// Current index (0 for an empty slider)
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Current slide, if there are any slides
    pub fn active_slide(&self) -> Option<usize> {
        (self.slide_count > 0).then_some(self.current)
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.previous
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn is_locked(&self) -> bool {
        !self.lock_remaining.is_zero()
    }

    /// More than one slide
    pub fn is_navigable(&self) -> bool {
        self.slide_count > 1
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn has_focus_within(&self) -> bool {
        self.focus_within
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Collapse the transition window and hold autoplay while motion is reduced
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if self.reduced_motion == reduced {
            return;
        }
        self.reduced_motion = reduced;
        if reduced {
            self.unlock();
        }
        tracing::debug!("Slider reduced motion: {}", reduced);
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Navigate to `index` (wrapped), inferring the direction
    ///
    /// Dropped while a transition is in flight. Going to the current index is
    /// a no-op.
    pub fn go_to(&mut self, index: usize) -> Option<SlideChange> {
        self.navigate(index, None, NavigationSource::Manual)
    }

    /// Navigate to `index` with an explicit direction
    pub fn go_to_with(&mut self, index: usize, direction: Direction) -> Option<SlideChange> {
        self.navigate(index, Some(direction), NavigationSource::Manual)
    }

    pub fn go_next(&mut self) -> Option<SlideChange> {
        self.step(Direction::Next, NavigationSource::Manual)
    }

    pub fn go_prev(&mut self) -> Option<SlideChange> {
        self.step(Direction::Prev, NavigationSource::Manual)
    }

    fn step(&mut self, direction: Direction, source: NavigationSource) -> Option<SlideChange> {
        if !self.is_navigable() {
            return None;
        }
        let index = match direction {
            Direction::Next => (self.current + 1) % self.slide_count,
            Direction::Prev => (self.current + self.slide_count - 1) % self.slide_count,
        };
        self.navigate(index, Some(direction), source)
    }

    fn navigate(
        &mut self,
        index: usize,
        direction: Option<Direction>,
        source: NavigationSource,
    ) -> Option<SlideChange> {
        if !self.is_navigable() {
            tracing::trace!("Slider navigation ignored: {} slide(s)", self.slide_count);
            return None;
        }
        if self.is_locked() {
            tracing::trace!(
                "Slider navigation to {} dropped ({:?}): transition in flight",
                index,
                source
            );
            return None;
        }

        let index = index % self.slide_count;
        if index == self.current {
            return None;
        }

        let direction = direction.unwrap_or(if index > self.current {
            Direction::Next
        } else {
            Direction::Prev
        });

        let change = SlideChange {
            index,
            previous: self.current,
            direction,
            source,
        };

        self.previous = Some(self.current);
        self.current = index;
        self.direction = Some(direction);
        self.timer.reset();

        if self.reduced_motion || self.config.transition.is_zero() {
            self.previous = None;
        } else {
            self.lock_remaining = self.config.transition;
        }

        tracing::debug!(
            "Slide {} -> {} ({}, {:?})",
            change.previous,
            change.index,
            direction,
            source
        );
        Some(change)
    }

    fn unlock(&mut self) {
        self.lock_remaining = Duration::ZERO;
        self.previous = None;
    }

    // ------------------------------------------------------------------------
    // Autoplay
    // ------------------------------------------------------------------------

    pub fn is_autoplay_enabled(&self) -> bool {
        self.autoplay_enabled
    }

    /// Whether the autoplay timer is running right now
    pub fn is_autoplay_armed(&self) -> bool {
        self.is_navigable()
            && self.autoplay_enabled
            && !self.pointer_over
            && !self.drag.is_dragging()
            && !self.reduced_motion
    }

    /// Pause autoplay; the progress indicator freezes
    pub fn pause(&mut self) {
        if self.autoplay_enabled {
            self.autoplay_enabled = false;
            tracing::debug!("Slider autoplay paused");
        }
    }

    /// Resume autoplay from the frozen progress
    pub fn resume(&mut self) {
        if !self.autoplay_enabled {
            self.autoplay_enabled = true;
            tracing::debug!("Slider autoplay resumed");
        }
    }

    /// Returns the new enabled state
    pub fn toggle_autoplay(&mut self) -> bool {
        if self.autoplay_enabled {
            self.pause();
        } else {
            self.resume();
        }
        self.autoplay_enabled
    }

    /// Autoplay progress indicator in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if !self.is_navigable() {
            return 0.0;
        }
        self.timer.progress()
    }

    /// Time since the last slide change that counts toward autoplay
    pub fn autoplay_elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// Advance time: release the lock and run autoplay
    ///
    /// Returns the change made by autoplay, if any.
    pub fn advance(&mut self, dt: Duration) -> Option<SlideChange> {
        if self.is_locked() {
            self.lock_remaining = self.lock_remaining.saturating_sub(dt);
            if !self.is_locked() {
                self.unlock();
                tracing::trace!("Slider transition finished on {}", self.current);
            }
        }

        if !self.is_autoplay_armed() {
            return None;
        }

        self.timer.advance(dt);
        // An interval that expires mid-transition waits for the unlock
        if self.timer.is_due() && !self.is_locked() {
            return self.step(Direction::Next, NavigationSource::Autoplay);
        }
        None
    }

    // ------------------------------------------------------------------------
    // Pointer, keyboard and focus
    // ------------------------------------------------------------------------

    pub fn pointer_enter(&mut self) {
        self.pointer_over = true;
    }

    /// Pointer left: autoplay re-arms and an unfinished drag is abandoned
    pub fn pointer_leave(&mut self) {
        self.pointer_over = false;
        if self.drag.cancel().is_some() {
            tracing::trace!("Slider drag abandoned on leave");
        }
    }

    /// Start a drag; restarts the autoplay interval
    pub fn pointer_down(&mut self, at: Point) {
        self.drag.press(at);
        self.timer.reset();
    }

    /// Finish a drag; swipes past the threshold navigate
    pub fn pointer_up(&mut self, at: Point) -> Option<SlideChange> {
        match self.drag.release(at, self.config.swipe_threshold)? {
            DragOutcome::Swiped(direction) => self.step(direction, NavigationSource::Swipe),
            DragOutcome::Cancelled => None,
        }
    }

    pub fn pointer_cancel(&mut self) {
        self.drag.cancel();
    }

    pub fn set_focus_within(&mut self, focused: bool) {
        self.focus_within = focused;
    }

    /// Arrow keys navigate while focus is inside the slider
    ///
    /// Chords with Ctrl/Alt/Meta are left to the host.
    pub fn key(&mut self, event: &KeyboardEvent) -> Option<SlideChange> {
        if !self.focus_within || event.state != KeyState::Pressed || event.modifiers.has_command() {
            return None;
        }
        let direction = match event.key {
            Key::Right | Key::Down => Direction::Next,
            Key::Left | Key::Up => Direction::Prev,
            _ => return None,
        };
        self.step(direction, NavigationSource::Keyboard)
    }

    /// Route a platform event
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<SlideChange> {
        match event {
            InputEvent::Pointer(pointer) => match pointer {
                PointerEvent::Entered => {
                    self.pointer_enter();
                    None
                }
                PointerEvent::Left => {
                    self.pointer_leave();
                    None
                }
                PointerEvent::Pressed { x, y } => {
                    self.pointer_down(Point::new(*x, *y));
                    None
                }
                PointerEvent::Released { x, y } => self.pointer_up(Point::new(*x, *y)),
                PointerEvent::Cancelled => {
                    self.pointer_cancel();
                    None
                }
                PointerEvent::Moved { .. } => None,
            },
            InputEvent::Keyboard(key) => self.key(key),
            InputEvent::Focus(FocusEvent::Entered) => {
                self.set_focus_within(true);
                None
            }
            InputEvent::Focus(FocusEvent::Left) => {
                self.set_focus_within(false);
                None
            }
        }
    }

    pub fn snapshot(&self) -> SliderSnapshot {
        SliderSnapshot {
            slide_count: self.slide_count,
            current: self.current,
            previous: self.previous,
            direction: self.direction,
            locked: self.is_locked(),
            progress: self.progress(),
            autoplay_enabled: self.autoplay_enabled,
            autoplay_armed: self.is_autoplay_armed(),
        }
    }
}

// ============================================================================
// Mounted Slider
// ============================================================================

/// Frame task driving a mounted slider
struct SliderTask {
    machine: Rc<RefCell<SliderStateMachine>>,
    preference: MotionPreference,
    changes: Rc<RefCell<Vec<SlideChange>>>,
}

impl FrameTask for SliderTask {
    fn tick(&mut self, dt: Duration) -> TaskStatus {
        let mut machine = self.machine.borrow_mut();
        machine.set_reduced_motion(self.preference.query());
        if let Some(change) = machine.advance(dt) {
            self.changes.borrow_mut().push(change);
        }
        TaskStatus::Continue
    }
}

/// A slider mounted on a frame scheduler
///
/// Dropping it (unmount) cancels its frame task. Sliders with fewer than two
/// slides never register one.
pub struct Slider {
    machine: Rc<RefCell<SliderStateMachine>>,
    preference: MotionPreference,
    changes: Rc<RefCell<Vec<SlideChange>>>,
    task: TaskGuard,
}

impl Slider {
    pub fn mount(
        scheduler: &SchedulerHandle,
        slide_count: usize,
        config: SliderConfig,
        preference: MotionPreference,
    ) -> Self {
        let mut machine = SliderStateMachine::new(slide_count, config);
        machine.set_reduced_motion(preference.query());
        let machine = Rc::new(RefCell::new(machine));
        let changes = Rc::new(RefCell::new(Vec::new()));

        let task = if slide_count > 1 {
            scheduler.register(SliderTask {
                machine: Rc::clone(&machine),
                preference: preference.clone(),
                changes: Rc::clone(&changes),
            })
        } else {
            TaskGuard::inert()
        };

        tracing::debug!("Slider mounted with {} slide(s)", slide_count);

        Self {
            machine,
            preference,
            changes,
            task,
        }
    }

    fn sync_preference(&self) -> std::cell::RefMut<'_, SliderStateMachine> {
        let mut machine = self.machine.borrow_mut();
        machine.set_reduced_motion(self.preference.query());
        machine
    }

    pub fn go_to(&self, index: usize) -> Option<SlideChange> {
        self.sync_preference().go_to(index)
    }

    pub fn go_next(&self) -> Option<SlideChange> {
        self.sync_preference().go_next()
    }

    pub fn go_prev(&self) -> Option<SlideChange> {
        self.sync_preference().go_prev()
    }

    pub fn pause(&self) {
        self.machine.borrow_mut().pause();
    }

    pub fn resume(&self) {
        self.machine.borrow_mut().resume();
    }

    pub fn toggle_autoplay(&self) -> bool {
        self.machine.borrow_mut().toggle_autoplay()
    }

    pub fn handle_input(&self, event: &InputEvent) -> Option<SlideChange> {
        self.sync_preference().handle_input(event)
    }

    pub fn snapshot(&self) -> SliderSnapshot {
        self.machine.borrow().snapshot()
    }

    pub fn current_index(&self) -> usize {
        self.machine.borrow().current_index()
    }

    /// Changes made by autoplay since the last call
    pub fn take_autoplay_changes(&self) -> Vec<SlideChange> {
        std::mem::take(&mut *self.changes.borrow_mut())
    }

    /// Check if the slider is registered with the scheduler
    pub fn is_mounted(&self) -> bool {
        self.task.is_active()
    }

    /// Unmount explicitly; equivalent to dropping
    pub fn unmount(mut self) {
        self.task.cancel();
        tracing::debug!("Slider unmounted");
    }
}
