//! Viewport entrance reveals
//!
//! A container registers an ordered list of targets. The first time the
//! container becomes visible enough, each target fades in and rises from
//! `start_offset` to its resting position, staggered in registration order:
//!
//! ```ignore
//! let reveal = RevealController::new(scheduler.handle(), preference.clone());
//! let _registration = reveal.register(
//!     ContainerId(1),
//!     vec![heading.boxed(), body.boxed(), cta.boxed()],
//!     RevealOptions::default(),
//! );
//!
//! // From the host's scroll observer:
//! reveal.on_intersection(IntersectionEvent::new(1, 0.4));
//! ```
//!
//! The entrance plays at most once per container and is not reversed when the
//! container scrolls back out. Dropping the registration (unmount) detaches
//! the container and cancels any entrance still in flight.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use lumen_core::{ms, BoxedTarget, Easing, MotionPreference, RevealConfig, Transform};
use lumen_platform::{ContainerId, IntersectionEvent};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::gate::ViewportGate;
use crate::scheduler::{FrameTask, SchedulerHandle, SharedTask, TaskGuard, TaskStatus};

new_key_type! {
    /// Handle to a registered reveal group
    pub struct RevealGroupId;
}

/// Entrance timing for one container
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealOptions {
    /// Delay between consecutive targets
    pub stagger: Duration,
    /// Visible fraction that triggers the entrance
    pub threshold: f32,
    /// Initial downward offset of each target
    pub start_offset: f32,
    /// Duration of a single target's entrance
    pub duration: Duration,
    pub easing: Easing,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self::from(&RevealConfig::default())
    }
}

impl From<&RevealConfig> for RevealOptions {
    fn from(config: &RevealConfig) -> Self {
        Self {
            stagger: ms(config.stagger_ms),
            threshold: config.threshold,
            start_offset: config.start_offset,
            duration: ms(config.duration_ms),
            easing: config.easing,
        }
    }
}

impl RevealOptions {
    pub fn stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn start_offset(mut self, offset: f32) -> Self {
        self.start_offset = offset;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Calculate the start delay for the target at `order`
    pub fn delay_for_index(&self, order: usize) -> Duration {
        self.stagger * order as u32
    }
}

/// Lifecycle of a single reveal target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    /// Hidden, waiting for the trigger (or its stagger delay)
    Pending,
    /// Entrance in progress
    Playing,
    /// Fully visible at rest; terminal
    Settled,
}

struct RevealTarget {
    order: usize,
    target: BoxedTarget,
}

impl RevealTarget {
    fn apply(&mut self, progress: f32, options: &RevealOptions) {
        let eased = options.easing.apply(progress);
        self.target.set_opacity(eased);
        self.target
            .set_transform(Transform::translate(0.0, options.start_offset * (1.0 - eased)));
    }

    fn hide(&mut self, options: &RevealOptions) {
        self.target.set_opacity(0.0);
        self.target
            .set_transform(Transform::translate(0.0, options.start_offset));
    }

    /// Jump to the resting state. States only ever move forward.
    fn settle(&mut self, state: &Cell<RevealState>) {
        if state.replace(RevealState::Settled) == RevealState::Settled {
            return;
        }
        self.target.set_opacity(1.0);
        self.target.set_transform(Transform::IDENTITY);
    }
}

/// Per-target states, readable while the group is being updated
type SharedStates = Rc<[Cell<RevealState>]>;

/// Targets of one container plus their entrance clock
struct RevealGroup {
    container: ContainerId,
    targets: SmallVec<[RevealTarget; 8]>,
    states: SharedStates,
    options: RevealOptions,
    preference: MotionPreference,
    /// Time since the trigger
    elapsed: Duration,
}

impl RevealGroup {
    fn settle_all(&mut self) {
        for target in self.targets.iter_mut() {
            target.settle(&self.states[target.order]);
        }
    }

    fn is_settled(&self) -> bool {
        self.states
            .iter()
            .all(|state| state.get() == RevealState::Settled)
    }

    /// Apply the state for the current elapsed time
    fn update(&mut self) {
        let options = self.options;
        for target in self.targets.iter_mut() {
            let state = &self.states[target.order];
            if state.get() == RevealState::Settled {
                continue;
            }

            let delay = options.delay_for_index(target.order);
            if self.elapsed < delay {
                continue;
            }

            let local = self.elapsed - delay;
            if local >= options.duration {
                target.settle(state);
                continue;
            }

            state.set(RevealState::Playing);
            let progress = local.as_secs_f32() / options.duration.as_secs_f32();
            target.apply(progress, &options);
        }
    }
}

impl FrameTask for RevealGroup {
    fn tick(&mut self, dt: Duration) -> TaskStatus {
        // A preference flip mid-entrance jumps straight to the end
        if self.preference.query() {
            self.settle_all();
            return TaskStatus::Done;
        }

        self.elapsed += dt;
        self.update();

        if self.is_settled() {
            tracing::debug!("Reveal for {} settled", self.container);
            TaskStatus::Done
        } else {
            TaskStatus::Continue
        }
    }
}

struct GroupEntry {
    group: Rc<RefCell<RevealGroup>>,
    states: SharedStates,
    gate: ViewportGate,
    task: Option<TaskGuard>,
}

struct RevealInner {
    groups: SlotMap<RevealGroupId, GroupEntry>,
    by_container: FxHashMap<ContainerId, RevealGroupId>,
}

/// Plays one-shot staggered entrances when containers enter the viewport
///
/// Each controller owns its groups exclusively; there is no shared registry.
#[derive(Clone)]
pub struct RevealController {
    scheduler: SchedulerHandle,
    preference: MotionPreference,
    inner: Rc<RefCell<RevealInner>>,
}

impl RevealController {
    pub fn new(scheduler: SchedulerHandle, preference: MotionPreference) -> Self {
        Self {
            scheduler,
            preference,
            inner: Rc::new(RefCell::new(RevealInner {
                groups: SlotMap::with_key(),
                by_container: FxHashMap::default(),
            })),
        }
    }

    /// Register a container and its targets in entrance order
    ///
    /// Targets are hidden immediately so they can rise in later. Under reduced
    /// motion they are settled right away instead and the container never
    /// animates. An empty target list, or a container that is already
    /// registered, yields an inert registration.
    pub fn register(
        &self,
        container: impl Into<ContainerId>,
        targets: Vec<BoxedTarget>,
        options: RevealOptions,
    ) -> RevealRegistration {
        let container = container.into();

        if targets.is_empty() {
            tracing::debug!("Reveal for {} has no targets; ignoring", container);
            return RevealRegistration::inert(container);
        }

        if self.inner.borrow().by_container.contains_key(&container) {
            tracing::warn!(
                "{} is already registered for reveal; ignoring second registration",
                container
            );
            return RevealRegistration::inert(container);
        }

        let states: SharedStates = (0..targets.len())
            .map(|_| Cell::new(RevealState::Pending))
            .collect();
        let mut group = RevealGroup {
            container,
            targets: targets
                .into_iter()
                .enumerate()
                .map(|(order, target)| RevealTarget { order, target })
                .collect(),
            states: Rc::clone(&states),
            options,
            preference: self.preference.clone(),
            elapsed: Duration::ZERO,
        };
        let mut gate = ViewportGate::new(options.threshold);

        // Targets are written before the controller is borrowed
        if self.preference.query() {
            gate.disarm();
            group.settle_all();
        } else {
            for target in group.targets.iter_mut() {
                target.hide(&options);
            }
        }

        tracing::debug!(
            "Registered reveal for {} ({} targets)",
            container,
            group.targets.len()
        );

        let mut inner = self.inner.borrow_mut();
        let id = inner.groups.insert(GroupEntry {
            group: Rc::new(RefCell::new(group)),
            states,
            gate,
            task: None,
        });
        inner.by_container.insert(container, id);

        RevealRegistration {
            controller: Rc::downgrade(&self.inner),
            container,
            id: Some(id),
        }
    }

    /// Feed a visibility observation from the host
    ///
    /// Returns true when this observation triggered the entrance.
    pub fn on_intersection(&self, event: IntersectionEvent) -> bool {
        let (id, group) = {
            let mut inner = self.inner.borrow_mut();
            let Some(&id) = inner.by_container.get(&event.container) else {
                return false;
            };
            let Some(entry) = inner.groups.get_mut(id) else {
                return false;
            };
            if !entry.gate.observe(event.visible_fraction) {
                return false;
            }
            (id, Rc::clone(&entry.group))
        };

        // Setters run without the controller borrowed
        if self.preference.query() {
            group.borrow_mut().settle_all();
            tracing::debug!(
                "Reveal for {} settled instantly (reduced motion)",
                event.container
            );
            return true;
        }

        tracing::debug!(
            "Reveal triggered for {} at {:.2} visible",
            event.container,
            event.visible_fraction
        );

        // First frame shows the leading target at progress 0
        group.borrow_mut().update();

        let task: SharedTask = group;
        let guard = self.scheduler.register_shared(task);
        if let Some(entry) = self.inner.borrow_mut().groups.get_mut(id) {
            entry.task = Some(guard);
        }
        true
    }

    /// State of each target of a container, in registration order
    pub fn states(&self, container: impl Into<ContainerId>) -> Option<Vec<RevealState>> {
        let container = container.into();
        let inner = self.inner.borrow();
        let id = inner.by_container.get(&container)?;
        let entry = inner.groups.get(*id)?;
        Some(entry.states.iter().map(Cell::get).collect())
    }

    /// Check if the container's entrance has been triggered
    pub fn has_fired(&self, container: impl Into<ContainerId>) -> bool {
        let container = container.into();
        let inner = self.inner.borrow();
        inner
            .by_container
            .get(&container)
            .and_then(|id| inner.groups.get(*id))
            .map(|entry| entry.gate.has_fired())
            .unwrap_or(false)
    }

    /// Number of registered containers
    pub fn len(&self) -> usize {
        self.inner.borrow().groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Disposer returned by [`RevealController::register`]
///
/// Dropping it (or calling [`dispose`](Self::dispose)) detaches the container
/// and cancels an entrance that is still playing.
pub struct RevealRegistration {
    controller: Weak<RefCell<RevealInner>>,
    container: ContainerId,
    id: Option<RevealGroupId>,
}

impl RevealRegistration {
    fn inert(container: ContainerId) -> Self {
        Self {
            controller: Weak::new(),
            container,
            id: None,
        }
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// False for ignored (empty or duplicate) registrations
    pub fn is_registered(&self) -> bool {
        self.id.is_some()
    }

    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Some(inner) = self.controller.upgrade() else {
            return;
        };

        let removed = {
            let mut inner = inner.borrow_mut();
            if inner.by_container.get(&self.container) == Some(&id) {
                inner.by_container.remove(&self.container);
            }
            inner.groups.remove(id)
        };
        // Cancels the frame task outside the controller borrow
        drop(removed);
        tracing::debug!("Reveal for {} disposed", self.container);
    }
}

impl Drop for RevealRegistration {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameScheduler;
    use lumen_core::{Animatable, SharedTarget};

    const FRAME: Duration = Duration::from_millis(16);

    fn options() -> RevealOptions {
        RevealOptions::default()
            .stagger(Duration::from_millis(100))
            .duration(Duration::from_millis(400))
            .threshold(0.2)
            .start_offset(24.0)
    }

    fn targets(n: usize) -> (Vec<SharedTarget>, Vec<BoxedTarget>) {
        let shared: Vec<SharedTarget> = (0..n).map(|_| SharedTarget::new()).collect();
        let boxed = shared.iter().map(|t| t.boxed()).collect();
        (shared, boxed)
    }

    #[test]
    fn test_register_hides_targets() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
        let (shared, boxed) = targets(2);

        let _reg = reveal.register(1, boxed, options());

        for t in &shared {
            assert_eq!(t.opacity(), 0.0);
            assert_eq!(t.transform().translate_y, 24.0);
        }
        assert_eq!(
            reveal.states(1),
            Some(vec![RevealState::Pending, RevealState::Pending])
        );
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
        let (_shared, boxed) = targets(1);
        let _reg = reveal.register(1, boxed, options());

        assert!(!reveal.on_intersection(IntersectionEvent::new(1, 0.1)));
        assert!(!reveal.has_fired(1));
    }

    #[test]
    fn test_staggered_entrance() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
        let (shared, boxed) = targets(3);
        let _reg = reveal.register(1, boxed, options());

        assert!(reveal.on_intersection(IntersectionEvent::new(1, 0.5)));
        scheduler.advance(Duration::from_millis(50));

        // First target is rising, the others are still waiting
        assert_eq!(
            reveal.states(1),
            Some(vec![
                RevealState::Playing,
                RevealState::Pending,
                RevealState::Pending
            ])
        );
        assert!(shared[0].opacity() > 0.0 && shared[0].opacity() < 1.0);
        assert!(shared[0].transform().translate_y < 24.0);
        assert_eq!(shared[1].opacity(), 0.0);

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(
            reveal.states(1),
            Some(vec![
                RevealState::Playing,
                RevealState::Playing,
                RevealState::Pending
            ])
        );

        // Last target starts at 200ms and ends at 600ms
        scheduler.advance_by(Duration::from_millis(500), FRAME);
        assert_eq!(reveal.states(1), Some(vec![RevealState::Settled; 3]));
        for t in &shared {
            assert_eq!(t.opacity(), 1.0);
            assert!(t.transform().is_identity());
        }
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_reveal_fires_once() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
        let (shared, boxed) = targets(1);
        let _reg = reveal.register(1, boxed, options());

        assert!(reveal.on_intersection(IntersectionEvent::new(1, 1.0)));
        scheduler.advance_by(Duration::from_millis(500), FRAME);
        let writes = shared[0].writes();

        // Out and back in
        assert!(!reveal.on_intersection(IntersectionEvent::new(1, 0.0)));
        assert!(!reveal.on_intersection(IntersectionEvent::new(1, 1.0)));
        scheduler.advance_by(Duration::from_millis(500), FRAME);

        assert_eq!(shared[0].writes(), writes);
        assert_eq!(shared[0].opacity(), 1.0);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_scrolling_out_does_not_reverse() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
        let (shared, boxed) = targets(1);
        let _reg = reveal.register(1, boxed, options());

        reveal.on_intersection(IntersectionEvent::new(1, 1.0));
        scheduler.advance(Duration::from_millis(100));
        let mid = shared[0].opacity();
        reveal.on_intersection(IntersectionEvent::new(1, 0.0));
        scheduler.advance(Duration::from_millis(100));

        assert!(shared[0].opacity() > mid);
    }

    #[test]
    fn test_reduced_motion_settles_immediately() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::reduced());
        let (shared, boxed) = targets(3);
        let _reg = reveal.register(1, boxed, options());

        assert_eq!(reveal.states(1), Some(vec![RevealState::Settled; 3]));
        for t in &shared {
            assert_eq!(t.opacity(), 1.0);
            assert!(t.transform().is_identity());
        }
        assert!(!reveal.on_intersection(IntersectionEvent::new(1, 1.0)));
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_empty_targets_is_noop() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());

        let reg = reveal.register(1, Vec::new(), options());
        assert!(!reg.is_registered());
        assert!(reveal.is_empty());
        assert!(!reveal.on_intersection(IntersectionEvent::new(1, 1.0)));
    }

    #[test]
    fn test_double_registration_is_ignored() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
        let (first, boxed) = targets(1);
        let (second, boxed_again) = targets(1);

        let reg = reveal.register(1, boxed, options());
        let dup = reveal.register(1, boxed_again, options());
        assert!(reg.is_registered());
        assert!(!dup.is_registered());
        assert_eq!(reveal.len(), 1);

        // Dropping the ignored registration leaves the original intact
        drop(dup);
        assert_eq!(reveal.len(), 1);

        reveal.on_intersection(IntersectionEvent::new(1, 1.0));
        scheduler.advance_by(Duration::from_millis(500), FRAME);
        assert_eq!(first[0].opacity(), 1.0);
        assert_eq!(second[0].writes(), 0);
    }

    #[test]
    fn test_dispose_cancels_entrance() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
        let (shared, boxed) = targets(2);
        let reg = reveal.register(1, boxed, options());

        reveal.on_intersection(IntersectionEvent::new(1, 1.0));
        scheduler.advance(FRAME);
        assert_eq!(scheduler.active_tasks(), 1);

        reg.dispose();
        assert_eq!(scheduler.active_tasks(), 0);
        assert!(reveal.is_empty());

        let writes = shared[0].writes();
        scheduler.advance(FRAME);
        assert_eq!(shared[0].writes(), writes);

        // The container can be registered again after unmount
        let (_again, boxed) = targets(1);
        assert!(reveal.register(1, boxed, options()).is_registered());
    }

    #[test]
    fn test_preference_flip_mid_entrance_settles() {
        let scheduler = FrameScheduler::new();
        let cell = lumen_core::SharedPreference::new(Some(false));
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::new(cell.clone()));
        let (shared, boxed) = targets(2);
        let _reg = reveal.register(1, boxed, options());

        reveal.on_intersection(IntersectionEvent::new(1, 1.0));
        scheduler.advance(FRAME);
        cell.set(Some(true));
        scheduler.advance(FRAME);

        assert_eq!(reveal.states(1), Some(vec![RevealState::Settled; 2]));
        assert_eq!(shared[1].opacity(), 1.0);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    type Observation = (bool, Option<Vec<RevealState>>);

    /// Target that reads the controller back from inside its setters
    struct QueryingTarget {
        reveal: RevealController,
        seen: Rc<RefCell<Vec<Observation>>>,
    }

    impl Animatable for QueryingTarget {
        fn set_opacity(&mut self, _opacity: f32) {
            let observation = (self.reveal.has_fired(1), self.reveal.states(1));
            self.seen.borrow_mut().push(observation);
        }

        fn set_transform(&mut self, _transform: Transform) {}
    }

    #[test]
    fn test_targets_can_query_controller_from_setters() {
        let scheduler = FrameScheduler::new();
        let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let target = QueryingTarget {
            reveal: reveal.clone(),
            seen: Rc::clone(&seen),
        };

        let _reg = reveal.register(1, vec![Box::new(target) as BoxedTarget], options());
        assert!(reveal.on_intersection(IntersectionEvent::new(1, 1.0)));
        scheduler.advance_by(Duration::from_millis(500), FRAME);

        let seen = seen.borrow();
        assert_eq!(seen[0], (false, None));
        assert_eq!(seen[1], (true, Some(vec![RevealState::Playing])));
        assert_eq!(seen.last(), Some(&(true, Some(vec![RevealState::Settled]))));
    }
}
