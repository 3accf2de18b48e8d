//! Numeric counters
//!
//! Counts a number up from zero the first time its container scrolls into
//! view. Integer targets truncate while counting and land exactly on the
//! target; fractional targets are shown with one decimal.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use lumen_core::{ms, BoxedTarget, CounterConfig, Easing, MotionPreference};
use lumen_platform::{ContainerId, IntersectionEvent};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::gate::ViewportGate;
use crate::scheduler::{FrameTask, SchedulerHandle, SharedTask, TaskGuard, TaskStatus};

new_key_type! {
    /// Handle to a registered counter
    pub struct CounterId;
}

/// How displayed values are rounded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precision {
    /// Truncate toward zero
    Integer,
    /// Round to one decimal place
    OneDecimal,
}

impl Precision {
    /// Integer for whole targets, one decimal otherwise
    pub fn for_target(target: f64) -> Self {
        if target.fract() == 0.0 {
            Precision::Integer
        } else {
            Precision::OneDecimal
        }
    }

    /// Round a value for display; never returns `-0.0`
    pub fn quantize(self, value: f64) -> f64 {
        let value = match self {
            Precision::Integer => value.trunc(),
            Precision::OneDecimal => (value * 10.0).round() / 10.0,
        };
        // Adding positive zero turns -0.0 into 0.0
        value + 0.0
    }

    /// Render a value for display, e.g. `"42+"` or `"4.5%"`
    pub fn format(self, value: f64, suffix: &str) -> String {
        let value = self.quantize(value);
        match self {
            Precision::Integer => format!("{:.0}{}", value, suffix),
            Precision::OneDecimal => format!("{:.1}{}", value, suffix),
        }
    }
}

/// What to count to and how
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterSpec {
    pub target: f64,
    pub precision: Precision,
    pub duration: Duration,
    pub easing: Easing,
    /// Visible fraction that starts the count
    pub threshold: f32,
}

impl CounterSpec {
    pub fn new(target: f64) -> Self {
        Self::from_config(target, &CounterConfig::default())
    }

    pub fn from_config(target: f64, config: &CounterConfig) -> Self {
        Self {
            target,
            precision: Precision::for_target(target),
            duration: ms(config.duration_ms),
            easing: config.easing,
            threshold: config.threshold,
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Final displayed value
    pub fn settled_value(&self) -> f64 {
        match self.precision {
            Precision::Integer => self.target,
            Precision::OneDecimal => self.precision.quantize(self.target),
        }
    }

    /// Displayed value at `progress` in `[0, 1]`
    ///
    /// Never passes the settled value, whichever side of zero it is on.
    pub fn value_at(&self, progress: f64) -> f64 {
        let settled = self.settled_value();
        if progress >= 1.0 {
            return settled;
        }

        let raw = self.precision.quantize(self.target * self.easing.apply_f64(progress));
        if settled >= 0.0 {
            raw.min(settled)
        } else {
            raw.max(settled)
        }
    }
}

/// Lifecycle of a counter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterState {
    /// Waiting for the container to become visible
    Pending,
    Counting,
    /// Showing the settled value; terminal
    Done,
}

type UpdateFn = Box<dyn FnMut(f64)>;

struct Counter {
    container: ContainerId,
    spec: CounterSpec,
    state: CounterState,
    gate: ViewportGate,
    preference: MotionPreference,
    elapsed: Duration,
    last: Option<f64>,
    on_update: UpdateFn,
}

impl Counter {
    fn emit(&mut self, value: f64) {
        if self.last == Some(value) {
            return;
        }
        self.last = Some(value);
        (self.on_update)(value);
    }

    fn finish(&mut self) {
        let settled = self.spec.settled_value();
        self.emit(settled);
        self.state = CounterState::Done;
    }

    fn update(&mut self) {
        if self.spec.duration.is_zero() || self.elapsed >= self.spec.duration {
            self.finish();
            return;
        }
        let progress = self.elapsed.as_secs_f64() / self.spec.duration.as_secs_f64();
        let value = self.spec.value_at(progress);
        self.emit(value);
    }
}

impl FrameTask for Counter {
    fn tick(&mut self, dt: Duration) -> TaskStatus {
        if self.state == CounterState::Done {
            return TaskStatus::Done;
        }
        if self.preference.query() {
            self.finish();
            return TaskStatus::Done;
        }

        self.elapsed += dt;
        self.update();

        if self.state == CounterState::Done {
            tracing::debug!("Counter in {} reached {}", self.container, self.spec.target);
            TaskStatus::Done
        } else {
            TaskStatus::Continue
        }
    }
}

struct CounterEntry {
    counter: Rc<RefCell<Counter>>,
    task: Option<TaskGuard>,
}

struct CounterInner {
    counters: SlotMap<CounterId, CounterEntry>,
    by_container: FxHashMap<ContainerId, SmallVec<[CounterId; 4]>>,
}

/// Starts counters when their containers enter the viewport
///
/// A container may hold several counters; they all start on the same event.
#[derive(Clone)]
pub struct CounterAnimator {
    scheduler: SchedulerHandle,
    preference: MotionPreference,
    inner: Rc<RefCell<CounterInner>>,
}

impl CounterAnimator {
    pub fn new(scheduler: SchedulerHandle, preference: MotionPreference) -> Self {
        Self {
            scheduler,
            preference,
            inner: Rc::new(RefCell::new(CounterInner {
                counters: SlotMap::with_key(),
                by_container: FxHashMap::default(),
            })),
        }
    }

    /// Register a counter; `on_update` receives every displayed value
    ///
    /// Under reduced motion `on_update` is called once with the target right
    /// away and the counter never animates.
    pub fn animate(
        &self,
        container: impl Into<ContainerId>,
        spec: CounterSpec,
        on_update: impl FnMut(f64) + 'static,
    ) -> CounterRegistration {
        let container = container.into();
        let mut counter = Counter {
            container,
            spec,
            state: CounterState::Pending,
            gate: ViewportGate::new(spec.threshold),
            preference: self.preference.clone(),
            elapsed: Duration::ZERO,
            last: None,
            on_update: Box::new(on_update),
        };

        if self.preference.query() {
            counter.gate.disarm();
            counter.finish();
        }

        tracing::debug!("Registered counter to {} in {}", spec.target, container);

        let mut inner = self.inner.borrow_mut();
        let id = inner.counters.insert(CounterEntry {
            counter: Rc::new(RefCell::new(counter)),
            task: None,
        });
        inner.by_container.entry(container).or_default().push(id);

        CounterRegistration {
            animator: Rc::downgrade(&self.inner),
            container,
            id: Some(id),
        }
    }

    /// Register a counter that writes formatted text to a target
    pub fn animate_text(
        &self,
        container: impl Into<ContainerId>,
        spec: CounterSpec,
        mut target: BoxedTarget,
        suffix: impl Into<String>,
    ) -> CounterRegistration {
        let suffix = suffix.into();
        let precision = spec.precision;
        self.animate(container, spec, move |value| {
            target.set_text(&precision.format(value, &suffix));
        })
    }

    /// Feed a visibility observation from the host
    ///
    /// Returns the number of counters this observation started.
    pub fn on_intersection(&self, event: IntersectionEvent) -> usize {
        let triggered: SmallVec<[(CounterId, Rc<RefCell<Counter>>); 4]> = {
            let inner = self.inner.borrow();
            let Some(ids) = inner.by_container.get(&event.container) else {
                return 0;
            };
            ids.iter()
                .filter_map(|id| {
                    let entry = inner.counters.get(*id)?;
                    let mut counter = entry.counter.borrow_mut();
                    counter
                        .gate
                        .observe(event.visible_fraction)
                        .then(|| (*id, Rc::clone(&entry.counter)))
                })
                .collect()
        };

        // Callbacks run without the animator borrowed
        for (id, counter) in triggered.iter() {
            let reduced = self.preference.query();
            {
                let mut counter = counter.borrow_mut();
                if reduced {
                    counter.finish();
                    continue;
                }
                counter.state = CounterState::Counting;
                counter.update();
                if counter.state == CounterState::Done {
                    continue;
                }
            }

            let task: SharedTask = counter.clone();
            let guard = self.scheduler.register_shared(task);
            if let Some(entry) = self.inner.borrow_mut().counters.get_mut(*id) {
                entry.task = Some(guard);
            }
        }

        if !triggered.is_empty() {
            tracing::debug!(
                "Started {} counter(s) in {}",
                triggered.len(),
                event.container
            );
        }
        triggered.len()
    }

    pub fn state(&self, id: CounterId) -> Option<CounterState> {
        self.inner
            .borrow()
            .counters
            .get(id)
            .map(|entry| entry.counter.borrow().state)
    }

    /// Number of registered counters
    pub fn len(&self) -> usize {
        self.inner.borrow().counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Disposer returned by [`CounterAnimator::animate`]
pub struct CounterRegistration {
    animator: Weak<RefCell<CounterInner>>,
    container: ContainerId,
    id: Option<CounterId>,
}

impl CounterRegistration {
    pub fn id(&self) -> Option<CounterId> {
        self.id
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Some(inner) = self.animator.upgrade() else {
            return;
        };

        let removed = {
            let mut inner = inner.borrow_mut();
            if let Some(ids) = inner.by_container.get_mut(&self.container) {
                ids.retain(|other| *other != id);
                if ids.is_empty() {
                    inner.by_container.remove(&self.container);
                }
            }
            inner.counters.remove(id)
        };
        drop(removed);
    }
}

impl Drop for CounterRegistration {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameScheduler;
    use lumen_core::SharedTarget;

    const FRAME: Duration = Duration::from_millis(16);

    fn recorder() -> (Rc<RefCell<Vec<f64>>>, impl FnMut(f64) + 'static) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&values);
        (values, move |v| sink.borrow_mut().push(v))
    }

    #[test]
    fn test_precision_for_target() {
        assert_eq!(Precision::for_target(150.0), Precision::Integer);
        assert_eq!(Precision::for_target(4.5), Precision::OneDecimal);
        assert_eq!(Precision::Integer.quantize(41.97), 41.0);
        assert_eq!(Precision::OneDecimal.quantize(4.46), 4.5);
        assert_eq!(Precision::OneDecimal.format(4.5, "%"), "4.5%");
        assert_eq!(Precision::Integer.format(42.0, "+"), "42+");
    }

    #[test]
    fn test_value_at_never_overshoots() {
        let spec = CounterSpec::new(4.5);
        for step in 0..=100 {
            let v = spec.value_at(step as f64 / 100.0);
            assert!(v <= 4.5);
        }
        assert_eq!(spec.value_at(1.0), 4.5);
    }

    #[test]
    fn test_integer_counter_is_exact() {
        let scheduler = FrameScheduler::new();
        let counters = CounterAnimator::new(scheduler.handle(), MotionPreference::full_motion());
        let (values, sink) = recorder();

        let spec = CounterSpec::new(150.0).duration(Duration::from_millis(500));
        let _reg = counters.animate(1, spec, sink);
        assert!(values.borrow().is_empty());

        assert_eq!(counters.on_intersection(IntersectionEvent::new(1, 1.0)), 1);
        scheduler.advance_by(Duration::from_millis(600), FRAME);

        let values = values.borrow();
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&150.0));
        assert!(values.iter().all(|v| v.fract() == 0.0));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_fractional_counter_uses_one_decimal() {
        let scheduler = FrameScheduler::new();
        let counters = CounterAnimator::new(scheduler.handle(), MotionPreference::full_motion());
        let (values, sink) = recorder();

        let spec = CounterSpec::new(4.5).duration(Duration::from_millis(300));
        let _reg = counters.animate(1, spec, sink);
        counters.on_intersection(IntersectionEvent::new(1, 1.0));
        scheduler.advance_by(Duration::from_millis(400), FRAME);

        let values = values.borrow();
        assert_eq!(values.last(), Some(&4.5));
        for v in values.iter() {
            assert!(((v * 10.0).round() - v * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reduced_motion_updates_once() {
        let scheduler = FrameScheduler::new();
        let counters = CounterAnimator::new(scheduler.handle(), MotionPreference::reduced());
        let (values, sink) = recorder();

        let _reg = counters.animate(1, CounterSpec::new(98.0), sink);
        counters.on_intersection(IntersectionEvent::new(1, 1.0));
        scheduler.advance_by(Duration::from_secs(3), FRAME);

        assert_eq!(*values.borrow(), vec![98.0]);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_counter_fires_once() {
        let scheduler = FrameScheduler::new();
        let counters = CounterAnimator::new(scheduler.handle(), MotionPreference::full_motion());
        let (values, sink) = recorder();

        let spec = CounterSpec::new(10.0).duration(Duration::from_millis(100));
        let reg = counters.animate(1, spec, sink);
        counters.on_intersection(IntersectionEvent::new(1, 1.0));
        scheduler.advance_by(Duration::from_millis(200), FRAME);
        let count = values.borrow().len();

        assert_eq!(counters.on_intersection(IntersectionEvent::new(1, 1.0)), 0);
        scheduler.advance_by(Duration::from_millis(200), FRAME);
        assert_eq!(values.borrow().len(), count);
        assert_eq!(counters.state(reg.id().unwrap()), Some(CounterState::Done));
    }

    #[test]
    fn test_zero_duration_jumps_to_target() {
        let scheduler = FrameScheduler::new();
        let counters = CounterAnimator::new(scheduler.handle(), MotionPreference::full_motion());
        let (values, sink) = recorder();

        let _reg = counters.animate(1, CounterSpec::new(7.0).duration(Duration::ZERO), sink);
        counters.on_intersection(IntersectionEvent::new(1, 1.0));

        assert_eq!(*values.borrow(), vec![7.0]);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_several_counters_share_a_container() {
        let scheduler = FrameScheduler::new();
        let counters = CounterAnimator::new(scheduler.handle(), MotionPreference::full_motion());
        let first = SharedTarget::new();
        let second = SharedTarget::new();

        let _a = counters.animate_text(3, CounterSpec::new(120.0), first.boxed(), "+");
        let _b = counters.animate_text(3, CounterSpec::new(4.8), second.boxed(), "");

        assert_eq!(counters.on_intersection(IntersectionEvent::new(3, 0.5)), 2);
        scheduler.advance_by(Duration::from_secs(2), FRAME);

        assert_eq!(first.text().as_deref(), Some("120+"));
        assert_eq!(second.text().as_deref(), Some("4.8"));
    }

    #[test]
    fn test_dispose_cancels_count() {
        let scheduler = FrameScheduler::new();
        let counters = CounterAnimator::new(scheduler.handle(), MotionPreference::full_motion());
        let (values, sink) = recorder();

        let reg = counters.animate(1, CounterSpec::new(500.0), sink);
        counters.on_intersection(IntersectionEvent::new(1, 1.0));
        scheduler.advance(FRAME);
        assert_eq!(scheduler.active_tasks(), 1);

        reg.dispose();
        assert_eq!(scheduler.active_tasks(), 0);
        assert!(counters.is_empty());

        let count = values.borrow().len();
        scheduler.advance(FRAME);
        assert_eq!(values.borrow().len(), count);
    }

    #[test]
    fn test_negative_target_counts_down() {
        let spec = CounterSpec::new(-20.0);
        assert_eq!(spec.value_at(0.0), 0.0);
        assert!(spec.value_at(0.5) < 0.0);
        assert!(spec.value_at(0.99) >= -20.0);
        assert_eq!(spec.value_at(1.0), -20.0);
    }

    #[test]
    fn test_negative_count_starts_at_plain_zero() {
        assert!(Precision::Integer.quantize(-0.4).is_sign_positive());
        assert!(Precision::OneDecimal.quantize(-0.04).is_sign_positive());
        assert_eq!(Precision::Integer.format(-0.0, ""), "0");

        let scheduler = FrameScheduler::new();
        let counters = CounterAnimator::new(scheduler.handle(), MotionPreference::full_motion());
        let target = SharedTarget::new();

        let _reg = counters.animate_text(1, CounterSpec::new(-20.0), target.boxed(), "");
        counters.on_intersection(IntersectionEvent::new(1, 1.0));
        assert_eq!(target.text().as_deref(), Some("0"));

        scheduler.advance_by(Duration::from_secs(3), FRAME);
        assert_eq!(target.text().as_deref(), Some("-20"));
    }
}
