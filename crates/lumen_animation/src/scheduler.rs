//! Frame scheduler
//!
//! Drives every active motion task once per frame on a single thread.
//! Tasks are registered explicitly and owned through a [`TaskGuard`]:
//! - `FrameScheduler::advance(dt)` - step all tasks by a known delta (tests, headless hosts)
//! - `FrameScheduler::tick()` - step by the wall time since the previous frame
//!
//! There is no process-global scheduler. Each page (or test) owns one and
//! hands out weak [`SchedulerHandle`]s to its components.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle to a registered frame task
    pub struct TaskId;
}

/// Whether a task wants another frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Tick again next frame
    Continue,
    /// Finished; the scheduler drops the task
    Done,
}

/// Work performed once per frame
pub trait FrameTask {
    /// Advance by `dt` and report whether more frames are needed
    fn tick(&mut self, dt: Duration) -> TaskStatus;
}

impl<F> FrameTask for F
where
    F: FnMut(Duration) -> TaskStatus,
{
    fn tick(&mut self, dt: Duration) -> TaskStatus {
        self(dt)
    }
}

/// Shared task as stored by the scheduler
pub type SharedTask = Rc<RefCell<dyn FrameTask>>;

// ============================================================================
// Scheduler
// ============================================================================

/// Internal state of the frame scheduler
struct SchedulerInner {
    tasks: SlotMap<TaskId, SharedTask>,
    /// Virtual time accumulated through `advance`
    clock: Duration,
    last_frame: Instant,
    frames: u64,
}

/// The scheduler that ticks all active frame tasks
///
/// Owned by the page (or [`crate::MotionRuntime`]); components receive a
/// [`SchedulerHandle`] and register tasks through it.
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                tasks: SlotMap::with_key(),
                clock: Duration::ZERO,
                last_frame: Instant::now(),
                frames: 0,
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Step every task by the wall time elapsed since the previous frame
    ///
    /// Returns true if any tasks are still active.
    pub fn tick(&self) -> bool {
        let dt = {
            let mut inner = self.inner.borrow_mut();
            let now = Instant::now();
            let dt = now - inner.last_frame;
            inner.last_frame = now;
            dt
        };
        self.advance(dt)
    }

    /// Step every task by `dt`
    ///
    /// Tasks registered during this frame first run on the next one. A task
    /// cancelled by an earlier task in the same frame is skipped.
    ///
    /// Returns true if any tasks are still active.
    pub fn advance(&self, dt: Duration) -> bool {
        let due: SmallVec<[(TaskId, SharedTask); 16]> = {
            let mut inner = self.inner.borrow_mut();
            inner.clock += dt;
            inner.frames += 1;
            inner
                .tasks
                .iter()
                .map(|(id, task)| (id, Rc::clone(task)))
                .collect()
        };

        for (id, task) in due {
            if !self.inner.borrow().tasks.contains_key(id) {
                continue;
            }

            let status = task.borrow_mut().tick(dt);

            if status == TaskStatus::Done {
                // Release the scheduler borrow before the task is dropped
                let finished = self.inner.borrow_mut().tasks.remove(id);
                drop(finished);
                tracing::trace!("Frame task {:?} finished", id);
            }
        }

        self.has_active_tasks()
    }

    /// Advance in fixed steps until `total` has elapsed
    ///
    /// Convenience for headless hosts that want frame-accurate playback.
    pub fn advance_by(&self, total: Duration, frame: Duration) -> bool {
        if frame.is_zero() {
            return self.advance(total);
        }

        let mut remaining = total;
        while remaining > Duration::ZERO {
            let step = remaining.min(frame);
            self.advance(step);
            remaining -= step;
        }
        self.has_active_tasks()
    }

    /// Check if any tasks are registered
    pub fn has_active_tasks(&self) -> bool {
        !self.inner.borrow().tasks.is_empty()
    }

    /// Number of registered tasks
    pub fn active_tasks(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Virtual time accumulated so far
    pub fn now(&self) -> Duration {
        self.inner.borrow().clock
    }

    /// Number of frames stepped so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frames
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Handle
// ============================================================================

/// A weak handle to the frame scheduler
///
/// This is passed to components that need to register tasks.
/// It won't keep the scheduler alive; every operation on a dropped scheduler
/// is a no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// A handle that is never alive (components built without a scheduler)
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// Register a task and return the guard that owns it
    pub fn register(&self, task: impl FrameTask + 'static) -> TaskGuard {
        self.register_shared(Rc::new(RefCell::new(task)))
    }

    /// Register a task that the caller also holds a reference to
    ///
    /// Used by components whose state is both ticked by the scheduler and
    /// mutated through their public API.
    pub fn register_shared(&self, task: SharedTask) -> TaskGuard {
        let id = self.inner.upgrade().map(|inner| {
            let mut guard = inner.borrow_mut();
            // Avoid a huge first dt when the scheduler was idle
            if guard.tasks.is_empty() {
                guard.last_frame = Instant::now();
            }
            guard.tasks.insert(task)
        });

        if id.is_none() {
            tracing::debug!("Frame task registered on a dropped scheduler; ignoring");
        }

        TaskGuard {
            handle: self.clone(),
            id,
        }
    }

    /// Remove a task. Unknown or already-finished ids are ignored.
    pub fn cancel(&self, id: TaskId) {
        if let Some(inner) = self.inner.upgrade() {
            let removed = inner.borrow_mut().tasks.remove(id);
            drop(removed);
        }
    }

    /// Check if a task is still registered
    pub fn contains(&self, id: TaskId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().tasks.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of registered tasks (0 once the scheduler is gone)
    pub fn active_tasks(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().tasks.len())
            .unwrap_or(0)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// ============================================================================
// Task Guard
// ============================================================================

/// Owns a registered frame task
///
/// Dropping the guard cancels the task, so components that hold their
/// guards cannot leak running frame callbacks past unmount.
pub struct TaskGuard {
    handle: SchedulerHandle,
    id: Option<TaskId>,
}

impl TaskGuard {
    /// A guard that owns nothing
    pub fn inert() -> Self {
        Self {
            handle: SchedulerHandle::detached(),
            id: None,
        }
    }

    pub fn id(&self) -> Option<TaskId> {
        self.id
    }

    /// Check if the task is still registered (not finished, not cancelled)
    pub fn is_active(&self) -> bool {
        self.id.map(|id| self.handle.contains(id)).unwrap_or(false)
    }

    /// Cancel the task. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.cancel(id);
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for TaskGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGuard")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn test_scheduler_tick() {
        let scheduler = FrameScheduler::new();
        let ticks = Rc::new(Cell::new(0));

        let counter = Rc::clone(&ticks);
        let _guard = scheduler.handle().register(move |_dt: Duration| {
            counter.set(counter.get() + 1);
            TaskStatus::Continue
        });

        assert!(scheduler.advance(FRAME));
        assert!(scheduler.advance(FRAME));
        assert_eq!(ticks.get(), 2);
        assert_eq!(scheduler.now(), FRAME * 2);
        assert_eq!(scheduler.frame_count(), 2);
    }

    #[test]
    fn test_done_tasks_are_removed() {
        let scheduler = FrameScheduler::new();
        let guard = scheduler
            .handle()
            .register(|_dt: Duration| TaskStatus::Done);

        assert!(guard.is_active());
        assert!(!scheduler.advance(FRAME));
        assert!(!guard.is_active());
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_dropping_guard_cancels() {
        let scheduler = FrameScheduler::new();
        let guard = scheduler
            .handle()
            .register(|_dt: Duration| TaskStatus::Continue);
        assert_eq!(scheduler.active_tasks(), 1);

        drop(guard);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let scheduler = FrameScheduler::new();
        let mut guard = scheduler
            .handle()
            .register(|_dt: Duration| TaskStatus::Continue);

        guard.cancel();
        guard.cancel();
        assert!(!guard.is_active());
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_stale_id_does_not_cancel_new_task() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();

        let mut first = handle.register(|_dt: Duration| TaskStatus::Continue);
        let stale = first.id().unwrap();
        first.cancel();

        let second = handle.register(|_dt: Duration| TaskStatus::Continue);
        handle.cancel(stale);

        assert!(second.is_active());
    }

    #[test]
    fn test_task_cancelled_mid_frame_is_skipped() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let victim_ticks = Rc::new(Cell::new(0));

        let victim: Rc<RefCell<Option<TaskGuard>>> = Rc::new(RefCell::new(None));

        // Registered first, so it runs before the victim in slot order
        let slot = Rc::clone(&victim);
        let _killer = handle.register(move |_dt: Duration| {
            slot.borrow_mut().take();
            TaskStatus::Done
        });

        let counter = Rc::clone(&victim_ticks);
        *victim.borrow_mut() = Some(handle.register(move |_dt: Duration| {
            counter.set(counter.get() + 1);
            TaskStatus::Continue
        }));

        scheduler.advance(FRAME);
        scheduler.advance(FRAME);
        assert_eq!(victim_ticks.get(), 0);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_registration_during_tick_runs_next_frame() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let spawned = Rc::new(RefCell::new(None));
        let child_ticks = Rc::new(Cell::new(0));

        let slot = Rc::clone(&spawned);
        let inner_handle = handle.clone();
        let counter = Rc::clone(&child_ticks);
        let _parent = handle.register(move |_dt: Duration| {
            let counter = Rc::clone(&counter);
            *slot.borrow_mut() = Some(inner_handle.register(move |_dt: Duration| {
                counter.set(counter.get() + 1);
                TaskStatus::Continue
            }));
            TaskStatus::Done
        });

        scheduler.advance(FRAME);
        assert_eq!(child_ticks.get(), 0);
        scheduler.advance(FRAME);
        assert_eq!(child_ticks.get(), 1);
    }

    #[test]
    fn test_advance_by_steps_in_frames() {
        let scheduler = FrameScheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ticks);
        let _guard = scheduler.handle().register(move |_dt: Duration| {
            counter.set(counter.get() + 1);
            TaskStatus::Continue
        });

        scheduler.advance_by(Duration::from_millis(100), FRAME);
        // 6 full frames + one 4ms remainder
        assert_eq!(ticks.get(), 7);
        assert_eq!(scheduler.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = FrameScheduler::new();
            scheduler.handle()
        };

        // Scheduler is dropped, handle should not be alive
        assert!(!handle.is_alive());

        // Operations should safely no-op
        let guard = handle.register(|_dt: Duration| TaskStatus::Continue);
        assert!(guard.id().is_none());
        assert!(!guard.is_active());
        assert_eq!(handle.active_tasks(), 0);
    }

    #[test]
    fn test_guard_outliving_scheduler() {
        let scheduler = FrameScheduler::new();
        let guard = scheduler
            .handle()
            .register(|_dt: Duration| TaskStatus::Continue);
        drop(scheduler);
        drop(guard);
    }
}
