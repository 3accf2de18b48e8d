//! Per-page motion runtime
//!
//! Bundles a scheduler, the reduced-motion preference and the viewport-driven
//! controllers so a host only has to forward intersection events and frames.

use std::time::Duration;

use lumen_core::{BoxedTarget, MotionConfig, MotionPreference};
use lumen_platform::IntersectionEvent;

use crate::ambient::AmbientLoopController;
use crate::counter::{CounterAnimator, CounterSpec};
use crate::hover::{HoverEffect, HoverMicroInteraction};
use crate::reveal::{RevealController, RevealOptions};
use crate::scheduler::{FrameScheduler, SchedulerHandle};

/// Owns everything animated on one page
pub struct MotionRuntime {
    scheduler: FrameScheduler,
    preference: MotionPreference,
    config: MotionConfig,
    reveal: RevealController,
    counters: CounterAnimator,
    ambient: AmbientLoopController,
}

impl MotionRuntime {
    pub fn new(config: MotionConfig, preference: MotionPreference) -> Self {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();

        Self {
            reveal: RevealController::new(handle.clone(), preference.clone()),
            counters: CounterAnimator::new(handle.clone(), preference.clone()),
            ambient: AmbientLoopController::with_config(
                handle,
                preference.clone(),
                config.ambient.clone(),
            ),
            scheduler,
            preference,
            config,
        }
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    pub fn preference(&self) -> &MotionPreference {
        &self.preference
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn reveal(&self) -> &RevealController {
        &self.reveal
    }

    pub fn counters(&self) -> &CounterAnimator {
        &self.counters
    }

    pub fn ambient(&self) -> &AmbientLoopController {
        &self.ambient
    }

    /// Reveal options from the configured defaults
    pub fn reveal_options(&self) -> RevealOptions {
        RevealOptions::from(&self.config.reveal)
    }

    /// Counter spec from the configured defaults
    pub fn counter_spec(&self, target: f64) -> CounterSpec {
        CounterSpec::from_config(target, &self.config.counter)
    }

    /// Hover interaction using the configured timing
    pub fn hover(&self, target: BoxedTarget, effect: HoverEffect) -> HoverMicroInteraction {
        HoverMicroInteraction::new(
            self.scheduler.handle(),
            self.preference.clone(),
            target,
            effect,
            &self.config.hover,
        )
    }

    /// Forward a visibility observation to reveals and counters
    ///
    /// Returns true if anything was triggered.
    pub fn dispatch(&self, event: IntersectionEvent) -> bool {
        let revealed = self.reveal.on_intersection(event);
        let counted = self.counters.on_intersection(event);
        revealed || counted > 0
    }

    /// Step all motion by `dt`. Returns true while anything is animating.
    pub fn advance(&self, dt: Duration) -> bool {
        self.scheduler.advance(dt)
    }

    /// Step all motion by the wall time since the previous frame
    pub fn tick(&self) -> bool {
        self.scheduler.tick()
    }

    /// Re-read the reduced-motion preference after a host notification
    ///
    /// Running work observes the new value on its next frame.
    pub fn refresh_preference(&self) -> bool {
        self.preference.refresh()
    }

    /// Number of live frame tasks
    pub fn active_tasks(&self) -> usize {
        self.scheduler.active_tasks()
    }
}

impl Default for MotionRuntime {
    fn default() -> Self {
        Self::new(MotionConfig::default(), MotionPreference::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{SharedPreference, SharedTarget};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_reaches_reveal_and_counter() {
        let runtime = MotionRuntime::default();
        let heading = SharedTarget::new();
        let last = Rc::new(Cell::new(0.0));

        let _reveal = runtime
            .reveal()
            .register(1, vec![heading.boxed()], runtime.reveal_options());
        let sink = Rc::clone(&last);
        let _counter = runtime
            .counters()
            .animate(1, runtime.counter_spec(250.0), move |v| sink.set(v));

        assert!(runtime.dispatch(IntersectionEvent::new(1, 1.0)));
        assert_eq!(runtime.active_tasks(), 2);

        runtime
            .scheduler()
            .advance_by(Duration::from_secs(2), Duration::from_millis(16));
        assert_eq!(heading.opacity(), 1.0);
        assert_eq!(last.get(), 250.0);
        assert_eq!(runtime.active_tasks(), 0);
    }

    #[test]
    fn test_dispatch_for_unknown_container() {
        let runtime = MotionRuntime::default();
        assert!(!runtime.dispatch(IntersectionEvent::new(99, 1.0)));
    }

    #[test]
    fn test_refresh_preference() {
        let cell = SharedPreference::new(None);
        let runtime = MotionRuntime::new(
            MotionConfig::default(),
            MotionPreference::new(cell.clone()),
        );
        assert!(!runtime.refresh_preference());

        cell.set(Some(true));
        assert!(runtime.refresh_preference());
        assert!(runtime.preference().query());
    }

    #[test]
    fn test_ambient_uses_configured_range() {
        let mut config = MotionConfig::default();
        config.ambient.breathe_peak = 1.2;
        let runtime = MotionRuntime::new(config, MotionPreference::full_motion());
        let glow = SharedTarget::new();

        let _handle = runtime.ambient().start(runtime.ambient().breathe(glow.boxed()));
        // Peak of a 4s period
        runtime.advance(Duration::from_secs(2));
        assert!((glow.transform().scale_x - 1.2).abs() < 1e-4);
    }
}
