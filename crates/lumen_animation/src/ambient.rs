//! Ambient loops
//!
//! Decorative motion that repeats until stopped:
//!
//! - **Breathe**: scale or opacity oscillating between a baseline and a peak
//! - **Orbit**: continuous rotation, optionally with a concentric companion
//! - **Streak**: a bar sweeping across its container, then resting
//!
//! Loops are suppressed under reduced motion; the target receives its resting
//! state once and no frame task is registered. A loop that is already running
//! parks at rest while motion is reduced and resumes when it is allowed again.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use lumen_core::{ms, AmbientConfig, BoxedTarget, Easing, MotionPreference, Transform};

use crate::scheduler::{FrameTask, SchedulerHandle, TaskGuard, TaskStatus};

/// Property a breathing loop drives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreatheChannel {
    #[default]
    Scale,
    Opacity,
}

/// Rotation direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrbitDirection {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl OrbitDirection {
    fn sign(self) -> f32 {
        match self {
            OrbitDirection::Clockwise => 1.0,
            OrbitDirection::CounterClockwise => -1.0,
        }
    }
}

/// Concentric element rotating alongside an orbit at its own pace
pub struct OrbitCompanion {
    pub target: BoxedTarget,
    pub period: Duration,
    pub direction: OrbitDirection,
}

/// Shape of an ambient loop
pub enum LoopKind {
    Breathe {
        baseline: f32,
        peak: f32,
        channel: BreatheChannel,
    },
    Orbit {
        direction: OrbitDirection,
        companion: Option<OrbitCompanion>,
    },
    Streak {
        /// Offset where the sweep starts (off one edge)
        from: f32,
        /// Offset where the sweep ends (past the other edge)
        to: f32,
        /// Fraction of each period spent parked between sweeps
        pause_fraction: f32,
    },
}

/// A loop ready to be started
pub struct AmbientLoop {
    pub kind: LoopKind,
    pub period: Duration,
    /// Shifts the loop's phase so neighbouring loops don't move in lockstep
    pub phase_offset: Duration,
    pub target: BoxedTarget,
}

impl AmbientLoop {
    /// Scale breathing between 1.0 and 1.06
    pub fn breathe(target: BoxedTarget, period: Duration) -> Self {
        Self {
            kind: LoopKind::Breathe {
                baseline: 1.0,
                peak: 1.06,
                channel: BreatheChannel::Scale,
            },
            period,
            phase_offset: Duration::ZERO,
            target,
        }
    }

    pub fn orbit(target: BoxedTarget, period: Duration, direction: OrbitDirection) -> Self {
        Self {
            kind: LoopKind::Orbit {
                direction,
                companion: None,
            },
            period,
            phase_offset: Duration::ZERO,
            target,
        }
    }

    /// Sweep from -20 to 120, past both edges of a 0..100 container, with the
    /// bar parked for 60% of each period
    pub fn streak(target: BoxedTarget, period: Duration) -> Self {
        Self {
            kind: LoopKind::Streak {
                from: -20.0,
                to: 120.0,
                pause_fraction: 0.6,
            },
            period,
            phase_offset: Duration::ZERO,
            target,
        }
    }

    pub fn with_phase_offset(mut self, offset: Duration) -> Self {
        self.phase_offset = offset;
        self
    }

    /// Set the breathing range. Ignored by other loop kinds.
    pub fn with_range(mut self, baseline: f32, peak: f32) -> Self {
        if let LoopKind::Breathe {
            baseline: b,
            peak: p,
            ..
        } = &mut self.kind
        {
            *b = baseline;
            *p = peak;
        }
        self
    }

    /// Set the breathing channel. Ignored by other loop kinds.
    pub fn with_channel(mut self, channel: BreatheChannel) -> Self {
        if let LoopKind::Breathe { channel: c, .. } = &mut self.kind {
            *c = channel;
        }
        self
    }

    /// Add a concentric companion. Ignored by other loop kinds.
    pub fn with_companion(
        mut self,
        target: BoxedTarget,
        period: Duration,
        direction: OrbitDirection,
    ) -> Self {
        if let LoopKind::Orbit { companion, .. } = &mut self.kind {
            *companion = Some(OrbitCompanion {
                target,
                period,
                direction,
            });
        }
        self
    }

    /// Set the sweep range. Ignored by other loop kinds.
    pub fn with_travel(mut self, from: f32, to: f32) -> Self {
        if let LoopKind::Streak {
            from: f, to: t, ..
        } = &mut self.kind
        {
            *f = from;
            *t = to;
        }
        self
    }

    /// Set the parked fraction of each streak period. Ignored by other loop kinds.
    pub fn with_pause_fraction(mut self, fraction: f32) -> Self {
        if let LoopKind::Streak { pause_fraction, .. } = &mut self.kind {
            *pause_fraction = fraction;
        }
        self
    }
}

/// Position within a period, in `[0, 1)`
fn phase(elapsed: Duration, period: Duration) -> f32 {
    let period = period.as_nanos();
    if period == 0 {
        return 0.0;
    }
    (elapsed.as_nanos() % period) as f32 / period as f32
}

/// 0 → 1 → 0 over one period
fn triangle(phase: f32) -> f32 {
    if phase < 0.5 {
        phase * 2.0
    } else {
        2.0 - phase * 2.0
    }
}

struct AmbientTask {
    kind: LoopKind,
    period: Duration,
    elapsed: Duration,
    target: BoxedTarget,
    preference: MotionPreference,
    running: Rc<Cell<bool>>,
}

impl AmbientTask {
    fn apply(&mut self) {
        let p = phase(self.elapsed, self.period);

        match &mut self.kind {
            LoopKind::Breathe {
                baseline,
                peak,
                channel,
            } => {
                let value =
                    *baseline + (*peak - *baseline) * Easing::EaseInOutSine.apply(triangle(p));
                match channel {
                    BreatheChannel::Scale => self.target.set_transform(Transform::scale(value)),
                    BreatheChannel::Opacity => self.target.set_opacity(value),
                }
            }
            LoopKind::Orbit {
                direction,
                companion,
            } => {
                self.target
                    .set_transform(Transform::rotate(360.0 * p * direction.sign()));
                if let Some(companion) = companion {
                    let cp = phase(self.elapsed, companion.period);
                    companion
                        .target
                        .set_transform(Transform::rotate(360.0 * cp * companion.direction.sign()));
                }
            }
            LoopKind::Streak {
                from,
                to,
                pause_fraction,
            } => {
                let sweep = 1.0 - pause_fraction.clamp(0.0, 0.99);
                if p < sweep {
                    let t = p / sweep;
                    self.target.set_opacity(1.0);
                    self.target
                        .set_transform(Transform::translate(*from + (*to - *from) * t, 0.0));
                } else {
                    self.target.set_opacity(0.0);
                    self.target.set_transform(Transform::translate(*from, 0.0));
                }
            }
        }
    }

    /// Resting state shown when motion is reduced
    fn rest(&mut self) {
        match &mut self.kind {
            LoopKind::Breathe {
                baseline, channel, ..
            } => match channel {
                BreatheChannel::Scale => self.target.set_transform(Transform::scale(*baseline)),
                BreatheChannel::Opacity => self.target.set_opacity(*baseline),
            },
            LoopKind::Orbit { companion, .. } => {
                self.target.set_transform(Transform::IDENTITY);
                if let Some(companion) = companion {
                    companion.target.set_transform(Transform::IDENTITY);
                }
            }
            LoopKind::Streak { from, .. } => {
                self.target.set_opacity(0.0);
                self.target.set_transform(Transform::translate(*from, 0.0));
            }
        }
    }
}

impl FrameTask for AmbientTask {
    fn tick(&mut self, dt: Duration) -> TaskStatus {
        // Parked loops stay registered so they can resume
        if self.preference.query() {
            if self.running.replace(false) {
                self.rest();
                tracing::debug!("Ambient loop parked (reduced motion)");
            }
            return TaskStatus::Continue;
        }

        if !self.running.replace(true) {
            tracing::debug!("Ambient loop resumed");
        }
        self.elapsed += dt;
        self.apply();
        TaskStatus::Continue
    }
}

/// Owns a running loop; dropping it stops the loop
pub struct LoopHandle {
    guard: TaskGuard,
    running: Rc<Cell<bool>>,
}

impl LoopHandle {
    fn inert() -> Self {
        Self {
            guard: TaskGuard::inert(),
            running: Rc::new(Cell::new(false)),
        }
    }

    /// False once stopped, and while parked under reduced motion
    pub fn is_running(&self) -> bool {
        self.running.get() && self.guard.is_active()
    }

    /// Stop the loop. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.guard.cancel();
        self.running.set(false);
    }
}

impl std::fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopHandle")
            .field("running", &self.is_running())
            .finish()
    }
}

/// Starts and stops decorative loops
#[derive(Clone)]
pub struct AmbientLoopController {
    scheduler: SchedulerHandle,
    preference: MotionPreference,
    config: AmbientConfig,
}

impl AmbientLoopController {
    pub fn new(scheduler: SchedulerHandle, preference: MotionPreference) -> Self {
        Self::with_config(scheduler, preference, AmbientConfig::default())
    }

    pub fn with_config(
        scheduler: SchedulerHandle,
        preference: MotionPreference,
        config: AmbientConfig,
    ) -> Self {
        Self {
            scheduler,
            preference,
            config,
        }
    }

    /// Breathing loop using the configured period and range
    pub fn breathe(&self, target: BoxedTarget) -> AmbientLoop {
        AmbientLoop::breathe(target, ms(self.config.breathe_period_ms))
            .with_range(self.config.breathe_baseline, self.config.breathe_peak)
    }

    /// Orbit using the configured period
    pub fn orbit(&self, target: BoxedTarget, direction: OrbitDirection) -> AmbientLoop {
        AmbientLoop::orbit(target, ms(self.config.orbit_period_ms), direction)
    }

    /// Streak using the configured period and pause
    pub fn streak(&self, target: BoxedTarget) -> AmbientLoop {
        AmbientLoop::streak(target, ms(self.config.streak_period_ms))
            .with_pause_fraction(self.config.streak_pause_fraction)
    }

    /// Start a loop
    ///
    /// Under reduced motion the target is put in its resting state and the
    /// returned handle is not running. A zero period is rejected the same way.
    pub fn start(&self, ambient: AmbientLoop) -> LoopHandle {
        let AmbientLoop {
            kind,
            period,
            phase_offset,
            target,
        } = ambient;

        let running = Rc::new(Cell::new(false));
        let mut task = AmbientTask {
            kind,
            period,
            elapsed: phase_offset,
            target,
            preference: self.preference.clone(),
            running: Rc::clone(&running),
        };

        if period.is_zero() {
            tracing::warn!("Ambient loop with a zero period; leaving target at rest");
            task.rest();
            return LoopHandle::inert();
        }

        if self.preference.query() {
            task.rest();
            tracing::debug!("Ambient loop suppressed (reduced motion)");
            return LoopHandle::inert();
        }

        task.apply();
        running.set(true);
        let guard = self.scheduler.register(task);
        tracing::debug!("Ambient loop started (period {:?})", period);

        LoopHandle { guard, running }
    }

    /// Stop a loop. Idempotent; equivalent to [`LoopHandle::stop`].
    pub fn stop(&self, handle: &mut LoopHandle) {
        if handle.is_running() {
            tracing::debug!("Ambient loop stopped");
        }
        handle.stop();
    }
}
