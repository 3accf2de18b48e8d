//! Lumen Animation System
//!
//! Viewport-reactive motion driven by a single-threaded frame scheduler.
//!
//! # Features
//!
//! - **Frame Scheduler**: slotmap-backed task arena with RAII [`TaskGuard`]s
//! - **Reveals**: one-shot staggered entrances when a container scrolls into view
//! - **Counters**: eased numeric count-ups with exact final values
//! - **Ambient Loops**: breathe, orbit and streak loops that repeat until stopped
//! - **Hover**: reversible hover/focus micro-interactions
//! - **Reduced Motion**: every component settles instantly when motion is reduced
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use lumen_animation::MotionRuntime;
//! use lumen_core::SharedTarget;
//! use lumen_platform::IntersectionEvent;
//!
//! let runtime = MotionRuntime::default();
//! let card = SharedTarget::new();
//! let _reveal = runtime
//!     .reveal()
//!     .register(1, vec![card.boxed()], runtime.reveal_options());
//!
//! runtime.dispatch(IntersectionEvent::new(1, 0.5));
//! while runtime.advance(Duration::from_millis(16)) {}
//!
//! assert_eq!(card.opacity(), 1.0);
//! assert_eq!(runtime.active_tasks(), 0);
//! ```

pub mod ambient;
pub mod counter;
pub mod gate;
pub mod hover;
pub mod reveal;
pub mod runtime;
pub mod scheduler;

pub use ambient::{
    AmbientLoop, AmbientLoopController, BreatheChannel, LoopHandle, LoopKind, OrbitCompanion,
    OrbitDirection,
};
pub use counter::{
    CounterAnimator, CounterId, CounterRegistration, CounterSpec, CounterState, Precision,
};
pub use gate::ViewportGate;
pub use hover::{HoverEffect, HoverMicroInteraction};
pub use reveal::{RevealController, RevealGroupId, RevealOptions, RevealRegistration, RevealState};
pub use runtime::MotionRuntime;
pub use scheduler::{
    FrameScheduler, FrameTask, SchedulerHandle, SharedTask, TaskGuard, TaskId, TaskStatus,
};
