use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lumen_animation::{AmbientLoopController, FrameScheduler, RevealController, RevealOptions};
use lumen_core::{Easing, MotionPreference, SharedTarget};
use lumen_platform::IntersectionEvent;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

fn easing_benchmark(c: &mut Criterion) {
    c.bench_function("ease_out_cubic", |b| {
        b.iter(|| black_box(Easing::EaseOutCubic.apply(black_box(0.5))))
    });
}

fn ambient_tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ambient_tick");

    for count in [10, 100, 500].iter() {
        let scheduler = FrameScheduler::new();
        let loops = AmbientLoopController::new(scheduler.handle(), MotionPreference::full_motion());
        let handles: Vec<_> = (0..*count)
            .map(|i| {
                let target = SharedTarget::new();
                let ambient = loops
                    .breathe(target.boxed())
                    .with_phase_offset(Duration::from_millis(i as u64 * 37));
                loops.start(ambient)
            })
            .collect();

        group.bench_function(format!("{}_loops", count), |b| {
            b.iter(|| black_box(scheduler.advance(FRAME)))
        });
        drop(handles);
    }
    group.finish();
}

fn reveal_playback_benchmark(c: &mut Criterion) {
    c.bench_function("reveal_64_targets", |b| {
        b.iter(|| {
            let scheduler = FrameScheduler::new();
            let reveal = RevealController::new(scheduler.handle(), MotionPreference::full_motion());
            let targets = (0..64).map(|_| SharedTarget::new().boxed()).collect();
            let _registration = reveal.register(1, targets, RevealOptions::default());
            reveal.on_intersection(IntersectionEvent::new(1, 1.0));
            while scheduler.advance(FRAME) {}
            black_box(scheduler.frame_count())
        })
    });
}

criterion_group!(
    benches,
    easing_benchmark,
    ambient_tick_benchmark,
    reveal_playback_benchmark
);
criterion_main!(benches);
