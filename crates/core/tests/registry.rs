//! Public API tests driving the registry the way a game loop does

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gametimer_core::{OverrunPolicy, TimerConfig, TimerFlags, TimerRegistry};

#[test]
fn test_round_trip_over_sum_of_periods() {
    let timers = TimerRegistry::<u64>::new();
    let periods = [16u64, 33, 100, 250, 1000];
    let mut handles = Vec::new();

    for period in periods {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        let id = timers
            .set_interval(
                move || {
                    hits.fetch_add(1, Ordering::Relaxed);
                },
                period,
            )
            .unwrap();
        handles.push((id, count));
    }

    timers.update(periods.iter().sum()).unwrap();

    for (id, count) in &handles {
        assert!(count.load(Ordering::Relaxed) >= 1);
        assert!(timers.contains(*id));
    }
    assert_eq!(timers.len(), periods.len());
}

#[test]
fn test_fixed_step_frames_with_durations() {
    let timers = TimerRegistry::<Duration>::new();
    let frame = Duration::from_millis(16);

    let ticks = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&ticks);
    timers
        .set_interval(
            move || {
                hits.fetch_add(1, Ordering::Relaxed);
            },
            Duration::from_millis(100),
        )
        .unwrap();

    let done = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&done);
    let timeout = timers
        .set_timeout(
            move || {
                flag.fetch_add(1, Ordering::Relaxed);
            },
            Duration::from_millis(500),
        )
        .unwrap();

    // 63 frames of 16ms = 1008ms of virtual time
    for _ in 0..63 {
        timers.update(frame).unwrap();
    }

    assert_eq!(timers.now(), Duration::from_millis(1008));
    assert_eq!(ticks.load(Ordering::Relaxed), 10);
    assert_eq!(done.load(Ordering::Relaxed), 1);
    assert!(!timers.contains(timeout));
}

#[test]
fn test_paused_loop_does_not_advance_timers() {
    let timers = TimerRegistry::<f64>::new();
    let id = timers.set_timeout(|| {}, 1.0).unwrap();

    // A paused game simply stops calling update, or passes zero
    for _ in 0..10 {
        timers.update(0.0).unwrap();
    }

    assert_eq!(timers.elapsed(id), Some(0.0));
    assert!(timers.contains(id));
}

#[test]
fn test_registry_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TimerRegistry<Duration>>();
    assert_send_sync::<TimerRegistry<f32>>();
}

#[test]
fn test_scoped_timers_with_catch_up() {
    let timers = TimerRegistry::<u32>::with_config(TimerConfig {
        overrun: OverrunPolicy::CatchUp,
    });
    let count = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&count);

    timers
        .set_timer_with_flags(
            move || {
                hits.fetch_add(1, Ordering::Relaxed);
            },
            10,
            TimerFlags::REPEAT | TimerFlags::STOP_ON_RESET,
        )
        .unwrap();

    assert_eq!(timers.update(35).unwrap(), 3);
    assert_eq!(timers.reset(), 1);
    assert_eq!(timers.update(100).unwrap(), 0);
    assert_eq!(count.load(Ordering::Relaxed), 3);
}
