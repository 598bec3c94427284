use std::sync::Arc;
use std::thread;

use cathode_core::core::clock::Clock;

// ==========================================================================
// Counters
// ==========================================================================

#[test]
fn test_counters_start_at_zero_and_advance() {
    let clock = Clock::new();

    assert_eq!(clock.now(), 0);
    assert_eq!(clock.io_now(), 0);
    assert!(clock.io_caught_up());

    clock.advance();
    clock.advance();
    assert_eq!(clock.now(), 2);
    assert!(!clock.io_caught_up());

    clock.io_advance();
    clock.io_advance();
    assert!(clock.io_caught_up());
}

#[test]
fn test_wait_io_catchup_returns_when_caught_up() {
    let clock = Clock::new();
    // Nothing outstanding: must not block
    clock.wait_io_catchup();

    clock.advance();
    clock.io_advance();
    clock.wait_io_catchup();
}

#[test]
fn test_wait_io_catchup_falls_through_on_stop() {
    let clock = Clock::new();
    clock.advance(); // dispatcher never catches up
    clock.request_stop();
    clock.wait_io_catchup();
    assert!(!clock.is_running());
}

#[test]
fn test_unstick_issues_one_tick() {
    let clock = Clock::new();
    clock.unstick();
    assert_eq!(clock.now(), 1);
}

// ==========================================================================
// Two-role hand-off
// ==========================================================================

#[test]
fn test_lock_step_hand_off_between_threads() {
    const TICKS: u64 = 10_000;
    let clock = Arc::new(Clock::new());

    // Dispatcher role: process exactly one quantum per issued tick
    let io = {
        let clock = Arc::clone(&clock);
        thread::spawn(move || {
            for _ in 0..TICKS {
                while clock.io_caught_up() {
                    std::hint::spin_loop();
                }
                clock.io_advance();
            }
        })
    };

    // Bus role: advance and hold for catch-up every tick
    for _ in 0..TICKS {
        clock.advance();
        clock.wait_io_catchup();
        assert_eq!(clock.io_now(), clock.now());
    }

    io.join().unwrap();
    assert_eq!(clock.now(), TICKS);
    assert_eq!(clock.io_now(), TICKS);
}
