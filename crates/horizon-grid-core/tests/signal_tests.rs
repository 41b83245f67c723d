//! Tests for signals and debounce timers through the public API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use horizon_grid_core::{DebounceTimer, Signal, TimerError};

#[test]
fn test_signal_shared_across_threads() {
    let signal = Arc::new(Signal::<usize>::new());
    let total = Arc::new(AtomicUsize::new(0));

    let total_clone = total.clone();
    signal.connect(move |&n| {
        total_clone.fetch_add(n, Ordering::SeqCst);
    });

    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let signal = signal.clone();
            thread::spawn(move || signal.emit(n))
        })
        .collect();
    for handle in handles {
        handle.join().expect("emitter thread panicked");
    }

    assert_eq!(total.load(Ordering::SeqCst), 10);
}

#[test]
fn test_slots_run_in_connection_order() {
    let signal = Signal::<()>::new();
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = order.clone();
        signal.connect(move |_| order.lock().push(tag));
    }

    signal.emit(());
    assert_eq!(*order.lock(), vec!["first", "second", "third"]);

    signal.disconnect_all();
    signal.emit(());
    assert_eq!(order.lock().len(), 3);
}

#[test]
fn test_debounced_emission() {
    let signal = Signal::<u32>::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let fired_clone = fired.clone();
    signal.connect(move |_| {
        fired_clone.fetch_add(1, Ordering::SeqCst);
    });

    let mut timer = DebounceTimer::new(Duration::from_millis(16));
    let start = Instant::now();
    let stale = timer.schedule(start);
    timer.schedule(start + Duration::from_millis(8));
    assert_eq!(timer.cancel_handle(stale), Err(TimerError::StaleHandle));

    let mut now = start;
    for _ in 0..10 {
        now += Duration::from_millis(4);
        if timer.poll(now).is_some() {
            signal.emit(1);
        }
    }
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
