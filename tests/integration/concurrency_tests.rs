//! Concurrency tests: many producers, one sampler, one lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use envctl::MonitorError;
use envctl::fault::Severity;

use crate::mock_ports::{
    HISTORY_SIZE, RecordingFailSafe, ScriptedTasks, TOTAL_FAULT_IDS, initialised_monitor,
};

#[test]
fn parallel_producers_never_exceed_capacities() {
    let monitor = Arc::new(initialised_monitor());
    let producers: Vec<_> = (0..4u32)
        .map(|p| {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || {
                let mut accepted = 0u32;
                for i in 0..50u32 {
                    match monitor.report_fault((p * 50 + i) % TOTAL_FAULT_IDS, Severity::Low, i) {
                        Ok(()) => accepted += 1,
                        Err(MonitorError::LockTimeout) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                accepted
            })
        })
        .collect();

    let accepted: u32 = producers.into_iter().map(|h| h.join().unwrap()).sum();
    assert!(accepted > 0);

    let status = monitor.fault_status().unwrap();
    assert_eq!(
        status.historical_fault_count as usize,
        HISTORY_SIZE.min(accepted as usize)
    );
    assert!(status.active_faults.len() <= 4);
    assert_eq!(status.active_fault_count as usize, status.active_faults.len());
}

#[test]
fn readers_never_see_a_partial_report() {
    let monitor = Arc::new(initialised_monitor());
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let monitor = Arc::clone(&monitor);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                if let Ok(status) = monitor.fault_status() {
                    // Each report appends history and upserts active together;
                    // a single id means active count is 0 only with empty history.
                    assert_eq!(
                        status.active_fault_count == 0,
                        status.historical_fault_count == 0
                    );
                }
            }
        })
    };

    for i in 0..200u32 {
        let _ = monitor.report_fault(7, Severity::Medium, i);
    }
    done.store(true, Ordering::Release);
    reader.join().unwrap();
}

#[test]
fn sampler_and_producers_share_the_lock() {
    let monitor = Arc::new(initialised_monitor());
    let done = Arc::new(AtomicBool::new(false));

    let sampler = {
        let monitor = Arc::clone(&monitor);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let tasks = ScriptedTasks::controller();
            let mut fail_safe = RecordingFailSafe::default();
            while !done.load(Ordering::Acquire) {
                monitor.sample_and_evaluate(&tasks, &mut fail_safe);
                thread::sleep(Duration::from_millis(1));
            }
            fail_safe
        })
    };

    for i in 0..100u32 {
        let _ = monitor.report_fault(i % TOTAL_FAULT_IDS, Severity::High, i);
    }
    // Give the sampler at least one cycle with a high-severity fault active.
    thread::sleep(Duration::from_millis(20));
    done.store(true, Ordering::Release);

    let fail_safe = sampler.join().unwrap();
    assert!(fail_safe.calls.iter().all(|&enabled| enabled));
    assert!(!fail_safe.calls.is_empty());
    assert_eq!(monitor.get_min_free_stack(), 1_200);
}
