//! Mock port adapters for integration tests.
//!
//! The clock only moves when a test moves it, the task table is scripted,
//! and the fail-safe port records every call so tests can assert on the
//! full escalation history.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use envctl::app::ports::{Clock, FailSafePort, TaskIntrospection, TaskSample, TaskSnapshot};
use envctl::config::MonitorConfig;
use envctl::monitor::SystemMonitor;

// ── ManualClock ───────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn uptime_ms(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

// ── ScriptedTasks ─────────────────────────────────────────────

pub struct ScriptedTasks {
    snapshot: Mutex<TaskSnapshot>,
}

impl ScriptedTasks {
    pub fn new(tasks: Vec<TaskSample>, total_runtime_ticks: u64) -> Self {
        Self {
            snapshot: Mutex::new(TaskSnapshot {
                tasks,
                total_runtime_ticks,
            }),
        }
    }

    /// A small controller: two workers plus one idle task per core.
    pub fn controller() -> Self {
        Self::new(
            vec![
                TaskSample::new("main", 1_000, 4_000),
                TaskSample::new("sys_mon", 300, 1_000),
                TaskSample::new("IDLE0", 400, 3_000),
                TaskSample::new("IDLE1", 450, 2_000),
            ],
            5_000,
        )
    }

    pub fn set_total_runtime(&self, ticks: u64) {
        self.snapshot.lock().unwrap().total_runtime_ticks = ticks;
    }
}

impl TaskIntrospection for ScriptedTasks {
    fn snapshot(&self) -> TaskSnapshot {
        self.snapshot.lock().unwrap().clone()
    }
}

// ── RecordingFailSafe ─────────────────────────────────────────

#[derive(Default)]
pub struct RecordingFailSafe {
    pub calls: Vec<bool>,
}

impl FailSafePort for RecordingFailSafe {
    fn set_fail_safe_mode(&mut self, enabled: bool) {
        self.calls.push(enabled);
    }
}

// ── Monitor fixtures ──────────────────────────────────────────

pub const HISTORY_SIZE: usize = 8;
pub const MAX_ACTIVE_FAULTS: usize = 4;
pub const TOTAL_FAULT_IDS: u32 = 32;

pub type TestMonitor = SystemMonitor<ManualClock, HISTORY_SIZE, MAX_ACTIVE_FAULTS>;

pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        total_fault_ids: TOTAL_FAULT_IDS,
        lock_timeout_ms: 20,
        ..MonitorConfig::default()
    }
}

pub fn initialised_monitor() -> TestMonitor {
    let monitor = TestMonitor::new(test_config(), ManualClock::default());
    monitor.init().expect("valid test config");
    monitor
}
