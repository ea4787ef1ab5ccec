//! Port traits — the boundary between the fault monitor and the runtime
//! hosting it.
//!
//! ```text
//!   Clock ─────────────┐
//!                      ▼
//!   TaskIntrospection ─▶ SystemMonitor ──▶ FailSafePort
//! ```
//!
//! The clock is owned by the monitor (every report needs a timestamp).
//! Task introspection and the fail-safe service are passed in at the
//! sampling call site, so the periodic task owns them and the monitor
//! never touches the RTOS directly.

use heapless::String;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: system timer → monitor)
// ───────────────────────────────────────────────────────────────

/// Monotonic uptime source.
pub trait Clock {
    /// Milliseconds since boot.  Never goes backwards.
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Task introspection port (driven adapter: RTOS → monitor)
// ───────────────────────────────────────────────────────────────

/// Maximum task name length kept per sample (FreeRTOS `configMAX_TASK_NAME_LEN`).
pub const TASK_NAME_LEN: usize = 16;

/// One task's scheduling statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSample {
    pub name: String<TASK_NAME_LEN>,
    /// Least free stack ever observed, in stack words.
    pub stack_high_water_mark_words: u32,
    /// Accumulated run time in runtime-counter ticks.
    pub runtime_ticks: u64,
}

impl TaskSample {
    /// Build a sample; names longer than [`TASK_NAME_LEN`] are truncated.
    pub fn new(name: &str, stack_high_water_mark_words: u32, runtime_ticks: u64) -> Self {
        let mut n = String::new();
        for c in name.chars() {
            if n.push(c).is_err() {
                break;
            }
        }
        Self {
            name: n,
            stack_high_water_mark_words,
            runtime_ticks,
        }
    }

    /// FreeRTOS idle tasks (`IDLE`, `IDLE0`, `IDLE1`) count as idle time.
    pub fn is_idle(&self) -> bool {
        self.name.starts_with("IDLE")
    }
}

/// Result of one enumeration of live tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub tasks: Vec<TaskSample>,
    /// Total run time reported by the scheduler.  Zero until the runtime
    /// has produced scheduling statistics.
    pub total_runtime_ticks: u64,
}

/// Read-side port: the sampler calls this once per cycle.
pub trait TaskIntrospection {
    /// Enumerate every live task.  The returned snapshot is owned by the
    /// caller and dropped at the end of the sampling cycle.
    fn snapshot(&self) -> TaskSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Fail-safe port (driven adapter: monitor → actuator supervisor)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the sampler drives fail-safe mode through this.
pub trait FailSafePort {
    /// Enter (`true`) or leave (`false`) fail-safe mode.  Must be idempotent:
    /// the sampler re-asserts it every cycle while the condition holds.
    fn set_fail_safe_mode(&mut self, enabled: bool);
}
