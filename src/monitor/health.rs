//! Periodic health sampling.
//!
//! Called by an external periodic task; never schedules itself.  Each cycle
//! enumerates live tasks, refreshes the minimum free stack and CPU load,
//! and re-asserts fail-safe mode while any active fault is `High` or worse.

use log::{debug, info};

use super::{LOG_TAG, MonitorState, SystemMonitor};
use crate::app::ports::{Clock, FailSafePort, TaskIntrospection, TaskSample};

impl<C: Clock, const HISTORY: usize, const ACTIVE: usize> SystemMonitor<C, HISTORY, ACTIVE> {
    /// Run one sampling cycle.  Best-effort: silently does nothing when
    /// uninitialised, when no tasks are reported, or when the lock is busy.
    ///
    /// The stack minimum is reset to the `u32::MAX` sentinel at the start of
    /// every cycle and only recomputed once the runtime reports a non-zero
    /// total run time, so readers can observe the sentinel again after a
    /// valid sample.
    ///
    /// The escalation decision is a snapshot of the active table taken under
    /// the lock; fail-safe is asserted after release, so a fault cleared in
    /// between still escalates for this one cycle.
    pub fn sample_and_evaluate(
        &self,
        tasks: &impl TaskIntrospection,
        fail_safe: &mut impl FailSafePort,
    ) {
        let Some(state) = self.state.get() else {
            return;
        };

        let snapshot = tasks.snapshot();
        if snapshot.tasks.is_empty() {
            return;
        }

        let Some(mut guard) = state.try_lock_for(self.config.lock_timeout()) else {
            debug!(target: LOG_TAG, "health sample skipped: lock busy");
            return;
        };

        guard.min_free_stack_bytes = u32::MAX;
        if snapshot.total_runtime_ticks > 0 {
            guard.min_free_stack_bytes =
                min_free_stack_bytes(&snapshot.tasks, self.config.stack_word_size_bytes);
            guard.update_cpu_load(&snapshot.tasks);
        }

        let escalate = guard.store.active().first_requiring_fail_safe().is_some();
        let cpu = guard.cpu_load_percent;
        let stack = guard.min_free_stack_bytes;
        drop(guard);

        // Decided under the lock; asserted outside it so a fail-safe handler
        // may itself report faults.
        if escalate {
            fail_safe.set_fail_safe_mode(true);
        }
        info!(
            target: LOG_TAG,
            "health: cpu={}% min_free_stack={}B tasks={} fail_safe={}",
            cpu,
            stack,
            snapshot.tasks.len(),
            escalate
        );
    }
}

impl<const HISTORY: usize, const ACTIVE: usize> MonitorState<HISTORY, ACTIVE> {
    /// Busy share of all task run time since the previous sample.  Keeps the
    /// previous value if no run time elapsed (or tasks were deleted).
    fn update_cpu_load(&mut self, tasks: &[TaskSample]) {
        let (all, idle) = tasks.iter().fold((0u64, 0u64), |(all, idle), t| {
            let idle = if t.is_idle() {
                idle.saturating_add(t.runtime_ticks)
            } else {
                idle
            };
            (all.saturating_add(t.runtime_ticks), idle)
        });

        let all_delta = all.saturating_sub(self.last_all_task_ticks);
        let idle_delta = idle.saturating_sub(self.last_idle_task_ticks);
        self.last_all_task_ticks = all;
        self.last_idle_task_ticks = idle;

        if all_delta == 0 {
            return;
        }
        let busy = all_delta.saturating_sub(idle_delta);
        self.cpu_load_percent = (busy.saturating_mul(100) / all_delta).min(100) as u8;
    }
}

/// Smallest stack high-water mark across `tasks`, in bytes.
fn min_free_stack_bytes(tasks: &[TaskSample], word_size_bytes: u32) -> u32 {
    tasks
        .iter()
        .map(|t| t.stack_high_water_mark_words.saturating_mul(word_size_bytes))
        .min()
        .unwrap_or(u32::MAX)
}
