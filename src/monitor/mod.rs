//! System fault monitor.
//!
//! One [`SystemMonitor`] is created at boot and shared by reference with
//! every task that reports faults or reads health.  All mutable state sits
//! behind a single `parking_lot::Mutex`; there is no finer-grained locking, so a
//! reader sees either none or all of a report's effects.
//!
//! ```text
//!  producers ──report_fault()──▶ ┌──────────────────────────┐
//!                                │    Mutex<MonitorState>    │
//!  sampler ─sample_and_evaluate─▶│  history · active · health│──▶ FailSafePort
//!                                └──────────────────────────┘
//!  bridge ◀──get_fault_status() / get_cpu_load() / get_min_free_stack()
//! ```
//!
//! ## Lifecycle
//!
//! `Uninitialized → Initialized`, once, via [`SystemMonitor::init`].  The
//! state (and its lock) only exists after `init()`; every other operation
//! checks for it first.  There is no teardown.
//!
//! ## Contention policy
//!
//! Every lock acquisition is a queued `try_lock_for(lock_timeout_ms)`.  Under
//! contention a report is dropped (`LockTimeout`) and the plain accessors
//! return `0`.  Nothing in this module blocks without bound.

mod health;
pub mod store;

use std::sync::OnceLock;

use log::{debug, info, log, warn};
use parking_lot::{Mutex, MutexGuard};

use crate::app::ports::Clock;
use crate::config::{DEFAULT_HISTORY_SIZE, DEFAULT_MAX_ACTIVE_FAULTS, MonitorConfig};
use crate::diagnostics::DiagnosticsReport;
use crate::error::{MonitorError, Result};
use crate::fault::{FaultCode, FaultRecord, Severity};

pub use store::{ActiveFaultTable, FaultStatus, FaultStore, HistoryLog, Upsert};

/// Log target for every line this module emits.
pub const LOG_TAG: &str = "SYS_MON";

/// Everything guarded by the monitor lock.
#[derive(Debug)]
struct MonitorState<const HISTORY: usize, const ACTIVE: usize> {
    store: FaultStore<HISTORY, ACTIVE>,
    cpu_load_percent: u8,
    /// `u32::MAX` until a sample with scheduling statistics lands.
    min_free_stack_bytes: u32,
    /// Runtime-counter totals from the previous sample, for CPU load deltas.
    last_all_task_ticks: u64,
    last_idle_task_ticks: u64,
}

impl<const HISTORY: usize, const ACTIVE: usize> MonitorState<HISTORY, ACTIVE> {
    fn new() -> Self {
        Self {
            store: FaultStore::new(),
            cpu_load_percent: 0,
            min_free_stack_bytes: u32::MAX,
            last_all_task_ticks: 0,
            last_idle_task_ticks: 0,
        }
    }
}

/// Fault store, reporter, health sampler and accessors in one service.
///
/// `HISTORY` and `ACTIVE` fix the capacities of the historical ring and
/// the active-fault table.
pub struct SystemMonitor<
    C,
    const HISTORY: usize = DEFAULT_HISTORY_SIZE,
    const ACTIVE: usize = DEFAULT_MAX_ACTIVE_FAULTS,
> {
    config: MonitorConfig,
    clock: C,
    state: OnceLock<Mutex<MonitorState<HISTORY, ACTIVE>>>,
}

impl<C: Clock, const HISTORY: usize, const ACTIVE: usize> SystemMonitor<C, HISTORY, ACTIVE> {
    /// Construct an uninitialised monitor.  Call [`init`](Self::init) next.
    pub fn new(config: MonitorConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            state: OnceLock::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate the configuration and create the zeroed state and its lock.
    ///
    /// Idempotent: once initialised, further calls return `Ok(())` without
    /// touching the state.
    pub fn init(&self) -> Result<()> {
        if self.state.get().is_some() {
            return Ok(());
        }
        self.config.validate()?;

        let mut created = false;
        let _ = self.state.get_or_init(|| {
            created = true;
            Mutex::new(MonitorState::new())
        });
        if !created {
            return Ok(());
        }
        info!(
            target: LOG_TAG,
            "initialised (history={}, active={}, ids={}, lock_timeout={}ms)",
            HISTORY,
            ACTIVE,
            self.config.total_fault_ids,
            self.config.lock_timeout_ms
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // ── Reporting ─────────────────────────────────────────────

    /// Record a fault in the history and merge it into the active table.
    ///
    /// Validation order: initialised, then id and severity range.  On
    /// `LockTimeout` the report is dropped and nothing is mutated; the
    /// caller may retry.
    pub fn report_fault(&self, id: u32, severity: Severity, data: u32) -> Result<()> {
        let state = self.state.get().ok_or(MonitorError::NotInitialized)?;
        if id >= self.config.total_fault_ids || !severity.is_reportable() {
            return Err(MonitorError::InvalidArgument);
        }

        let Some(mut guard) = state.try_lock_for(self.config.lock_timeout()) else {
            warn!(target: LOG_TAG, "fault {} ({}) dropped: lock timeout", id, severity);
            return Err(MonitorError::LockTimeout);
        };

        let record = FaultRecord::active(id, severity, self.clock.uptime_ms(), data);
        guard.store.append_history(record);
        let outcome = guard.store.upsert_active(record);

        log!(
            target: LOG_TAG,
            severity.log_level(),
            "fault id={} severity={} data=0x{:08X} t={}ms",
            id,
            severity,
            data,
            record.timestamp_ms
        );
        if let Upsert::Evicted(old) = outcome {
            debug!(target: LOG_TAG, "active table full, evicted fault id={}", old.id);
        }
        Ok(())
    }

    /// Typed wrapper around [`report_fault`](Self::report_fault).
    pub fn report_code(&self, code: FaultCode, severity: Severity, data: u32) -> Result<()> {
        self.report_fault(code.id(), severity, data)
    }

    /// Resolve an active fault.  Returns `Ok(false)` if `id` was not active.
    /// The historical log is unaffected.
    pub fn clear_fault(&self, id: u32) -> Result<bool> {
        let state = self.state.get().ok_or(MonitorError::NotInitialized)?;
        if id >= self.config.total_fault_ids {
            return Err(MonitorError::InvalidArgument);
        }
        let mut guard = state
            .try_lock_for(self.config.lock_timeout())
            .ok_or(MonitorError::LockTimeout)?;

        let cleared = guard.store.remove_active(id).is_some();
        if cleared {
            info!(target: LOG_TAG, "fault id={} cleared", id);
        }
        Ok(cleared)
    }

    // ── Accessors ─────────────────────────────────────────────

    /// Last computed CPU load.  `0` when uninitialised or the lock is busy.
    pub fn get_cpu_load(&self) -> u8 {
        self.lock().map_or(0, |s| s.cpu_load_percent)
    }

    /// Minimum free stack across tasks, in bytes.  `u32::MAX` before the
    /// first meaningful sample; `0` when uninitialised or the lock is busy.
    pub fn get_min_free_stack(&self) -> u32 {
        self.lock().map_or(0, |s| s.min_free_stack_bytes)
    }

    /// Copy the active table and both counts into `out`.
    ///
    /// `out` is left untouched on error.
    pub fn get_fault_status(&self, out: &mut FaultStatus<ACTIVE>) -> Result<()> {
        *out = self.fault_status()?;
        Ok(())
    }

    /// Owned variant of [`get_fault_status`](Self::get_fault_status).
    pub fn fault_status(&self) -> Result<FaultStatus<ACTIVE>> {
        Ok(self.lock()?.store.snapshot_active())
    }

    /// Historical log contents, oldest first.
    pub fn history_snapshot(&self) -> Result<heapless::Vec<FaultRecord, HISTORY>> {
        let guard = self.lock()?;
        Ok(guard.store.history().iter_oldest_first().copied().collect())
    }

    /// Health and fault status captured under one lock, for the comms bridge.
    pub fn diagnostics(&self) -> Result<DiagnosticsReport<ACTIVE>> {
        let guard = self.lock()?;
        Ok(DiagnosticsReport {
            uptime_ms: self.clock.uptime_ms(),
            cpu_load_percent: guard.cpu_load_percent,
            min_free_stack_bytes: guard.min_free_stack_bytes,
            status: guard.store.snapshot_active(),
        })
    }

    // ── Internal ──────────────────────────────────────────────

    fn lock(&self) -> Result<MutexGuard<'_, MonitorState<HISTORY, ACTIVE>>> {
        let state = self.state.get().ok_or(MonitorError::NotInitialized)?;
        state
            .try_lock_for(self.config.lock_timeout())
            .ok_or(MonitorError::LockTimeout)
    }

    #[cfg(test)]
    fn hold_lock(&self) -> MutexGuard<'_, MonitorState<HISTORY, ACTIVE>> {
        self.lock().expect("test holds an uncontended lock")
    }
}
