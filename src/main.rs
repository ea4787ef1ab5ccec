//! EnvCtl Firmware — Main Entry Point
//!
//! Boots the system fault monitor, spawns the periodic health sampler on
//! the APP core, and keeps the main task supervising the fail-safe latch.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Esp32TimeAdapter   FreeRtosTasks        FailSafeLatch         │
//! │  (Clock)            (TaskIntrospection)  (FailSafePort)        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            SystemMonitor (pure logic)                  │    │
//! │  │  FaultStore · reporter · health sampler · accessors    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  sys_mon task (APP core, TWDT-fed) · main supervision loop     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use envctl::MonitorError;
use envctl::adapters::fail_safe::FailSafeLatch;
use envctl::adapters::tasks::FreeRtosTasks;
use envctl::adapters::time::Esp32TimeAdapter;
use envctl::config::MonitorConfig;
use envctl::diagnostics;
use envctl::drivers::task_pin::{Core, TaskSpec, spawn_on_core};
use envctl::drivers::watchdog::TaskWatchdog;
use envctl::fault::{FaultCode, Severity};
use envctl::monitor::SystemMonitor;

/// Free-stack level below which a `TaskStackLow` fault is raised.
const STACK_LOW_BYTES: u32 = 512;

/// Status summary cadence of the supervision loop.
const SUPERVISION_PERIOD: Duration = Duration::from_secs(5);

type Monitor = SystemMonitor<Esp32TimeAdapter>;

const SAMPLER_TASK: TaskSpec = TaskSpec {
    name: "sys_mon\0",
    core: Core::App,
    priority: 5,
    stack_kb: 4,
};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  EnvCtl v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    diagnostics::install_panic_handler();

    // ── 2. Fault monitor ──────────────────────────────────────
    let config = MonitorConfig::default();
    let monitor = Arc::new(Monitor::new(config.clone(), Esp32TimeAdapter::new()));
    // Boot-time abort: without the monitor no fault can escalate.
    monitor.init().inspect_err(|e| error!("Fault monitor init failed: {}", e))?;

    // ── 3. Health sampler task ────────────────────────────────
    let fail_safe = FailSafeLatch::new();
    {
        let monitor = Arc::clone(&monitor);
        let mut fail_safe = fail_safe.clone();
        let config = config.clone();
        spawn_on_core(SAMPLER_TASK, move || {
            let watchdog = TaskWatchdog::subscribe_current(config.watchdog_timeout_ms);
            let tasks = FreeRtosTasks::new();
            loop {
                monitor.sample_and_evaluate(&tasks, &mut fail_safe);
                watchdog.feed();
                std::thread::sleep(config.sample_interval());
            }
        })?;
    }

    // ── 4. Supervision loop ───────────────────────────────────
    let mut stack_fault_raised = false;
    loop {
        std::thread::sleep(SUPERVISION_PERIOD);

        let min_stack = monitor.get_min_free_stack();
        let stack_low = min_stack != u32::MAX && min_stack != 0 && min_stack < STACK_LOW_BYTES;
        if stack_low && !stack_fault_raised {
            match monitor.report_code(FaultCode::TaskStackLow, Severity::Medium, min_stack) {
                Ok(()) => stack_fault_raised = true,
                Err(MonitorError::LockTimeout) => warn!("stack fault report dropped, retrying"),
                Err(e) => warn!("stack fault report rejected: {}", e),
            }
        } else if !stack_low && stack_fault_raised {
            // Ok(false) means the entry was already evicted from the table.
            if monitor.clear_fault(FaultCode::TaskStackLow.id()).is_ok() {
                stack_fault_raised = false;
            }
        }

        match monitor.diagnostics() {
            Ok(report) => info!(
                "STATUS | cpu={}% stack={}B active={} history={} fail_safe={}",
                report.cpu_load_percent,
                report.min_free_stack_bytes,
                report.status.active_fault_count,
                report.status.historical_fault_count,
                fail_safe.is_engaged()
            ),
            Err(e) => warn!("STATUS | unavailable: {}", e),
        }
    }
}
