//! Core-pinned thread spawning for the ESP32 dual-core.
//!
//! ESP-IDF implements `std::thread` on top of pthreads, which are thin
//! wrappers around FreeRTOS tasks.  `esp_pthread_set_cfg()` applies to the
//! *next* `pthread_create()` from the calling thread, so the config→spawn
//! pair must not interleave with other thread creation on that thread.

use std::io;
use std::thread::JoinHandle;

/// CPU core identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU) — protocol stacks (WiFi, BLE, lwIP).
    Pro = 0,
    /// Core 1 (APP_CPU) — control loops and the fault monitor.
    App = 1,
}

/// Placement and sizing of a spawned task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// NUL-terminated task name, e.g. `"sys_mon\0"`.
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Spawn `f` as a task placed according to `spec`.
///
/// Off-target, core and priority are ignored; only the stack size applies.
pub fn spawn_on_core(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    #[cfg(target_os = "espidf")]
    {
        // SAFETY: `spec.name` is 'static and NUL-terminated; the config is
        // consumed by the very next pthread_create on this thread.
        let ret = unsafe {
            let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
            cfg.pin_to_core = spec.core as i32;
            cfg.prio = i32::from(spec.priority);
            cfg.stack_size = (spec.stack_kb * 1024) as _;
            cfg.thread_name = spec.name.as_ptr() as *const _;
            esp_idf_sys::esp_pthread_set_cfg(&cfg)
        };
        if ret != esp_idf_sys::ESP_OK as i32 {
            return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
        }
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        spec.display_name(),
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
}
