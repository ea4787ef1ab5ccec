//! FreeRTOS task introspection adapter.
//!
//! Implements [`TaskIntrospection`] for the health sampler.
//!
//! - **`target_os = "espidf"`** — `uxTaskGetSystemState()`; requires
//!   `CONFIG_FREERTOS_USE_TRACE_FACILITY` and
//!   `CONFIG_FREERTOS_GENERATE_RUN_TIME_STATS` in sdkconfig, otherwise the
//!   runtime total stays zero and the sampler never leaves the sentinel.
//! - **`not(target_os = "espidf")`** — a synthetic task table whose run
//!   time advances with wall-clock time, so simulation exercises the same
//!   sampler branches as hardware.

use crate::app::ports::{TaskIntrospection, TaskSample, TaskSnapshot};

/// Task introspection backed by the FreeRTOS scheduler.
#[derive(Default)]
pub struct FreeRtosTasks {
    #[cfg(not(target_os = "espidf"))]
    start: Option<std::time::Instant>,
}

impl FreeRtosTasks {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: Some(std::time::Instant::now()),
        }
    }
}

#[cfg(target_os = "espidf")]
impl TaskIntrospection for FreeRtosTasks {
    fn snapshot(&self) -> TaskSnapshot {
        use esp_idf_svc::sys::{TaskStatus_t, uxTaskGetNumberOfTasks, uxTaskGetSystemState};

        // SAFETY: plain scheduler query, no pointers involved.
        let count = unsafe { uxTaskGetNumberOfTasks() } as usize;
        if count == 0 {
            return TaskSnapshot::default();
        }

        // Headroom for tasks created between the count and the copy.
        let capacity = count + 2;
        let mut raw: Vec<TaskStatus_t> = Vec::with_capacity(capacity);
        let mut total_runtime = 0;
        // SAFETY: `raw` has room for `capacity` entries; the scheduler writes
        // at most that many and returns how many it filled.
        let filled = unsafe {
            let n = uxTaskGetSystemState(raw.as_mut_ptr(), capacity as _, &mut total_runtime);
            raw.set_len(n as usize);
            n as usize
        };

        let tasks = raw[..filled]
            .iter()
            .map(|t| {
                // SAFETY: pcTaskName points at the TCB's NUL-terminated name,
                // valid while the task exists (it does for this call).
                let name = unsafe { core::ffi::CStr::from_ptr(t.pcTaskName) }
                    .to_str()
                    .unwrap_or("?");
                TaskSample::new(
                    name,
                    t.usStackHighWaterMark as u32,
                    u64::from(t.ulRunTimeCounter),
                )
            })
            .collect();

        TaskSnapshot {
            tasks,
            total_runtime_ticks: u64::from(total_runtime),
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl TaskIntrospection for FreeRtosTasks {
    fn snapshot(&self) -> TaskSnapshot {
        // Microsecond run-time counter, like ESP-IDF's esp_timer-based one.
        let elapsed = self
            .start
            .map_or(0, |s| s.elapsed().as_micros() as u64);

        // Roughly a dual-core ESP32 running the controller at ~20% load.
        let tasks = vec![
            TaskSample::new("main", 1_100, elapsed / 10),
            TaskSample::new("sys_mon", 620, elapsed / 50),
            TaskSample::new("modbus", 740, elapsed / 20),
            TaskSample::new("IDLE0", 380, elapsed * 9 / 10),
            TaskSample::new("IDLE1", 380, elapsed * 7 / 10),
        ];

        TaskSnapshot {
            tasks,
            total_runtime_ticks: elapsed,
        }
    }
}
