//! Task Watchdog Timer (TWDT) subscription for the sampler task.
//!
//! The health sampler is the one task that must keep running for faults to
//! escalate, so it subscribes itself to the ESP-IDF TWDT and feeds it once
//! per cycle.  A stalled sampler resets the device.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

pub struct TaskWatchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl TaskWatchdog {
    /// Reconfigure the TWDT to `timeout_ms` and subscribe the calling task.
    ///
    /// Must be called from the task that will feed it.
    pub fn subscribe_current(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: TWDT calls act on the calling task's handle only.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }

                let subscribed = esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK;
                if subscribed {
                    info!("Watchdog: sampler subscribed ({}ms timeout)", timeout_ms);
                } else {
                    log::warn!("Watchdog: sampler failed to subscribe");
                }
                Self {
                    timeout_ms,
                    subscribed,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): no-op, {}ms timeout", timeout_ms);
            Self { timeout_ms }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the calling task's TWDT entry.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for TaskWatchdog {
    fn drop(&mut self) {
        if self.subscribed {
            // SAFETY: removes the calling task, which subscribed in `subscribe_current`.
            unsafe {
                esp_task_wdt_delete(core::ptr::null_mut());
            }
        }
    }
}
