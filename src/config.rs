//! Fault monitor configuration.
//!
//! Runtime-tunable parameters.  The two storage capacities are const
//! generics on [`SystemMonitor`](crate::monitor::SystemMonitor) so the
//! tables stay fixed-size; everything else lives here.

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::fault::FaultCode;

/// Default historical log capacity.
pub const DEFAULT_HISTORY_SIZE: usize = 32;
/// Default active-fault table capacity.
pub const DEFAULT_MAX_ACTIVE_FAULTS: usize = 8;

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Validation ---
    /// Fault ids must be strictly below this value
    pub total_fault_ids: u32,

    // --- Locking ---
    /// Bounded wait on the shared state lock (milliseconds)
    pub lock_timeout_ms: u32,

    // --- Health sampling ---
    /// Bytes per stack word reported by task introspection
    pub stack_word_size_bytes: u32,
    /// Period of the health sampling task (milliseconds)
    pub sample_interval_ms: u32,
    /// Task watchdog timeout for the sampling task (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            total_fault_ids: FaultCode::COUNT,
            lock_timeout_ms: 100,
            stack_word_size_bytes: 4, // Xtensa LX6/LX7
            sample_interval_ms: 1000, // 1 Hz
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl MonitorConfig {
    /// Range-check every field.  Rejects rather than clamps.
    pub fn validate(&self) -> Result<()> {
        if self.total_fault_ids == 0 {
            return Err(MonitorError::Config("total_fault_ids must be non-zero"));
        }
        if self.stack_word_size_bytes == 0 {
            return Err(MonitorError::Config("stack_word_size_bytes must be non-zero"));
        }
        if self.sample_interval_ms == 0 {
            return Err(MonitorError::Config("sample_interval_ms must be non-zero"));
        }
        if self.sample_interval_ms >= self.watchdog_timeout_ms {
            return Err(MonitorError::Config(
                "sample_interval_ms must be shorter than watchdog_timeout_ms",
            ));
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> core::time::Duration {
        core::time::Duration::from_millis(u64::from(self.lock_timeout_ms))
    }

    pub fn sample_interval(&self) -> core::time::Duration {
        core::time::Duration::from_millis(u64::from(self.sample_interval_ms))
    }
}
