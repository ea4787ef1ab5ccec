//! Runtime diagnostics for the communications bridge.
//!
//! [`DiagnosticsReport`] bundles health figures and the active-fault
//! snapshot so Modbus/BLE/WiFi handlers can answer a status query with one
//! monitor call.  Reports travel as postcard bytes.

use serde::{Deserialize, Serialize};

use crate::monitor::FaultStatus;

/// Health and fault status captured under a single monitor lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsReport<const ACTIVE: usize> {
    pub uptime_ms: u64,
    pub cpu_load_percent: u8,
    /// `u32::MAX` means no stack sample has landed yet.
    pub min_free_stack_bytes: u32,
    pub status: FaultStatus<ACTIVE>,
}

impl<const ACTIVE: usize> DiagnosticsReport<ACTIVE> {
    /// Serialise for the bridge.
    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    /// True if a stack sample has been recorded.
    pub fn stack_sampled(&self) -> bool {
        self.min_free_stack_bytes != u32::MAX
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook — last words on the serial console before reset
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that logs the reason under the monitor tag.
///
/// Must be called once during init, after the logger is up.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        let location = info
            .location()
            .map(|l| (l.file(), l.line()))
            .unwrap_or(("?", 0));

        log::error!(
            target: crate::monitor::LOG_TAG,
            "PANIC at {}:{}: {}",
            location.0,
            location.1,
            reason
        );
    }));
}
