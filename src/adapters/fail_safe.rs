//! Fail-safe latch adapter.
//!
//! Implements [`FailSafePort`] by latching the requested mode in an atomic
//! that actuator control loops poll before driving heaters, ventilators or
//! lights.  The sampler re-asserts the mode every cycle, so only changes
//! are logged.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info};

use crate::app::ports::FailSafePort;

/// Shared fail-safe flag.  Clones observe the same latch.
#[derive(Debug, Clone, Default)]
pub struct FailSafeLatch {
    engaged: Arc<AtomicBool>,
}

impl FailSafeLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether actuators must stay in their safe state.
    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::Acquire)
    }
}

impl FailSafePort for FailSafeLatch {
    fn set_fail_safe_mode(&mut self, enabled: bool) {
        let was = self.engaged.swap(enabled, Ordering::AcqRel);
        match (was, enabled) {
            (false, true) => error!("FAIL-SAFE ENGAGED"),
            (true, false) => info!("FAIL-SAFE RELEASED"),
            _ => {}
        }
    }
}
