//! Error types for the system fault monitor.
//!
//! Every fallible monitor operation returns [`MonitorError`].  All variants
//! are `Copy` so a producer task can inspect the failure and carry on
//! without allocating; none of them is escalated by the monitor itself.

use core::fmt;

/// Failure modes of the fault monitor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// The monitor has not been initialised with [`init`](crate::monitor::SystemMonitor::init).
    NotInitialized,
    /// Fault id out of range, or a sentinel severity was supplied.
    InvalidArgument,
    /// The shared state lock could not be taken within the configured wait.
    /// For `report_fault` this means the report was dropped.
    LockTimeout,
    /// The lock primitive could not be created.  Boot must abort.
    LockCreationFailed,
    /// Configuration rejected by `init()`.  The string names the field.
    Config(&'static str),
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "monitor not initialised"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::LockTimeout => write!(f, "lock wait timed out"),
            Self::LockCreationFailed => write!(f, "lock creation failed"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for MonitorError {}

/// Monitor-wide `Result` alias.
pub type Result<T> = core::result::Result<T, MonitorError>;
