//! Fault vocabulary: severities, the catalogue of known fault sources, and
//! the record stored in both the historical log and the active table.

use core::fmt;

use log::Level;
use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────
// Severity
// ───────────────────────────────────────────────────────────────

/// Fault severity, ordered from least to most severe.
///
/// `None` sorts above every real severity and is only a sentinel: reports
/// must carry a severity strictly below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Severity {
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
    None = 4,
}

impl Severity {
    /// True for every severity a producer may report.
    pub const fn is_reportable(self) -> bool {
        (self as u8) < (Self::None as u8)
    }

    /// True when an active fault at this severity forces fail-safe mode.
    pub const fn requires_fail_safe(self) -> bool {
        self.is_reportable() && (self as u8) >= (Self::High as u8)
    }

    /// Log tier used when a fault of this severity is recorded.
    pub fn log_level(self) -> Level {
        if self >= Self::High {
            Level::Error
        } else if self >= Self::Medium {
            Level::Warn
        } else {
            Level::Info
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::None => write!(f, "NONE"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Fault catalogue
// ───────────────────────────────────────────────────────────────

/// Fault sources known to the controller.  The discriminant is the fault id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum FaultCode {
    /// Heater element temperature above its cut-off.
    HeaterOverTemperature = 0,
    /// Heater commanded on but no current drawn.
    HeaterOpenCircuit = 1,
    /// Ventilator tachometer reports zero RPM while driven.
    VentilatorStalled = 2,
    /// Lighting driver reported a fault line.
    LightDriverFault = 3,
    /// Environmental sensor did not answer within its poll window.
    SensorTimeout = 4,
    /// Sensor reading outside its physically plausible range.
    SensorOutOfRange = 5,
    /// Modbus frame CRC mismatch or slave timeout.
    ModbusCommError = 6,
    /// Non-volatile block failed its CRC check.
    NvmCrcError = 7,
    /// WiFi station lost its association.
    WifiDisconnected = 8,
    /// BLE stack failed to start.
    BleInitFailed = 9,
    /// A task's stack headroom dropped below its safety margin.
    TaskStackLow = 10,
    /// Supply voltage outside tolerance.
    PowerSupplyFault = 11,
}

impl FaultCode {
    /// Number of catalogued fault ids; the default `total_fault_ids`.
    pub const COUNT: u32 = 12;

    /// Numeric fault id.
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Map a raw id back to its catalogue entry.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::HeaterOverTemperature),
            1 => Some(Self::HeaterOpenCircuit),
            2 => Some(Self::VentilatorStalled),
            3 => Some(Self::LightDriverFault),
            4 => Some(Self::SensorTimeout),
            5 => Some(Self::SensorOutOfRange),
            6 => Some(Self::ModbusCommError),
            7 => Some(Self::NvmCrcError),
            8 => Some(Self::WifiDisconnected),
            9 => Some(Self::BleInitFailed),
            10 => Some(Self::TaskStackLow),
            11 => Some(Self::PowerSupplyFault),
            _ => None,
        }
    }
}

impl From<FaultCode> for u32 {
    fn from(code: FaultCode) -> Self {
        code.id()
    }
}

// ───────────────────────────────────────────────────────────────
// Fault record
// ───────────────────────────────────────────────────────────────

/// One fault report as stored by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub id: u32,
    pub severity: Severity,
    /// Uptime in milliseconds when the report was accepted.
    pub timestamp_ms: u64,
    /// Caller-defined diagnostic payload.
    pub data: u32,
    /// Value at insertion time; history copies are never updated.
    pub is_active: bool,
}

impl FaultRecord {
    /// Zeroed slot used to fill empty ring positions.
    pub const EMPTY: Self = Self {
        id: 0,
        severity: Severity::None,
        timestamp_ms: 0,
        data: 0,
        is_active: false,
    };

    /// A freshly reported, active fault.
    pub const fn active(id: u32, severity: Severity, timestamp_ms: u64, data: u32) -> Self {
        Self {
            id,
            severity,
            timestamp_ms,
            data,
            is_active: true,
        }
    }
}

impl Default for FaultRecord {
    fn default() -> Self {
        Self::EMPTY
    }
}
