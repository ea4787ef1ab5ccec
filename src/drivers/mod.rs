//! Thin RTOS glue used by the firmware entry point.

pub mod task_pin;
pub mod watchdog;
