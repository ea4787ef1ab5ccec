//! EnvCtl firmware library.
//!
//! Exposes the system fault monitor and its port adapters for integration
//! testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod fault;
pub mod monitor;

mod error;

pub use error::{MonitorError, Result};
