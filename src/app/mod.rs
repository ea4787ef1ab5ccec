//! Application boundary.
//!
//! The fault monitor depends only on the traits in [`ports`]; the
//! [`adapters`](crate::adapters) module supplies the ESP32 implementations.

pub mod ports;
