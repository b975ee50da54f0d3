//! Core infrastructure
//!
//! Logging macros and the synchronisation primitives shared by the driver
//! and the sensor registry.

pub mod logging;
pub mod traits;
