//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the platform traits that can
//! be used for unit testing without hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```ignore
//! use mpu6500_flight::platform::mock::MockSpi;
//! use mpu6500_flight::platform::traits::SpiTransport;
//!
//! let spi = MockSpi::new();
//! spi.set_register(0x75, 0x70);
//! spi.claim_bus(1)?;
//! ```

#![cfg(any(test, feature = "mock"))]

mod exti;
mod spi;
mod timer;

pub use exti::MockExti;
pub use spi::{MockSpi, SpiEvent};
pub use timer::{MockDelay, MockWatchdog};
