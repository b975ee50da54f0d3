//! Platform abstraction layer
//!
//! This module isolates the hardware collaborators the driver talks to: the
//! shared SPI transport, the data-ready interrupt line and the watchdog.
//! Millisecond delays use `embedded_hal::delay::DelayNs` directly.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{ExtiError, PlatformError, Result, SpiError};
pub use traits::{ExtiLine, SpiTransport, Watchdog};
