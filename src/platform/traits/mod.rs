//! Platform abstraction traits
//!
//! This module defines the traits that board support code must provide.

pub mod exti;
pub mod spi;
pub mod watchdog;

// Re-export trait interfaces
pub use exti::ExtiLine;
pub use spi::SpiTransport;
pub use watchdog::Watchdog;
