//! Platform error types
//!
//! This module defines error types reported by the bus, interrupt and timing
//! collaborators the driver depends on.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// Transport implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// SPI operation failed
    Spi(SpiError),
    /// External interrupt setup failed
    Exti(ExtiError),
    /// Invalid configuration provided
    InvalidConfig,
}

/// SPI-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiError {
    /// Bus could not be claimed (held by another device or context)
    BusBusy,
    /// Bus release failed (not held, or semaphore error)
    ReleaseFailed,
    /// Transfer failed
    TransferFailed,
    /// Timeout occurred
    Timeout,
}

/// External interrupt errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtiError {
    /// Line number not routable on this chip
    InvalidLine,
    /// Line already owned by another handler
    LineInUse,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Spi(e) => write!(f, "SPI error: {:?}", e),
            PlatformError::Exti(e) => write!(f, "EXTI error: {:?}", e),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}
