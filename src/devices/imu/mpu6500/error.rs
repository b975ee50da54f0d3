//! Driver error types

use crate::devices::sensors::RegistryError;
use crate::platform::{PlatformError, SpiError};
use core::fmt;

/// Why a device handle was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandleError {
    /// No device instance
    Missing,
    /// Validity tag does not match (uninitialised or corrupted instance)
    BadTag,
    /// No bus bound to the instance
    UnboundBus,
}

/// MPU-6500 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Device handle failed validation; never retried
    HandleInvalid(HandleError),
    /// SPI bus could not be claimed
    BusUnavailable,
    /// Byte or block transfer failed, or a write echoed a non-zero byte
    TransferFailure,
    /// Bus release failed after the transaction completed
    ReleaseFailed,
    /// WHO_AM_I did not match
    IdentityMismatch { found: u8 },
    /// A self-clearing reset bit never cleared
    ResetTimeout,
    /// Value outside its enumeration, zero rate, or accel call on a gyro-only device
    InvalidArgument,
    /// Sensor registry rejected an output queue
    Registry(RegistryError),
    /// Other platform collaborator failed (EXTI, clock setup)
    Platform(PlatformError),
}

impl DriverError {
    /// Stable negative code for C-style callers
    pub fn code(&self) -> i32 {
        match self {
            DriverError::HandleInvalid(_) => -1,
            DriverError::BusUnavailable => -2,
            DriverError::TransferFailure => -3,
            DriverError::ReleaseFailed => -4,
            DriverError::IdentityMismatch { .. } => -5,
            DriverError::ResetTimeout => -6,
            DriverError::InvalidArgument => -7,
            DriverError::Registry(_) => -8,
            DriverError::Platform(_) => -9,
        }
    }
}

impl From<PlatformError> for DriverError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Spi(SpiError::BusBusy) => DriverError::BusUnavailable,
            PlatformError::Spi(SpiError::ReleaseFailed) => DriverError::ReleaseFailed,
            PlatformError::Spi(SpiError::TransferFailed | SpiError::Timeout) => {
                DriverError::TransferFailure
            }
            other => DriverError::Platform(other),
        }
    }
}

impl From<RegistryError> for DriverError {
    fn from(err: RegistryError) -> Self {
        DriverError::Registry(err)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::HandleInvalid(e) => write!(f, "Invalid device handle: {:?}", e),
            DriverError::BusUnavailable => write!(f, "SPI bus unavailable"),
            DriverError::TransferFailure => write!(f, "SPI transfer failed"),
            DriverError::ReleaseFailed => write!(f, "SPI bus release failed"),
            DriverError::IdentityMismatch { found } => {
                write!(f, "Unexpected WHO_AM_I: {:#04x}", found)
            }
            DriverError::ResetTimeout => write!(f, "Device reset did not complete"),
            DriverError::InvalidArgument => write!(f, "Invalid argument"),
            DriverError::Registry(e) => write!(f, "Sensor registry error: {}", e),
            DriverError::Platform(e) => write!(f, "{}", e),
        }
    }
}
