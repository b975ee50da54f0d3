//! SPI transport trait
//!
//! This module defines the shared SPI bus interface that board support code must
//! provide. A bus is addressed by a numeric id; several peripherals share one bus
//! and take turns through the claim/release pair.

use crate::platform::Result;

/// Shared SPI bus transport
///
/// Every method takes `&self`: the bus is shared between task context and
/// interrupt handlers, so implementations own their own synchronisation
/// (typically a semaphore for task context and a try-lock for interrupts).
///
/// # Contract
///
/// - `claim_bus` may block; `claim_bus_from_isr` must never block
/// - A successful claim must be paired with exactly one release of the same flavour
/// - Chip-select handling is separate from bus ownership
/// - `transfer_byte` returns the byte clocked in while `byte` was clocked out
pub trait SpiTransport {
    /// Acquire exclusive use of the bus from task context (may block)
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Spi(SpiError::BusBusy)` if the bus could not be acquired.
    fn claim_bus(&self, bus: u32) -> Result<()>;

    /// Acquire exclusive use of the bus from interrupt context (never blocks)
    ///
    /// Returns `true` when acquiring made a higher-priority task runnable.
    fn claim_bus_from_isr(&self, bus: u32) -> Result<bool>;

    /// Release the bus from task context
    fn release_bus(&self, bus: u32) -> Result<()>;

    /// Release the bus from interrupt context
    ///
    /// Returns `true` when releasing made a higher-priority task runnable.
    fn release_bus_from_isr(&self, bus: u32) -> Result<bool>;

    /// Drive the chip-select line of `slave` (`false` = asserted, active low)
    fn set_chip_select(&self, bus: u32, slave: u32, level: bool);

    /// Clock one byte out and return the byte clocked in
    fn transfer_byte(&self, bus: u32, byte: u8) -> Result<u8>;

    /// Full-duplex block transfer; `tx` and `rx` have the same length
    fn transfer_block(&self, bus: u32, tx: &[u8], rx: &mut [u8]) -> Result<()>;

    /// Set the bus clock in Hz
    fn set_clock_speed(&self, bus: u32, hz: u32) -> Result<()>;
}
