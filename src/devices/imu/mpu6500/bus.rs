//! SPI bus arbitration
//!
//! The bus is shared with other peripherals and with the data-ready interrupt.
//! Which claim/release pair is legal depends on the calling context, so the
//! context is a type parameter of the guard rather than a function suffix:
//! a `BusGuard<_, Task>` can only be released through the task path and a
//! `BusGuard<_, Interrupt>` only through the interrupt path.
//!
//! Ordering contract:
//! - claim: acquire bus, then assert chip-select
//! - release: deassert chip-select, then relinquish bus

use super::error::DriverError;
use crate::platform::{self, SpiTransport};
use core::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// Execution context a bus transaction runs in
pub trait BusContext: sealed::Sealed {
    /// Acquire the bus; `Ok(true)` when a higher-priority task was woken
    fn acquire<T: SpiTransport>(transport: &T, bus: u32) -> platform::Result<bool>;

    /// Relinquish the bus; `Ok(true)` when a higher-priority task was woken
    fn relinquish<T: SpiTransport>(transport: &T, bus: u32) -> platform::Result<bool>;
}

/// Normal task context: claims may block
pub enum Task {}

/// Interrupt context: claims never block
pub enum Interrupt {}

impl sealed::Sealed for Task {}
impl sealed::Sealed for Interrupt {}

impl BusContext for Task {
    fn acquire<T: SpiTransport>(transport: &T, bus: u32) -> platform::Result<bool> {
        transport.claim_bus(bus).map(|_| false)
    }

    fn relinquish<T: SpiTransport>(transport: &T, bus: u32) -> platform::Result<bool> {
        transport.release_bus(bus).map(|_| false)
    }
}

impl BusContext for Interrupt {
    fn acquire<T: SpiTransport>(transport: &T, bus: u32) -> platform::Result<bool> {
        transport.claim_bus_from_isr(bus)
    }

    fn relinquish<T: SpiTransport>(transport: &T, bus: u32) -> platform::Result<bool> {
        transport.release_bus_from_isr(bus)
    }
}

/// One chip-select slot on a shared SPI bus
pub struct SpiDeviceBus<'a, T: SpiTransport> {
    transport: &'a T,
    bus: u32,
    slave: u32,
}

impl<'a, T: SpiTransport> SpiDeviceBus<'a, T> {
    /// Bind `slave` on bus `bus`
    pub fn new(transport: &'a T, bus: u32, slave: u32) -> Self {
        Self {
            transport,
            bus,
            slave,
        }
    }

    /// Bus id (0 = unbound)
    pub fn bus_id(&self) -> u32 {
        self.bus
    }

    /// Chip-select index
    pub fn slave(&self) -> u32 {
        self.slave
    }

    /// Claim from task context
    pub fn claim(&self) -> Result<BusGuard<'_, T, Task>, DriverError> {
        self.claim_in()
    }

    /// Claim from interrupt context
    pub fn claim_from_isr(&self) -> Result<BusGuard<'_, T, Interrupt>, DriverError> {
        self.claim_in()
    }

    fn claim_in<C: BusContext>(&self) -> Result<BusGuard<'_, T, C>, DriverError> {
        let woken = C::acquire(self.transport, self.bus).map_err(|_| DriverError::BusUnavailable)?;
        self.transport.set_chip_select(self.bus, self.slave, false);
        Ok(BusGuard {
            transport: self.transport,
            bus: self.bus,
            slave: self.slave,
            woken,
            released: false,
            _context: PhantomData,
        })
    }

    /// Change the bus clock
    pub fn set_clock_speed(&self, hz: u32) -> Result<(), DriverError> {
        self.transport.set_clock_speed(self.bus, hz)?;
        Ok(())
    }
}

/// Exclusive bus ownership with chip-select asserted
///
/// Release explicitly with [`BusGuard::release`] to observe release errors.
/// A guard dropped without release (early `?` return) still deasserts
/// chip-select and hands the bus back, discarding any error.
#[must_use = "the bus stays claimed until the guard is released or dropped"]
pub struct BusGuard<'b, T: SpiTransport, C: BusContext> {
    transport: &'b T,
    bus: u32,
    slave: u32,
    woken: bool,
    released: bool,
    _context: PhantomData<C>,
}

impl<T: SpiTransport, C: BusContext> BusGuard<'_, T, C> {
    /// Exchange one byte
    pub fn transfer_byte(&mut self, byte: u8) -> Result<u8, DriverError> {
        self.transport
            .transfer_byte(self.bus, byte)
            .map_err(|_| DriverError::TransferFailure)
    }

    /// Full-duplex block exchange
    pub fn transfer_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), DriverError> {
        self.transport
            .transfer_block(self.bus, tx, rx)
            .map_err(|_| DriverError::TransferFailure)
    }

    /// Whether claiming woke a higher-priority task
    pub fn woken(&self) -> bool {
        self.woken
    }

    /// Deassert chip-select and release the bus
    ///
    /// Returns whether claim or release woke a higher-priority task.
    pub fn release(mut self) -> Result<bool, DriverError> {
        self.released = true;
        self.transport.set_chip_select(self.bus, self.slave, true);
        let woken = C::relinquish(self.transport, self.bus).map_err(|_| DriverError::ReleaseFailed)?;
        Ok(self.woken || woken)
    }
}

impl<T: SpiTransport, C: BusContext> Drop for BusGuard<'_, T, C> {
    fn drop(&mut self) {
        if !self.released {
            self.transport.set_chip_select(self.bus, self.slave, true);
            let _ = C::relinquish(self.transport, self.bus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockSpi, SpiEvent};

    #[test]
    fn test_claim_selects_after_acquire() {
        let spi = MockSpi::new();
        let dev = SpiDeviceBus::new(&spi, 1, 2);

        let guard = dev.claim().unwrap();
        assert!(spi.is_claimed());
        guard.release().unwrap();

        assert_eq!(
            spi.events(),
            vec![
                SpiEvent::Claim { isr: false },
                SpiEvent::ChipSelect { slave: 2, level: false },
                SpiEvent::ChipSelect { slave: 2, level: true },
                SpiEvent::Release { isr: false },
            ]
        );
        assert!(!spi.is_claimed());
    }

    #[test]
    fn test_isr_path_uses_isr_primitives() {
        let spi = MockSpi::new();
        spi.set_isr_woken(true);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        let guard = dev.claim_from_isr().unwrap();
        assert!(guard.woken());
        assert!(guard.release().unwrap());

        let events = spi.events();
        assert_eq!(events[0], SpiEvent::Claim { isr: true });
        assert_eq!(events[3], SpiEvent::Release { isr: true });
    }

    #[test]
    fn test_failed_claim_touches_nothing() {
        let spi = MockSpi::new();
        spi.set_fail_claim(true);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        assert!(matches!(dev.claim(), Err(DriverError::BusUnavailable)));
        assert!(spi.events().is_empty());
    }

    #[test]
    fn test_second_claim_is_rejected_while_held() {
        let spi = MockSpi::new();
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        let guard = dev.claim().unwrap();
        assert!(matches!(dev.claim_from_isr(), Err(DriverError::BusUnavailable)));
        guard.release().unwrap();
        assert!(dev.claim().is_ok());
    }

    #[test]
    fn test_release_failure_is_reported() {
        let spi = MockSpi::new();
        spi.set_fail_release(true);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        let guard = dev.claim().unwrap();
        assert_eq!(guard.release(), Err(DriverError::ReleaseFailed));
        assert!(!spi.is_claimed());
    }

    #[test]
    fn test_dropped_guard_releases_bus() {
        let spi = MockSpi::new();
        let dev = SpiDeviceBus::new(&spi, 1, 0);
        {
            let _guard = dev.claim().unwrap();
        }
        assert!(!spi.is_claimed());
        assert_eq!(spi.events().last(), Some(&SpiEvent::Release { isr: false }));
    }
}
