//! Mock SPI transport for testing
//!
//! Emulates a single SPI register-file device: the first byte after chip-select
//! is the address (bit 7 = read), the second byte is the data. Block transfers
//! auto-increment through the register file like a burst read.

use crate::platform::{traits::SpiTransport, PlatformError, Result, SpiError};
use core::cell::{Cell, RefCell};
use std::vec::Vec;

/// Number of addressable registers
const REGISTER_COUNT: usize = 128;

/// Bus event type for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpiEvent {
    /// Bus claimed
    Claim { isr: bool },
    /// Bus released
    Release { isr: bool },
    /// Chip-select driven
    ChipSelect { slave: u32, level: bool },
    /// Single byte exchanged
    Byte { tx: u8, rx: u8 },
    /// Block transfer
    Block { tx: Vec<u8> },
    /// Clock speed changed
    ClockSpeed { hz: u32 },
}

/// Mock SPI transport
///
/// Records every bus event for test verification and allows injecting
/// failures at each stage of a transaction.
#[derive(Debug)]
pub struct MockSpi {
    registers: RefCell<[u8; REGISTER_COUNT]>,
    self_clearing: RefCell<[u8; REGISTER_COUNT]>,
    events: RefCell<Vec<SpiEvent>>,
    writes: RefCell<Vec<(u8, u8)>>,
    pending_address: Cell<Option<u8>>,
    claimed: Cell<bool>,
    echo: Cell<u8>,
    address_echo: Cell<Option<u8>>,
    fail_claim: Cell<bool>,
    fail_release: Cell<bool>,
    fail_block: Cell<bool>,
    fail_write_to: Cell<Option<u8>>,
    isr_woken: Cell<bool>,
}

impl MockSpi {
    /// Create a new mock with an all-zero register file
    pub fn new() -> Self {
        Self {
            registers: RefCell::new([0; REGISTER_COUNT]),
            self_clearing: RefCell::new([0; REGISTER_COUNT]),
            events: RefCell::new(Vec::new()),
            writes: RefCell::new(Vec::new()),
            pending_address: Cell::new(None),
            claimed: Cell::new(false),
            echo: Cell::new(0),
            address_echo: Cell::new(None),
            fail_claim: Cell::new(false),
            fail_release: Cell::new(false),
            fail_block: Cell::new(false),
            fail_write_to: Cell::new(None),
            isr_woken: Cell::new(false),
        }
    }

    /// Get event log (for test verification)
    pub fn events(&self) -> Vec<SpiEvent> {
        self.events.borrow().clone()
    }

    /// Clear event and write logs
    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
        self.writes.borrow_mut().clear();
    }

    /// Number of byte and block transfers performed
    pub fn transfer_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, SpiEvent::Byte { .. } | SpiEvent::Block { .. }))
            .count()
    }

    /// Register writes in the order they reached the device
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.writes.borrow().clone()
    }

    /// Clock speeds requested, in order
    pub fn clock_speeds(&self) -> Vec<u32> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SpiEvent::ClockSpeed { hz } => Some(*hz),
                _ => None,
            })
            .collect()
    }

    /// Current register value
    pub fn register(&self, reg: u8) -> u8 {
        self.registers.borrow()[usize::from(reg & 0x7F)]
    }

    /// Preload a register value
    pub fn set_register(&self, reg: u8, value: u8) {
        self.registers.borrow_mut()[usize::from(reg & 0x7F)] = value;
    }

    /// Preload a run of registers starting at `start`
    pub fn set_registers(&self, start: u8, values: &[u8]) {
        let mut regs = self.registers.borrow_mut();
        for (i, value) in values.iter().enumerate() {
            regs[(usize::from(start) + i) % REGISTER_COUNT] = *value;
        }
    }

    /// Bits of `reg` that the device clears by itself after being written
    ///
    /// Models reset bits that read back as zero once the reset completes.
    pub fn set_self_clearing(&self, reg: u8, mask: u8) {
        self.self_clearing.borrow_mut()[usize::from(reg & 0x7F)] = mask;
    }

    /// Byte returned while the address byte (and write data byte) is clocked out
    pub fn set_echo(&self, echo: u8) {
        self.echo.set(echo);
    }

    /// Byte returned while the address byte alone is clocked out
    ///
    /// Overrides [`MockSpi::set_echo`] for the address byte; the write data
    /// byte keeps the normal echo.
    pub fn set_address_echo(&self, echo: Option<u8>) {
        self.address_echo.set(echo);
    }

    /// Make every claim fail
    pub fn set_fail_claim(&self, fail: bool) {
        self.fail_claim.set(fail);
    }

    /// Make every release fail (the bus is still released)
    pub fn set_fail_release(&self, fail: bool) {
        self.fail_release.set(fail);
    }

    /// Make every block transfer fail
    pub fn set_fail_block(&self, fail: bool) {
        self.fail_block.set(fail);
    }

    /// Make the data byte of any write to `reg` fail
    pub fn set_fail_write_to(&self, reg: Option<u8>) {
        self.fail_write_to.set(reg);
    }

    /// Value reported as "higher-priority task woken" by interrupt claim/release
    pub fn set_isr_woken(&self, woken: bool) {
        self.isr_woken.set(woken);
    }

    /// Whether the bus is currently held
    pub fn is_claimed(&self) -> bool {
        self.claimed.get()
    }

    fn claim(&self, isr: bool) -> Result<()> {
        if self.fail_claim.get() || self.claimed.get() {
            return Err(PlatformError::Spi(SpiError::BusBusy));
        }
        self.claimed.set(true);
        self.events.borrow_mut().push(SpiEvent::Claim { isr });
        Ok(())
    }

    fn release(&self, isr: bool) -> Result<()> {
        let was_claimed = self.claimed.replace(false);
        self.events.borrow_mut().push(SpiEvent::Release { isr });
        if self.fail_release.get() || !was_claimed {
            return Err(PlatformError::Spi(SpiError::ReleaseFailed));
        }
        Ok(())
    }
}

impl Default for MockSpi {
    fn default() -> Self {
        Self::new()
    }
}

impl SpiTransport for MockSpi {
    fn claim_bus(&self, _bus: u32) -> Result<()> {
        self.claim(false)
    }

    fn claim_bus_from_isr(&self, _bus: u32) -> Result<bool> {
        self.claim(true).map(|_| self.isr_woken.get())
    }

    fn release_bus(&self, _bus: u32) -> Result<()> {
        self.release(false)
    }

    fn release_bus_from_isr(&self, _bus: u32) -> Result<bool> {
        self.release(true).map(|_| self.isr_woken.get())
    }

    fn set_chip_select(&self, _bus: u32, slave: u32, level: bool) {
        // Asserting chip-select starts a new frame
        if !level {
            self.pending_address.set(None);
        }
        self.events
            .borrow_mut()
            .push(SpiEvent::ChipSelect { slave, level });
    }

    fn transfer_byte(&self, _bus: u32, byte: u8) -> Result<u8> {
        let rx = match self.pending_address.take() {
            None => {
                self.pending_address.set(Some(byte));
                self.address_echo.get().unwrap_or(self.echo.get())
            }
            Some(address) if address & 0x80 != 0 => self.register(address),
            Some(address) => {
                if self.fail_write_to.get() == Some(address) {
                    return Err(PlatformError::Spi(SpiError::TransferFailed));
                }
                let mask = self.self_clearing.borrow()[usize::from(address)];
                self.set_register(address, byte & !mask);
                self.writes.borrow_mut().push((address, byte));
                self.echo.get()
            }
        };

        self.events.borrow_mut().push(SpiEvent::Byte { tx: byte, rx });
        Ok(rx)
    }

    fn transfer_block(&self, _bus: u32, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        if tx.len() != rx.len() || self.fail_block.get() {
            return Err(PlatformError::Spi(SpiError::TransferFailed));
        }

        if let Some((first, _)) = tx.split_first() {
            rx[0] = self.echo.get();
            let start = usize::from(first & 0x7F);
            let regs = self.registers.borrow();
            for (i, slot) in rx.iter_mut().enumerate().skip(1) {
                *slot = regs[(start + i - 1) % REGISTER_COUNT];
            }
        }

        self.events
            .borrow_mut()
            .push(SpiEvent::Block { tx: tx.to_vec() });
        Ok(())
    }

    fn set_clock_speed(&self, _bus: u32, hz: u32) -> Result<()> {
        self.events.borrow_mut().push(SpiEvent::ClockSpeed { hz });
        Ok(())
    }
}
