//! SPI register protocol
//!
//! Single-register access is a two-byte frame: address (bit 7 set for read)
//! followed by a data byte. The device clocks zeros back while it receives
//! the address and the written value, so a non-zero echo during a write is a
//! bus fault. Sample data comes off in one burst frame that auto-increments
//! through the output registers.

use super::bus::{BusContext, BusGuard, SpiDeviceBus};
use super::error::DriverError;
use super::registers;
use crate::platform::SpiTransport;

/// Longest burst frame (dummy + accel + temperature + gyro)
pub const MAX_BURST_LEN: usize = 15;

/// Address byte for reading `reg`
pub const fn read_address(reg: u8) -> u8 {
    reg | registers::SPI_READ_FLAG
}

/// Address byte for writing `reg`
pub const fn write_address(reg: u8) -> u8 {
    reg & registers::SPI_ADDRESS_MASK
}

/// Which output registers a data-ready burst covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BurstLayout {
    /// ACCEL_XOUT_H..GYRO_ZOUT_L
    AccelTempGyro,
    /// TEMP_OUT_H..GYRO_ZOUT_L
    TempGyro,
}

impl BurstLayout {
    /// First register of the burst
    pub fn start(self) -> u8 {
        match self {
            BurstLayout::AccelTempGyro => registers::ACCEL_XOUT_H,
            BurstLayout::TempGyro => registers::TEMP_OUT_H,
        }
    }

    /// Frame length including the leading address/dummy byte
    pub fn frame_len(self) -> usize {
        match self {
            BurstLayout::AccelTempGyro => MAX_BURST_LEN,
            BurstLayout::TempGyro => 9,
        }
    }
}

/// Undecoded sensor-frame sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBurst {
    /// Accel X/Y/Z, absent for a gyro-only burst
    pub accel: Option<[i16; 3]>,
    /// TEMP_OUT
    pub temperature: i16,
    /// Gyro X/Y/Z
    pub gyro: [i16; 3],
}

impl RawBurst {
    /// Decode a received burst frame; byte 0 is the dummy clocked in with the address
    ///
    /// Returns `None` if `frame` is shorter than the layout.
    pub fn decode(layout: BurstLayout, frame: &[u8]) -> Option<Self> {
        let frame = frame.get(..layout.frame_len())?;
        let word = |offset: usize| i16::from_be_bytes([frame[offset], frame[offset + 1]]);

        let (accel, rest) = match layout {
            BurstLayout::AccelTempGyro => (Some([word(1), word(3), word(5)]), 7),
            BurstLayout::TempGyro => (None, 1),
        };

        Some(Self {
            accel,
            temperature: word(rest),
            gyro: [word(rest + 2), word(rest + 4), word(rest + 6)],
        })
    }
}

/// Outcome of a transaction followed by a release
///
/// A transfer error wins over a release error; a release error after a good
/// transfer is still reported.
fn finish<T, U: SpiTransport, C: BusContext>(
    guard: BusGuard<'_, U, C>,
    result: Result<T, DriverError>,
) -> Result<T, DriverError> {
    let released = guard.release();
    let value = result?;
    released?;
    Ok(value)
}

impl<T: SpiTransport> SpiDeviceBus<'_, T> {
    /// Read one register (task context)
    pub fn read_byte(&self, reg: u8) -> Result<u8, DriverError> {
        let mut guard = self.claim()?;
        let result = guard
            .transfer_byte(read_address(reg))
            .and_then(|_| guard.transfer_byte(0x00));
        finish(guard, result)
    }

    /// Write one register (task context)
    ///
    /// # Errors
    ///
    /// `TransferFailure` if either frame byte fails or echoes non-zero. A bad
    /// echo on the address byte aborts before the value is clocked out.
    /// `ReleaseFailed` means the write itself went through.
    pub fn write_byte(&self, reg: u8, value: u8) -> Result<(), DriverError> {
        let mut guard = self.claim()?;
        let result = guard
            .transfer_byte(write_address(reg))
            .and_then(|echo| {
                // Abort before the value byte so the register is left untouched
                if echo != 0 {
                    return Err(DriverError::TransferFailure);
                }
                match guard.transfer_byte(value)? {
                    0 => Ok(()),
                    _ => Err(DriverError::TransferFailure),
                }
            });
        finish(guard, result)
    }
}

impl<T: SpiTransport, C: BusContext> BusGuard<'_, T, C> {
    /// Clock out one burst frame for `layout` on an already-claimed bus
    ///
    /// Only the first `layout.frame_len()` bytes of the returned buffer are valid.
    pub fn burst_read(&mut self, layout: BurstLayout) -> Result<[u8; MAX_BURST_LEN], DriverError> {
        let len = layout.frame_len();
        let mut tx = [0u8; MAX_BURST_LEN];
        let mut rx = [0u8; MAX_BURST_LEN];
        tx[0] = read_address(layout.start());
        self.transfer_block(&tx[..len], &mut rx[..len])?;
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockSpi, SpiEvent};

    #[test]
    fn test_address_encoding() {
        assert_eq!(read_address(registers::WHO_AM_I), 0xF5);
        assert_eq!(write_address(registers::PWR_MGMT_1), 0x6B);
        assert_eq!(write_address(0xEB), 0x6B);
    }

    #[test]
    fn test_read_byte_frame() {
        let spi = MockSpi::new();
        spi.set_register(registers::WHO_AM_I, 0x70);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        assert_eq!(dev.read_byte(registers::WHO_AM_I), Ok(0x70));
        let bytes: Vec<_> = spi
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SpiEvent::Byte { tx, .. } => Some(tx),
                _ => None,
            })
            .collect();
        assert_eq!(bytes, vec![0xF5, 0x00]);
        assert!(!spi.is_claimed());
    }

    #[test]
    fn test_write_byte_frame() {
        let spi = MockSpi::new();
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        dev.write_byte(registers::GYRO_CONFIG, 0x08).unwrap();
        assert_eq!(spi.writes(), vec![(0x1B, 0x08)]);
        assert_eq!(spi.register(registers::GYRO_CONFIG), 0x08);
    }

    #[test]
    fn test_write_byte_nonzero_echo_is_bus_error() {
        let spi = MockSpi::new();
        spi.set_echo(0xFF);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        assert_eq!(
            dev.write_byte(registers::CONFIG, 0x01),
            Err(DriverError::TransferFailure)
        );
        assert!(!spi.is_claimed());
    }

    #[test]
    fn test_address_echo_aborts_before_value() {
        let spi = MockSpi::new();
        spi.set_register(registers::GYRO_CONFIG, 0x08);
        spi.set_address_echo(Some(0x01));
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        assert_eq!(
            dev.write_byte(registers::GYRO_CONFIG, 0x18),
            Err(DriverError::TransferFailure)
        );
        assert!(spi.writes().is_empty());
        assert_eq!(spi.register(registers::GYRO_CONFIG), 0x08);
        assert_eq!(spi.transfer_count(), 1);
        assert!(!spi.is_claimed());
    }

    #[test]
    fn test_data_echo_reported_after_write() {
        let spi = MockSpi::new();
        spi.set_echo(0x01);
        spi.set_address_echo(Some(0x00));
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        assert_eq!(
            dev.write_byte(registers::CONFIG, 0x03),
            Err(DriverError::TransferFailure)
        );
        assert_eq!(spi.writes(), vec![(registers::CONFIG, 0x03)]);
    }

    #[test]
    fn test_write_failure_still_releases() {
        let spi = MockSpi::new();
        spi.set_fail_write_to(Some(registers::CONFIG));
        spi.set_fail_release(true);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        // Transfer error reported ahead of the release error
        assert_eq!(
            dev.write_byte(registers::CONFIG, 0x01),
            Err(DriverError::TransferFailure)
        );
        assert!(!spi.is_claimed());
    }

    #[test]
    fn test_release_failure_after_good_write() {
        let spi = MockSpi::new();
        spi.set_fail_release(true);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        assert_eq!(
            dev.write_byte(registers::CONFIG, 0x01),
            Err(DriverError::ReleaseFailed)
        );
        // Not rolled back
        assert_eq!(spi.register(registers::CONFIG), 0x01);
    }

    #[test]
    fn test_burst_read_accel_layout() {
        let spi = MockSpi::new();
        let data: [u8; 14] = [0, 1, 0, 2, 0, 3, 0xFF, 0xFE, 0x01, 0x00, 0x02, 0x00, 0x01, 0x90];
        spi.set_registers(registers::ACCEL_XOUT_H, &data);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        let mut guard = dev.claim_from_isr().unwrap();
        let frame = guard.burst_read(BurstLayout::AccelTempGyro).unwrap();
        guard.release().unwrap();

        let raw = RawBurst::decode(BurstLayout::AccelTempGyro, &frame).unwrap();
        assert_eq!(raw.accel, Some([1, 2, 3]));
        assert_eq!(raw.temperature, -2);
        assert_eq!(raw.gyro, [256, 512, 400]);

        let mut tx = vec![0u8; 15];
        tx[0] = 0xBB;
        assert!(spi.events().contains(&SpiEvent::Block { tx }));
    }

    #[test]
    fn test_burst_read_gyro_layout() {
        let spi = MockSpi::new();
        spi.set_registers(registers::TEMP_OUT_H, &[0x00, 0x10, 0xFF, 0xFF, 0x00, 0x01, 0x80, 0x00]);
        let dev = SpiDeviceBus::new(&spi, 1, 0);

        let mut guard = dev.claim_from_isr().unwrap();
        let frame = guard.burst_read(BurstLayout::TempGyro).unwrap();
        guard.release().unwrap();

        let raw = RawBurst::decode(BurstLayout::TempGyro, &frame).unwrap();
        assert_eq!(raw.accel, None);
        assert_eq!(raw.temperature, 16);
        assert_eq!(raw.gyro, [-1, 1, i16::MIN]);
    }

    #[test]
    fn test_decode_short_frame() {
        assert!(RawBurst::decode(BurstLayout::AccelTempGyro, &[0u8; 9]).is_none());
    }
}
