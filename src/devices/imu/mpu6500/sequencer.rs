//! Configuration sequence
//!
//! Takes the sensor from power-on to a running configuration. Steps are
//! strictly ordered; the filter is programmed before the sample-rate divisor
//! because the divisor is derived from the filter clock. The first failing
//! step aborts the run and drops the device back to `Unconfigured`.

use super::config::{AccelRange, GyroRange};
use super::driver::Mpu6500;
use super::error::DriverError;
use super::registers;
use crate::platform::{SpiTransport, Watchdog};
use embedded_hal::delay::DelayNs;

/// Reset-completion poll interval
const RESET_POLL_STEP_MS: u32 = 5;

/// Upper bound on reset-completion polls
const RESET_POLL_LIMIT: u32 = 20;

/// Settle time once the device reset bit has cleared
const DEVICE_RESET_SETTLE_MS: u32 = 25;

/// Settle time once the signal path reset bits have cleared
const SIGNAL_PATH_RESET_SETTLE_MS: u32 = 10;

/// USER_CTRL bits that reset the signal path, FIFO and I2C master
const SIGNAL_PATH_RESET_BITS: u8 = registers::USER_CTRL_SIG_COND_RST
    | registers::USER_CTRL_I2C_MST_RST
    | registers::USER_CTRL_FIFO_RST;

/// Configuration progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ConfigState {
    /// Power-on, or a sequence failed
    Unconfigured = 0,
    /// Device and signal path reset
    Resetting = 1,
    /// Clock source and user control
    ProgrammingPower = 2,
    /// DLPF, then SMPLRT_DIV
    ProgrammingFilterAndRate = 3,
    /// Gyro and accel full scale
    ProgrammingRanges = 4,
    /// INT_PIN_CFG and INT_ENABLE
    ProgrammingInterrupts = 5,
    /// Sampling; the interrupt handler is live
    Configured = 6,
}

impl ConfigState {
    pub(super) fn from_u8(value: u8) -> Self {
        match value {
            1 => ConfigState::Resetting,
            2 => ConfigState::ProgrammingPower,
            3 => ConfigState::ProgrammingFilterAndRate,
            4 => ConfigState::ProgrammingRanges,
            5 => ConfigState::ProgrammingInterrupts,
            6 => ConfigState::Configured,
            _ => ConfigState::Unconfigured,
        }
    }
}

/// One run of the configuration sequence against a device
pub(super) struct ConfigSequencer<'d, 'a, 'q, T: SpiTransport> {
    device: &'d Mpu6500<'a, 'q, T>,
}

impl<'d, 'a, 'q, T: SpiTransport> ConfigSequencer<'d, 'a, 'q, T> {
    pub(super) fn new(device: &'d Mpu6500<'a, 'q, T>) -> Self {
        Self { device }
    }

    /// Run every step; `Configured` is entered only after the last one succeeds
    pub(super) fn run(
        self,
        delay: &mut impl DelayNs,
        watchdog: &mut impl Watchdog,
    ) -> Result<(), DriverError> {
        let result = self.steps(delay, watchdog);
        match result {
            Ok(()) => {
                self.device.enter(ConfigState::Configured);
                crate::log_info!("MPU-6500 configured");
            }
            Err(e) => {
                crate::log_warn!("MPU-6500 sequence aborted in {:?}: {}", self.device.state(), e);
                self.device.enter(ConfigState::Unconfigured);
            }
        }
        result
    }

    fn steps(&self, delay: &mut impl DelayNs, watchdog: &mut impl Watchdog) -> Result<(), DriverError> {
        let device = self.device;
        let board = device.board;

        device.enter(ConfigState::Resetting);
        device.bus.write_byte(
            registers::PWR_MGMT_1,
            registers::PWR_MGMT_1_H_RESET | board.clock_source.register_value(),
        )?;
        self.wait_for_clear(registers::PWR_MGMT_1, registers::PWR_MGMT_1_H_RESET, delay, watchdog)?;
        settle(DEVICE_RESET_SETTLE_MS, delay, watchdog);

        device
            .bus
            .write_byte(registers::USER_CTRL, SIGNAL_PATH_RESET_BITS)?;
        self.wait_for_clear(registers::USER_CTRL, SIGNAL_PATH_RESET_BITS, delay, watchdog)?;
        settle(SIGNAL_PATH_RESET_SETTLE_MS, delay, watchdog);

        device.enter(ConfigState::ProgrammingPower);
        device
            .bus
            .write_byte(registers::PWR_MGMT_1, board.clock_source.register_value())?;
        device
            .bus
            .write_byte(registers::USER_CTRL, board.user_control.bits())?;

        device.enter(ConfigState::ProgrammingFilterAndRate);
        device.program_filter(board.default_filter)?;
        device.program_sample_rate(board.default_sample_rate_hz)?;

        device.enter(ConfigState::ProgrammingRanges);
        device.program_gyro_range(GyroRange::Dps500)?;
        if device.has_accel() {
            device.program_accel_range(AccelRange::G8)?;
        }

        device.enter(ConfigState::ProgrammingInterrupts);
        device
            .bus
            .write_byte(registers::INT_PIN_CFG, board.interrupt_config.bits())?;
        device
            .bus
            .write_byte(registers::INT_ENABLE, board.interrupt_enable.bits())?;

        Ok(())
    }

    /// Poll `reg` until every bit of `mask` reads back clear
    fn wait_for_clear(
        &self,
        reg: u8,
        mask: u8,
        delay: &mut impl DelayNs,
        watchdog: &mut impl Watchdog,
    ) -> Result<(), DriverError> {
        for _ in 0..RESET_POLL_LIMIT {
            delay.delay_ms(RESET_POLL_STEP_MS);
            watchdog.clear();
            if self.device.bus.read_byte(reg)? & mask == 0 {
                return Ok(());
            }
        }
        crate::log_error!("MPU-6500 reset bits {:#x} in {:#x} never cleared", mask, reg);
        Err(DriverError::ResetTimeout)
    }
}

/// Sleep `ms` in poll-sized slices, kicking the watchdog after each
fn settle(ms: u32, delay: &mut impl DelayNs, watchdog: &mut impl Watchdog) {
    let mut remaining = ms;
    while remaining > 0 {
        let step = remaining.min(RESET_POLL_STEP_MS);
        delay.delay_ms(step);
        watchdog.clear();
        remaining -= step;
    }
}
