//! MPU-6500 Configuration
//!
//! Closed enumerations for the range and filter settings, plus the immutable
//! board wiring record the driver is constructed with.

use super::registers;
use bitflags::bitflags;

/// Gyroscope full scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
    /// ±250 °/s
    Dps250,
    /// ±500 °/s (applied by the configuration sequence)
    #[default]
    Dps500,
    /// ±1000 °/s
    Dps1000,
    /// ±2000 °/s
    Dps2000,
}

impl GyroRange {
    /// Get the register value for this range
    pub fn register_value(self) -> u8 {
        match self {
            GyroRange::Dps250 => registers::GYRO_FS_SEL_250DPS,
            GyroRange::Dps500 => registers::GYRO_FS_SEL_500DPS,
            GyroRange::Dps1000 => registers::GYRO_FS_SEL_1000DPS,
            GyroRange::Dps2000 => registers::GYRO_FS_SEL_2000DPS,
        }
    }

    /// Decode a GYRO_CONFIG value; `None` for anything outside the ladder
    pub fn from_register(value: u8) -> Option<Self> {
        match value {
            registers::GYRO_FS_SEL_250DPS => Some(GyroRange::Dps250),
            registers::GYRO_FS_SEL_500DPS => Some(GyroRange::Dps500),
            registers::GYRO_FS_SEL_1000DPS => Some(GyroRange::Dps1000),
            registers::GYRO_FS_SEL_2000DPS => Some(GyroRange::Dps2000),
            _ => None,
        }
    }

    /// Full scale in °/s
    pub fn max_dps(self) -> u16 {
        match self {
            GyroRange::Dps250 => 250,
            GyroRange::Dps500 => 500,
            GyroRange::Dps1000 => 1000,
            GyroRange::Dps2000 => 2000,
        }
    }
}

impl TryFrom<u16> for GyroRange {
    type Error = u16;

    /// Map a full scale in °/s onto the range ladder
    fn try_from(dps: u16) -> Result<Self, Self::Error> {
        match dps {
            250 => Ok(GyroRange::Dps250),
            500 => Ok(GyroRange::Dps500),
            1000 => Ok(GyroRange::Dps1000),
            2000 => Ok(GyroRange::Dps2000),
            other => Err(other),
        }
    }
}

/// Accelerometer full scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    /// ±2 g
    G2,
    /// ±4 g
    G4,
    /// ±8 g (applied by the configuration sequence)
    #[default]
    G8,
    /// ±16 g
    G16,
}

impl AccelRange {
    /// Get the register value for this range
    pub fn register_value(self) -> u8 {
        match self {
            AccelRange::G2 => registers::ACCEL_FS_SEL_2G,
            AccelRange::G4 => registers::ACCEL_FS_SEL_4G,
            AccelRange::G8 => registers::ACCEL_FS_SEL_8G,
            AccelRange::G16 => registers::ACCEL_FS_SEL_16G,
        }
    }

    /// Decode an ACCEL_CONFIG value; `None` for anything outside the ladder
    pub fn from_register(value: u8) -> Option<Self> {
        match value {
            registers::ACCEL_FS_SEL_2G => Some(AccelRange::G2),
            registers::ACCEL_FS_SEL_4G => Some(AccelRange::G4),
            registers::ACCEL_FS_SEL_8G => Some(AccelRange::G8),
            registers::ACCEL_FS_SEL_16G => Some(AccelRange::G16),
            _ => None,
        }
    }
}

impl TryFrom<u8> for AccelRange {
    type Error = u8;

    /// Map a full scale in g onto the range ladder
    fn try_from(g: u8) -> Result<Self, Self::Error> {
        match g {
            2 => Ok(AccelRange::G2),
            4 => Ok(AccelRange::G4),
            8 => Ok(AccelRange::G8),
            16 => Ok(AccelRange::G16),
            other => Err(other),
        }
    }
}

/// Digital low pass filter bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPassFilter {
    /// 256Hz - widest, runs the internal clock at 8kHz
    Hz256,
    /// 188Hz
    #[default]
    Hz188,
    /// 98Hz
    Hz98,
    /// 42Hz
    Hz42,
    /// 20Hz
    Hz20,
    /// 10Hz
    Hz10,
    /// 5Hz - narrowest
    Hz5,
}

impl LowPassFilter {
    /// Get the CONFIG register value
    pub fn register_value(self) -> u8 {
        match self {
            LowPassFilter::Hz256 => registers::DLPF_CFG_256HZ,
            LowPassFilter::Hz188 => registers::DLPF_CFG_188HZ,
            LowPassFilter::Hz98 => registers::DLPF_CFG_98HZ,
            LowPassFilter::Hz42 => registers::DLPF_CFG_42HZ,
            LowPassFilter::Hz20 => registers::DLPF_CFG_20HZ,
            LowPassFilter::Hz10 => registers::DLPF_CFG_10HZ,
            LowPassFilter::Hz5 => registers::DLPF_CFG_5HZ,
        }
    }

    /// Decode a CONFIG value
    pub fn from_register(value: u8) -> Option<Self> {
        match value {
            registers::DLPF_CFG_256HZ => Some(LowPassFilter::Hz256),
            registers::DLPF_CFG_188HZ => Some(LowPassFilter::Hz188),
            registers::DLPF_CFG_98HZ => Some(LowPassFilter::Hz98),
            registers::DLPF_CFG_42HZ => Some(LowPassFilter::Hz42),
            registers::DLPF_CFG_20HZ => Some(LowPassFilter::Hz20),
            registers::DLPF_CFG_10HZ => Some(LowPassFilter::Hz10),
            registers::DLPF_CFG_5HZ => Some(LowPassFilter::Hz5),
            _ => None,
        }
    }

    /// Internal sample clock feeding the rate divider, in Hz
    pub fn filter_clock_hz(self) -> u32 {
        match self {
            LowPassFilter::Hz256 => registers::FILTER_CLOCK_WIDE_HZ,
            _ => registers::FILTER_CLOCK_HZ,
        }
    }
}

/// Mounting orientation: rotation of the chip about the vertical axis,
/// component side up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    #[default]
    Top0Deg = 0,
    Top90Deg = 1,
    Top180Deg = 2,
    Top270Deg = 3,
}

/// PWR_MGMT_1 clock source (CLKSEL[2:0])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal 20MHz oscillator
    Internal = 0x00,
    /// Best available: gyro PLL when ready, internal otherwise
    #[default]
    AutoPll = 0x01,
    /// Stops the clock, keeps timing generator in reset
    Stopped = 0x07,
}

impl ClockSource {
    /// PWR_MGMT_1 value selecting this clock with the device awake
    pub fn register_value(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// INT_PIN_CFG bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InterruptPinConfig: u8 {
        /// INT pin active low
        const ACTIVE_LOW = 0x80;
        /// INT pin open drain
        const OPEN_DRAIN = 0x40;
        /// Hold INT until cleared
        const LATCH_INT_EN = 0x20;
        /// Any register read clears the interrupt status
        const INT_ANYRD_2CLEAR = 0x10;
        /// FSYNC active low
        const ACTL_FSYNC = 0x08;
        /// FSYNC pin used as interrupt
        const FSYNC_INT_MODE_EN = 0x04;
        /// Auxiliary I2C bypass
        const BYPASS_EN = 0x02;
    }
}

bitflags! {
    /// INT_ENABLE bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InterruptEnable: u8 {
        /// Wake on motion
        const WOM_EN = 0x40;
        /// FIFO overflow
        const FIFO_OFLOW_EN = 0x10;
        /// FSYNC interrupt
        const FSYNC_INT_EN = 0x08;
        /// Raw sensor data ready
        const RAW_RDY_EN = 0x01;
    }
}

bitflags! {
    /// USER_CTRL bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UserControl: u8 {
        /// FIFO enable
        const FIFO_EN = 0x40;
        /// Auxiliary I2C master enable
        const I2C_MST_EN = 0x20;
        /// Disable the I2C slave interface (SPI only)
        const I2C_IF_DIS = 0x10;
        /// Reset FIFO (self-clearing)
        const FIFO_RST = 0x04;
        /// Reset I2C master (self-clearing)
        const I2C_MST_RST = 0x02;
        /// Reset signal paths and sensor registers (self-clearing)
        const SIG_COND_RST = 0x01;
    }
}

/// Board wiring and defaults for one MPU-6500
///
/// Lives for as long as the driver; the driver never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct BoardConfig {
    /// EXTI line wired to the INT pin
    pub exti_line: u32,

    /// Clock source programmed into PWR_MGMT_1
    pub clock_source: ClockSource,

    /// USER_CTRL value programmed after reset
    pub user_control: UserControl,

    /// Filter programmed by the configuration sequence
    pub default_filter: LowPassFilter,

    /// Output data rate programmed by the configuration sequence (Hz)
    pub default_sample_rate_hz: u16,

    /// Mounting orientation
    pub orientation: Orientation,

    /// INT_PIN_CFG value
    pub interrupt_config: InterruptPinConfig,

    /// INT_ENABLE value
    pub interrupt_enable: InterruptEnable,

    /// SPI clock while configuring (register writes need ≤1MHz)
    pub config_clock_hz: u32,

    /// SPI clock for sample reads
    pub run_clock_hz: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            exti_line: 0,
            clock_source: ClockSource::AutoPll,
            user_control: UserControl::I2C_IF_DIS,
            default_filter: LowPassFilter::Hz188,
            default_sample_rate_hz: 1000,
            orientation: Orientation::Top0Deg,
            interrupt_config: InterruptPinConfig::INT_ANYRD_2CLEAR,
            interrupt_enable: InterruptEnable::RAW_RDY_EN,
            config_clock_hz: 100_000,
            run_clock_hz: 3_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gyro_range_register_roundtrip() {
        for range in [
            GyroRange::Dps250,
            GyroRange::Dps500,
            GyroRange::Dps1000,
            GyroRange::Dps2000,
        ] {
            assert_eq!(GyroRange::from_register(range.register_value()), Some(range));
        }
        assert_eq!(GyroRange::from_register(0x04), None);
    }

    #[test]
    fn test_gyro_range_from_dps() {
        assert_eq!(GyroRange::try_from(1000), Ok(GyroRange::Dps1000));
        assert_eq!(GyroRange::try_from(300), Err(300));
        assert_eq!(GyroRange::Dps2000.max_dps(), 2000);
    }

    #[test]
    fn test_accel_range_from_g() {
        assert_eq!(AccelRange::try_from(16), Ok(AccelRange::G16));
        assert_eq!(AccelRange::try_from(3), Err(3));
        assert_eq!(AccelRange::G8.register_value(), 0x10);
    }

    #[test]
    fn test_filter_clock() {
        assert_eq!(LowPassFilter::Hz256.filter_clock_hz(), 8000);
        assert_eq!(LowPassFilter::Hz188.filter_clock_hz(), 1000);
        assert_eq!(LowPassFilter::Hz5.filter_clock_hz(), 1000);
        assert_eq!(LowPassFilter::from_register(0x07), None);
    }

    #[test]
    fn test_board_config_default() {
        let board = BoardConfig::default();
        assert_eq!(board.clock_source.register_value(), 0x01);
        assert_eq!(board.user_control.bits(), 0x10);
        assert_eq!(board.interrupt_config.bits(), 0x10);
        assert_eq!(board.interrupt_enable.bits(), 0x01);
        assert!(board.config_clock_hz < board.run_clock_hz);
    }
}
